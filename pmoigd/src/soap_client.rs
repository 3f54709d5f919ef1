use std::time::Duration;

use pmoupnp::soap::{SoapEnvelope, SoapFault, SoapParseError, build_soap_request, parse_soap_envelope};
use tracing::{debug, warn};
use ureq::Agent;

use crate::errors::IgdError;

/// Result of a SOAP call:
/// - HTTP status code
/// - raw XML body (always)
/// - parsed SOAP envelope, or why parsing failed
pub struct SoapCallResult {
    pub status: ureq::http::StatusCode,
    pub raw_body: String,
    pub envelope: Result<SoapEnvelope, SoapParseError>,
}

/// Invoke a UPnP SOAP action on a control URL.
///
/// - `control_url`: full HTTP URL of the service control endpoint
/// - `service_type`: service URN, e.g. "urn:schemas-upnp-org:service:WANIPConnection:1"
/// - `action`: action name, e.g. "GetStatusInfo"
/// - `args`: list of (name, value) pairs, in the order the service expects them
/// - `timeout`: bound on the whole request/response cycle
pub fn invoke_upnp_action<K, V>(
    control_url: &str,
    service_type: &str,
    action: &str,
    args: &[(K, V)],
    timeout: Duration,
) -> Result<SoapCallResult, IgdError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let body_xml = build_soap_request(service_type, action, args)?;
    debug!("SOAP request {} to {}:\n{}", action, control_url, body_xml);

    // 4xx/5xx must not become Error::StatusCode: SOAP faults come back as HTTP 500
    let config = Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build();

    let agent: Agent = config.into();

    let soap_action_header = format!(r#""{}#{}""#, service_type, action);

    let mut response = agent
        .post(control_url)
        .header("Content-Type", r#"text/xml; charset="utf-8""#)
        .header("SOAPAction", &soap_action_header)
        .header("Connection", "close")
        .header("Cache-Control", "no-cache")
        .header("Pragma", "no-cache")
        .send(body_xml)?;

    let status = response.status();
    let raw_body = response.body_mut().read_to_string()?;
    debug!("SOAP response {} (HTTP {}):\n{}", action, status, raw_body);

    let envelope = parse_soap_envelope(raw_body.as_bytes());

    Ok(SoapCallResult {
        status,
        raw_body,
        envelope,
    })
}

/// Appelle une action et ne rend l'enveloppe que pour un HTTP 200.
///
/// Une réponse en erreur est convertie en [`IgdError::UpnpFault`] quand
/// elle porte un SOAP Fault avec un code UPnP, sinon en
/// [`IgdError::HttpStatus`].
pub fn call_upnp_action<K, V>(
    control_url: &str,
    service_type: &str,
    action: &str,
    args: &[(K, V)],
    timeout: Duration,
) -> Result<SoapEnvelope, IgdError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let result = invoke_upnp_action(control_url, service_type, action, args, timeout)?;
    let status = result.status.as_u16();

    if status != 200 {
        let fault = result
            .envelope
            .as_ref()
            .ok()
            .and_then(|envelope| SoapFault::from_body(&envelope.body))
            .and_then(|fault| fault.upnp_error);

        return Err(match fault {
            Some(upnp_error) => IgdError::UpnpFault(
                action.to_string(),
                upnp_error.error_code,
                upnp_error.error_description,
                status,
            ),
            None => IgdError::HttpStatus(action.to_string(), status, result.raw_body),
        });
    }

    result.envelope.map_err(|e| {
        warn!("{} answered HTTP 200 with an unreadable body: {}", action, e);
        IgdError::SoapNoEnvelope(action.to_string(), e)
    })
}

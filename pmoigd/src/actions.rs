//! Actions SOAP du service de connexion WAN utilisées par le client.
//!
//! Chaque [`IgdAction`] donne son nom et ses arguments ordonnés ;
//! [`decode_response`] lit la réponse selon l'action demandée.

use std::net::{IpAddr, Ipv4Addr};

use pmoupnp::soap::{SoapEnvelope, child_text, find_child_with_suffix};
use xmltree::Element;

use crate::errors::IgdError;
use crate::model::{PortMapping, Protocol};

pub const GET_STATUS_INFO: &str = "GetStatusInfo";
pub const GET_EXTERNAL_IP_ADDRESS: &str = "GetExternalIPAddress";
pub const GET_GENERIC_PORT_MAPPING_ENTRY: &str = "GetGenericPortMappingEntry";
pub const ADD_PORT_MAPPING: &str = "AddPortMapping";

/// Requête vers le service de connexion WAN
#[derive(Clone, Debug)]
pub enum IgdAction<'a> {
    GetStatusInfo,
    GetExternalIpAddress,
    GetGenericPortMappingEntry {
        index: u32,
    },
    /// Redirection sans translation : port externe = port interne
    AddPortMapping {
        port: u16,
        protocol: Protocol,
        internal_client: Ipv4Addr,
        description: &'a str,
    },
}

impl IgdAction<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            IgdAction::GetStatusInfo => GET_STATUS_INFO,
            IgdAction::GetExternalIpAddress => GET_EXTERNAL_IP_ADDRESS,
            IgdAction::GetGenericPortMappingEntry { .. } => GET_GENERIC_PORT_MAPPING_ENTRY,
            IgdAction::AddPortMapping { .. } => ADD_PORT_MAPPING,
        }
    }

    /// Arguments dans l'ordre imposé par le service
    pub fn arguments(&self) -> Vec<(&'static str, String)> {
        match self {
            IgdAction::GetStatusInfo | IgdAction::GetExternalIpAddress => Vec::new(),
            IgdAction::GetGenericPortMappingEntry { index } => {
                vec![("NewPortMappingIndex", index.to_string())]
            }
            IgdAction::AddPortMapping {
                port,
                protocol,
                internal_client,
                description,
            } => vec![
                ("NewRemoteHost", String::new()),
                ("NewExternalPort", port.to_string()),
                ("NewProtocol", protocol.to_string()),
                ("NewInternalPort", port.to_string()),
                ("NewInternalClient", internal_client.to_string()),
                ("NewEnabled", "1".to_string()),
                ("NewPortMappingDescription", description.to_string()),
                ("NewLeaseDuration", "0".to_string()),
            ],
        }
    }
}

/// Réponse de `GetStatusInfo`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusInfo {
    /// Tel que renvoyé, casse comprise
    pub connection_status: String,
    pub last_connection_error: Option<String>,
    pub uptime: Option<u64>,
}

/// Réponse décodée, une variante par action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResponse {
    Status(StatusInfo),
    ExternalIp(IpAddr),
    PortMappingEntry(PortMapping),
    PortMappingAdded,
}

/// Décode le corps de la réponse à `action`.
pub fn decode_response(action: &IgdAction<'_>, envelope: &SoapEnvelope) -> Result<ActionResponse, IgdError> {
    let response_name = format!("{}Response", action.name());
    let response = find_child_with_suffix(&envelope.body.content, &response_name)
        .ok_or_else(|| IgdError::missing_return_value(&response_name))?;

    match action {
        IgdAction::GetStatusInfo => Ok(ActionResponse::Status(StatusInfo {
            connection_status: required_text(response, "NewConnectionStatus")?,
            last_connection_error: child_text(response, "NewLastConnectionError")
                .filter(|e| !e.is_empty()),
            uptime: child_text(response, "NewUptime").and_then(|u| u.parse().ok()),
        })),
        IgdAction::GetExternalIpAddress => {
            let ip = required_text(response, "NewExternalIPAddress")?;
            let ip = ip
                .parse::<IpAddr>()
                .map_err(|_| IgdError::bad_return_value("NewExternalIPAddress", &ip))?;
            Ok(ActionResponse::ExternalIp(ip))
        }
        IgdAction::GetGenericPortMappingEntry { index } => decode_port_mapping(response)
            .map(ActionResponse::PortMappingEntry)
            .map_err(|e| IgdError::MalformedEntry(*index, Box::new(e))),
        IgdAction::AddPortMapping { .. } => Ok(ActionResponse::PortMappingAdded),
    }
}

fn decode_port_mapping(response: &Element) -> Result<PortMapping, IgdError> {
    let internal_client = required_text(response, "NewInternalClient")?;
    let internal_host = internal_client
        .parse::<IpAddr>()
        .map_err(|_| IgdError::bad_return_value("NewInternalClient", &internal_client))?;

    let enabled = match child_text(response, "NewEnabled") {
        Some(text) => {
            text.parse::<u32>()
                .map_err(|_| IgdError::bad_return_value("NewEnabled", &text))?
                != 0
        }
        None => false,
    };

    Ok(PortMapping {
        internal_port: required_number(response, "NewInternalPort")?,
        external_port: required_number(response, "NewExternalPort")?,
        protocol: required_text(response, "NewProtocol")?.parse()?,
        internal_host,
        description: child_text(response, "NewPortMappingDescription").unwrap_or_default(),
        enabled,
        lease: match child_text(response, "NewLeaseDuration") {
            Some(text) if !text.is_empty() => text
                .parse()
                .map_err(|_| IgdError::bad_return_value("NewLeaseDuration", &text))?,
            _ => 0,
        },
    })
}

fn required_text(parent: &Element, name: &str) -> Result<String, IgdError> {
    child_text(parent, name)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| IgdError::missing_return_value(name))
}

fn required_number<T: std::str::FromStr>(parent: &Element, name: &str) -> Result<T, IgdError> {
    let text = required_text(parent, name)?;
    text.parse()
        .map_err(|_| IgdError::bad_return_value(name, &text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmoupnp::soap::parse_soap_envelope;

    const BELKIN_STATUS: &str = r#"<?xml version="1.0"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<SOAP-ENV:Body>
<m:GetStatusInfoResponse
xmlns:m="urn:schemas-upnp-org:service:WANIPConnection:1">
<NewConnectionStatus>Connected</NewConnectionStatus>
<NewLastConnectionError>ERROR_NONE</NewLastConnectionError>
<NewUptime>194979</NewUptime></m:GetStatusInfoResponse></SOAP-ENV:Body>
</SOAP-ENV:Envelope>
"#;

    const BELKIN_PORT_MAPPING: &str = r#"<?xml version="1.0"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<SOAP-ENV:Body><m:GetGenericPortMappingEntryResponse
xmlns:m="urn:schemas-upnp-org:service:WANIPConnection:1">
<NewRemoteHost></NewRemoteHost>
<NewExternalPort>5900</NewExternalPort>
<NewProtocol>TCP</NewProtocol>
<NewInternalPort>5901</NewInternalPort>
<NewInternalClient>192.168.2.5</NewInternalClient>
<NewEnabled>1</NewEnabled>
<NewPortMappingDescription>cPM.Port.Map.ee97f96de8c1647a</NewPortMappingDescription>
<NewLeaseDuration>0</NewLeaseDuration>
</m:GetGenericPortMappingEntryResponse>
</SOAP-ENV:Body>
</SOAP-ENV:Envelope>
"#;

    fn decode(action: &IgdAction<'_>, xml: &str) -> Result<ActionResponse, IgdError> {
        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        decode_response(action, &envelope)
    }

    #[test]
    fn status_keeps_case() {
        let ActionResponse::Status(status) = decode(&IgdAction::GetStatusInfo, BELKIN_STATUS).unwrap()
        else {
            panic!("expected a status response");
        };

        assert_eq!(status.connection_status, "Connected");
        assert_eq!(status.last_connection_error.as_deref(), Some("ERROR_NONE"));
        assert_eq!(status.uptime, Some(194979));
    }

    #[test]
    fn belkin_port_mapping_entry() {
        let response = decode(
            &IgdAction::GetGenericPortMappingEntry { index: 0 },
            BELKIN_PORT_MAPPING,
        )
        .unwrap();

        assert_eq!(
            response,
            ActionResponse::PortMappingEntry(PortMapping {
                internal_port: 5901,
                external_port: 5900,
                protocol: Protocol::Tcp,
                internal_host: IpAddr::V4(Ipv4Addr::new(192, 168, 2, 5)),
                description: "cPM.Port.Map.ee97f96de8c1647a".to_string(),
                enabled: true,
                lease: 0,
            })
        );
    }

    #[test]
    fn unreadable_entry_fields_are_a_malformed_entry() {
        let without_client = BELKIN_PORT_MAPPING.replace("192.168.2.5", "");
        assert!(matches!(
            decode(&IgdAction::GetGenericPortMappingEntry { index: 1 }, &without_client),
            Err(IgdError::MalformedEntry(1, cause))
                if matches!(*cause, IgdError::MissingReturnValue(ref name) if name == "NewInternalClient")
        ));

        let sctp = BELKIN_PORT_MAPPING.replace("<NewProtocol>TCP", "<NewProtocol>SCTP");
        assert!(matches!(
            decode(&IgdAction::GetGenericPortMappingEntry { index: 4 }, &sctp),
            Err(IgdError::MalformedEntry(4, cause))
                if matches!(*cause, IgdError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn missing_entry_response_is_not_a_malformed_entry() {
        assert!(matches!(
            decode(&IgdAction::GetGenericPortMappingEntry { index: 0 }, BELKIN_STATUS),
            Err(IgdError::MissingReturnValue(_))
        ));
    }

    #[test]
    fn response_must_match_requested_action() {
        // a status body is not an answer to GetExternalIPAddress
        assert!(matches!(
            decode(&IgdAction::GetExternalIpAddress, BELKIN_STATUS),
            Err(IgdError::MissingReturnValue(name)) if name == "GetExternalIPAddressResponse"
        ));
    }

    #[test]
    fn bad_external_ip() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
<u:GetExternalIPAddressResponse xmlns:u="urn:schemas-upnp-org:service:WANPPPConnection:1">
<NewExternalIPAddress>not-an-ip</NewExternalIPAddress>
</u:GetExternalIPAddressResponse></s:Body></s:Envelope>"#;

        assert!(matches!(
            decode(&IgdAction::GetExternalIpAddress, xml),
            Err(IgdError::BadReturnValue(name, value))
                if name == "NewExternalIPAddress" && value == "not-an-ip"
        ));
    }

    #[test]
    fn add_port_mapping_arguments() {
        let action = IgdAction::AddPortMapping {
            port: 6881,
            protocol: Protocol::Tcp,
            internal_client: Ipv4Addr::new(192, 168, 2, 10),
            description: "pmoigd 192.168.2.10 6881 TCP",
        };
        let args = action.arguments();
        let names: Vec<&str> = args.iter().map(|(name, _)| *name).collect();

        assert_eq!(action.name(), "AddPortMapping");
        assert_eq!(
            names,
            [
                "NewRemoteHost",
                "NewExternalPort",
                "NewProtocol",
                "NewInternalPort",
                "NewInternalClient",
                "NewEnabled",
                "NewPortMappingDescription",
                "NewLeaseDuration",
            ]
        );
        assert_eq!(args[0].1, "");
        assert_eq!(args[1].1, "6881");
        assert_eq!(args[2].1, "TCP");
        assert_eq!(args[3].1, "6881");
        assert_eq!(args[4].1, "192.168.2.10");
        assert_eq!(args[5].1, "1");
        assert_eq!(args[7].1, "0");
    }
}

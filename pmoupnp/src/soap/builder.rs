//! Construction des requêtes et réponses SOAP

use crate::urns::{SOAP_ENCODING_NAMESPACE, SOAP_ENVELOPE_NAMESPACE};
use xmltree::{Element, XMLNode};

pub(crate) fn build_soap_envelope_with_body(body_child: Element) -> Result<String, xmltree::Error> {
    // Body
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NAMESPACE.to_string());
    envelope.attributes.insert(
        "s:encodingStyle".to_string(),
        SOAP_ENCODING_NAMESPACE.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn build_action_element<K, V>(name: &str, service_urn: &str, args: &[(K, V)]) -> Element
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut elem = Element::new(name);
    elem.attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (key, value) in args {
        let mut child = Element::new(key.as_ref());
        let value = value.as_ref();
        if !value.is_empty() {
            child.children.push(XMLNode::Text(value.to_string()));
        }
        elem.children.push(XMLNode::Element(child));
    }

    elem
}

/// Construit une requête SOAP UPnP
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:WANIPConnection:1")
/// * `action` - Nom de l'action (ex: "GetStatusInfo")
/// * `args` - Arguments de l'action, dans l'ordre attendu par le service
///
/// Un argument de valeur vide produit un élément vide (ex: `NewRemoteHost`).
pub fn build_soap_request<K, V>(
    service_urn: &str,
    action: &str,
    args: &[(K, V)],
) -> Result<String, xmltree::Error>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let request_name = format!("u:{}", action);
    build_soap_envelope_with_body(build_action_element(&request_name, service_urn, args))
}

/// Construit une réponse SOAP UPnP
///
/// Sert à simuler une passerelle (tests, outils de diagnostic).
pub fn build_soap_response<K, V>(
    service_urn: &str,
    action: &str,
    values: &[(K, V)],
) -> Result<String, xmltree::Error>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let response_name = format!("u:{}Response", action);
    build_soap_envelope_with_body(build_action_element(&response_name, service_urn, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WANIP: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";

    #[test]
    fn test_build_request_without_args() {
        let xml = build_soap_request::<&str, &str>(WANIP, "GetStatusInfo", &[]).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("u:GetStatusInfo"));
        assert!(xml.contains("xmlns:u=\"urn:schemas-upnp-org:service:WANIPConnection:1\""));
        assert!(xml.contains("xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\""));
        assert!(xml.contains("s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\""));
    }

    #[test]
    fn test_build_request_with_args() {
        let xml = build_soap_request(
            WANIP,
            "AddPortMapping",
            &[
                ("NewRemoteHost", ""),
                ("NewExternalPort", "6881"),
                ("NewProtocol", "TCP"),
            ],
        )
        .unwrap();

        assert!(xml.contains("<NewExternalPort>6881</NewExternalPort>"));
        assert!(xml.contains("<NewProtocol>TCP</NewProtocol>"));
        assert!(xml.contains("NewRemoteHost"));
        // l'ordre des arguments est celui donné
        let ext = xml.find("NewExternalPort").unwrap();
        let proto = xml.find("NewProtocol").unwrap();
        assert!(ext < proto);
    }

    #[test]
    fn test_build_response() {
        let xml = build_soap_response(
            WANIP,
            "GetExternalIPAddress",
            &[("NewExternalIPAddress", "203.0.113.7")],
        )
        .unwrap();

        assert!(xml.contains("GetExternalIPAddressResponse"));
        assert!(xml.contains("<NewExternalIPAddress>203.0.113.7</NewExternalIPAddress>"));
    }
}

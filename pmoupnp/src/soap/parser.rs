//! Parser SOAP pour les réponses UPnP

use super::{SoapBody, SoapEnvelope, SoapHeader};
use crate::urns::SOAP_ENVELOPE_NAMESPACE;
use std::io::BufReader;
use xmltree::{Element, XMLNode};

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Unexpected SOAP Envelope namespace: {0}")]
    WrongNamespace(String),

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parse une enveloppe SOAP complète
///
/// La racine doit être un élément `Envelope` ; s'il porte un namespace,
/// ce doit être celui de SOAP 1.1.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    // Vérifier que c'est bien une Envelope
    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }
    if let Some(ns) = &root.namespace {
        if ns != SOAP_ENVELOPE_NAMESPACE {
            return Err(SoapParseError::WrongNamespace(ns.clone()));
        }
    }

    // Extraire Header (optionnel)
    let header = find_child_with_suffix(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    // Extraire Body (obligatoire)
    let body_elem = find_child_with_suffix(&root, "Body").ok_or(SoapParseError::MissingBody)?;

    let body = SoapBody {
        content: body_elem.clone(),
    };

    Ok(SoapEnvelope { header, body })
}

/// Premier enfant direct de `parent` dont le nom local se termine par `suffix`
pub fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}

/// Texte (sans espaces de bord) de l'enfant `name`, vide si l'élément est vide.
///
/// `None` si l'élément est absent.
pub fn child_text(parent: &Element, name: &str) -> Option<String> {
    let child = find_child_with_suffix(parent, name)?;
    Some(
        child
            .get_text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_parse_response_envelope() {
        let envelope = parse_soap_envelope(BELKIN_STATUS.as_bytes()).unwrap();
        assert!(envelope.header.is_none());

        let response = envelope.body.first_element().unwrap();
        assert_eq!(response.name, "GetStatusInfoResponse");
        assert_eq!(
            child_text(response, "NewConnectionStatus").as_deref(),
            Some("Connected")
        );
        assert_eq!(child_text(response, "NewUptime").as_deref(), Some("194979"));
        assert_eq!(child_text(response, "NewMissing"), None);
    }

    #[test]
    fn test_parse_request_envelope() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:GetGenericPortMappingEntry xmlns:u="urn:schemas-upnp-org:service:WANPPPConnection:1">
      <NewPortMappingIndex>3</NewPortMappingIndex>
    </u:GetGenericPortMappingEntry>
  </s:Body>
</s:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        let action = envelope.body.first_element().unwrap();
        assert_eq!(action.name, "GetGenericPortMappingEntry");
        assert_eq!(
            action.namespace.as_deref(),
            Some("urn:schemas-upnp-org:service:WANPPPConnection:1")
        );
        assert_eq!(child_text(action, "NewPortMappingIndex").as_deref(), Some("3"));
    }

    #[test]
    fn test_not_an_envelope() {
        let xml = r#"<?xml version="1.0"?><root><Body/></root>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingEnvelope)
        ));
    }

    #[test]
    fn test_wrong_envelope_namespace() {
        let xml = r#"<?xml version="1.0"?><e:Envelope xmlns:e="urn:other"><e:Body/></e:Envelope>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::WrongNamespace(_))
        ));
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"/>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingBody)
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_soap_envelope(b"<s:Envelope><s:Body>"),
            Err(SoapParseError::XmlError(_))
        ));
    }
}

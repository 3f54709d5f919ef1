//! SOAP Faults pour UPnP

use super::builder::build_soap_envelope_with_body;
use super::parser::{child_text, find_child_with_suffix};
use super::SoapBody;
use crate::urns::CONTROL_NAMESPACE;
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Client")
    pub fault_code: String,

    /// Description de l'erreur (en général "UPnPError")
    pub fault_string: String,

    /// Détails UPnP optionnels
    pub upnp_error: Option<UpnpError>,
}

/// Erreur UPnP spécifique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: 713, 718)
    pub error_code: u32,

    /// Description de l'erreur
    pub error_description: String,
}

impl SoapFault {
    /// Lit le `Fault` d'un corps SOAP, s'il y en a un.
    ///
    /// Le détail UPnP n'est retenu que si `errorCode` est un entier.
    pub fn from_body(body: &SoapBody) -> Option<Self> {
        let fault = find_child_with_suffix(&body.content, "Fault")?;

        let fault_code = child_text(fault, "faultcode").unwrap_or_default();
        let fault_string = child_text(fault, "faultstring").unwrap_or_default();

        let upnp_error = find_child_with_suffix(fault, "detail")
            .and_then(|detail| find_child_with_suffix(detail, "UPnPError"))
            .and_then(|upnp_error| {
                let error_code = child_text(upnp_error, "errorCode")?.parse::<u32>().ok()?;
                let error_description =
                    child_text(upnp_error, "errorDescription").unwrap_or_default();
                Some(UpnpError {
                    error_code,
                    error_description,
                })
            });

        Some(Self {
            fault_code,
            fault_string,
            upnp_error,
        })
    }

    /// Code d'erreur UPnP, s'il est présent
    pub fn error_code(&self) -> Option<u32> {
        self.upnp_error.as_ref().map(|e| e.error_code)
    }
}

fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "s:Client")
/// * `fault_string` - Message d'erreur
/// * `upnp_error` - Code et description d'erreur UPnP optionnels
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    upnp_error: Option<(u32, &str)>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new("s:Fault");
    fault
        .children
        .push(XMLNode::Element(text_element("faultcode", fault_code)));
    fault
        .children
        .push(XMLNode::Element(text_element("faultstring", fault_string)));

    if let Some((code, desc)) = upnp_error {
        let mut detail = Element::new("detail");

        let mut upnp_error = Element::new("UPnPError");
        upnp_error
            .attributes
            .insert("xmlns".to_string(), CONTROL_NAMESPACE.to_string());
        upnp_error.children.push(XMLNode::Element(text_element(
            "errorCode",
            &code.to_string(),
        )));
        upnp_error
            .children
            .push(XMLNode::Element(text_element("errorDescription", desc)));

        detail.children.push(XMLNode::Element(upnp_error));
        fault.children.push(XMLNode::Element(detail));
    }

    build_soap_envelope_with_body(fault)
}

//! # Module SOAP - Simple Object Access Protocol
//!
//! Enveloppes SOAP pour l'appel d'actions UPnP côté *control point*.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction des requêtes `u:<Action>` dans le namespace du service
//! - ✅ Parsing d'enveloppes SOAP et accès aux éléments par nom local
//! - ✅ Lecture des SOAP Faults et du code d'erreur UPnP
//! - ✅ Construction de réponses et de faults (devices simulés, tests)
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP complète
//! - [`SoapFault`] : Erreur SOAP, avec son [`UpnpError`] éventuel
//!
//! ## Example
//!
//! ```
//! use pmoupnp::soap::{build_soap_request, child_text, parse_soap_envelope};
//!
//! let xml = build_soap_request(
//!     "urn:schemas-upnp-org:service:WANIPConnection:1",
//!     "GetGenericPortMappingEntry",
//!     &[("NewPortMappingIndex", "0")],
//! )
//! .unwrap();
//!
//! let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
//! let action = envelope.body.first_element().unwrap();
//! assert_eq!(action.name, "GetGenericPortMappingEntry");
//! assert_eq!(child_text(action, "NewPortMappingIndex").as_deref(), Some("0"));
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{build_soap_request, build_soap_response};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, UpnpError, build_soap_fault};
pub use parser::{SoapParseError, child_text, find_child_with_suffix, parse_soap_envelope};

/// Codes d'erreur UPnP utiles au client IGD
pub mod error_codes {
    /// Entrée de table inexistante
    pub const NO_SUCH_ENTRY_IN_ARRAY: u32 = 714;

    /// Index de table hors limites (fin de GetGenericPortMappingEntry)
    pub const SPECIFIED_ARRAY_INDEX_INVALID: u32 = 713;
}

use pmoupnp::description::DescriptionError;
use pmoupnp::soap::{SoapParseError, error_codes};
use pmoupnp::ssdp::SsdpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgdError {
    #[error("No private IPv4 address to search from")]
    NoPrivateAddress,
    #[error("No Internet Gateway Device found")]
    NoGateway,
    #[error("SSDP error: {0}")]
    Ssdp(#[from] SsdpError),
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("Cannot build SOAP request: {0}")]
    SoapBuild(#[from] xmltree::Error),
    #[error("Device description error: {0}")]
    Description(#[from] DescriptionError),
    #[error("Soap Error: No envelope for action {0}: {1}")]
    SoapNoEnvelope(String, SoapParseError),
    #[error("{0} returned UPnP error {1}: {2} (HTTP status {3})")]
    UpnpFault(String, u32, String, u16),
    #[error("{0} failed with HTTP status {1} and body: {2}")]
    HttpStatus(String, u16, String),
    #[error("Missing {0} element in SOAP body")]
    MissingReturnValue(String),
    #[error("Invalid {0} value: {1}")]
    BadReturnValue(String, String),
    #[error("Malformed port mapping entry {0}: {1}")]
    MalformedEntry(u32, Box<IgdError>),
    #[error("Unexpected connection status {0:?}")]
    UnexpectedStatus(String),
    #[error("No WAN connection service in description at {0}")]
    NoWanConnectionService(String),
    #[error("{0} is not a WAN connection service")]
    InvalidServiceType(String),
    #[error("Unknown protocol {0:?}, expected TCP or UDP")]
    InvalidProtocol(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl IgdError {
    pub fn missing_return_value(value: &str) -> Self {
        IgdError::MissingReturnValue(value.to_string())
    }

    pub fn bad_return_value(name: &str, value: &str) -> Self {
        IgdError::BadReturnValue(name.to_string(), value.to_string())
    }

    /// Code d'erreur UPnP porté par un SOAP Fault, s'il y en a un
    pub fn upnp_error_code(&self) -> Option<u32> {
        match self {
            IgdError::UpnpFault(_, code, _, _) => Some(*code),
            _ => None,
        }
    }

    /// Vrai si l'entrée de la table a été lue mais ne peut pas être décodée.
    pub fn is_malformed_entry(&self) -> bool {
        matches!(self, IgdError::MalformedEntry(_, _))
    }

    /// Vrai si la passerelle signale un index hors de la table des redirections.
    pub fn is_end_of_table(&self) -> bool {
        matches!(
            self.upnp_error_code(),
            Some(error_codes::SPECIFIED_ARRAY_INDEX_INVALID)
                | Some(error_codes::NO_SUCH_ENTRY_IN_ARRAY)
        )
    }
}

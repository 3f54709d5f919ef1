//! URNs et namespaces UPnP utilisés par le client IGD.

pub const DEVICE_TYPE_IGD: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice:1";
pub const SERVICE_TYPE_WANIPC: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";
pub const SERVICE_TYPE_WANPPPC: &str = "urn:schemas-upnp-org:service:WANPPPConnection:1";
pub const ROOT_DEVICE: &str = "upnp:rootdevice";

/// Namespace de l'élément racine d'une description de device
pub const DEVICE_NAMESPACE: &str = "urn:schemas-upnp-org:device-1-0";

/// Namespace de l'élément `UPnPError` dans le détail d'un SOAP Fault
pub const CONTROL_NAMESPACE: &str = "urn:schemas-upnp-org:control-1-0";

pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENCODING_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Services de connexion WAN acceptés comme cible de contrôle.
pub const WAN_CONNECTION_SERVICES: [&str; 2] = [SERVICE_TYPE_WANIPC, SERVICE_TYPE_WANPPPC];

/// Vrai si `service_type` est l'un des services de connexion WAN.
pub fn is_wan_connection_service(service_type: &str) -> bool {
    WAN_CONNECTION_SERVICES.contains(&service_type)
}

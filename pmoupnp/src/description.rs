//! # Description de device UPnP
//!
//! Modèle de `description.xml` réduit à ce qu'un control point IGD utilise :
//! l'URL de base, et l'arbre des devices avec leurs services.
//!
//! Chaque [`DeviceNode`] possède ses sous-devices ; l'arbre est strictement
//! hiérarchique et peu profond.

use crate::urns::DEVICE_NAMESPACE;
use serde::Deserialize;

/// Erreur de décodage d'une description
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    #[error("XML decode error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("Unexpected root namespace {0:?}, expected urn:schemas-upnp-org:device-1-0")]
    WrongNamespace(Option<String>),
}

/// Racine d'un document de description (`<root>`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "root")]
pub struct DeviceDescription {
    #[serde(rename = "@xmlns", default)]
    pub xmlns: Option<String>,

    #[serde(rename = "specVersion", default)]
    pub spec_version: SpecVersion,

    /// Base des URLs relatives (absente des devices UPnP 1.1)
    #[serde(rename = "URLBase", default)]
    pub url_base: String,

    pub device: DeviceNode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecVersion {
    #[serde(default)]
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
}

/// Device, avec ses services et ses sous-devices dans l'ordre du document
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceNode {
    #[serde(rename = "deviceType", default)]
    pub device_type: String,

    #[serde(rename = "friendlyName", default)]
    pub friendly_name: String,

    #[serde(default)]
    pub manufacturer: String,

    #[serde(rename = "UDN", default)]
    pub udn: String,

    #[serde(rename = "serviceList", default)]
    service_list: ServiceList,

    #[serde(rename = "deviceList", default)]
    device_list: DeviceList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServiceList {
    #[serde(rename = "service", default)]
    services: Vec<ServiceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeviceList {
    #[serde(rename = "device", default)]
    devices: Vec<DeviceNode>,
}

/// Service déclaré par un device
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceRef {
    #[serde(rename = "serviceType", default)]
    pub service_type: String,

    /// URL de contrôle, relative à `URLBase`
    #[serde(rename = "controlURL", default)]
    pub control_url: String,
}

impl DeviceDescription {
    /// Décode un document de description.
    ///
    /// L'élément racine doit appartenir au namespace
    /// `urn:schemas-upnp-org:device-1-0`.
    pub fn parse(xml: &str) -> Result<Self, DescriptionError> {
        let description: DeviceDescription = quick_xml::de::from_str(xml)?;

        if description.xmlns.as_deref().map(str::trim) != Some(DEVICE_NAMESPACE) {
            return Err(DescriptionError::WrongNamespace(description.xmlns));
        }

        Ok(description)
    }

    /// Base à utiliser pour les URLs relatives.
    ///
    /// `URLBase` tel quel s'il est renseigné, sinon `scheme://host[:port]`
    /// de l'URL d'où la description a été lue.
    pub fn effective_url_base(&self, location: &str) -> String {
        if !self.url_base.trim().is_empty() {
            return self.url_base.clone();
        }

        match location.split_once("://") {
            Some((scheme, rest)) => {
                let authority = rest.split('/').next().unwrap_or(rest);
                format!("{}://{}", scheme, authority)
            }
            None => String::new(),
        }
    }
}

impl DeviceNode {
    pub fn services(&self) -> &[ServiceRef] {
        &self.service_list.services
    }

    pub fn subdevices(&self) -> &[DeviceNode] {
        &self.device_list.devices
    }

    /// Recherche en profondeur du premier service satisfaisant `predicate`.
    ///
    /// Les services du device courant sont examinés d'abord, dans l'ordre
    /// du document ; on ne descend dans les sous-devices qu'ensuite.
    pub fn find_service<F>(&self, predicate: &F) -> Option<&ServiceRef>
    where
        F: Fn(&ServiceRef) -> bool,
    {
        self.services()
            .iter()
            .find(|service| predicate(*service))
            .or_else(|| {
                self.subdevices()
                    .iter()
                    .find_map(|device| device.find_service(predicate))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <URLBase>http://10.0.0.1:5000</URLBase>
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>Gateway</friendlyName>
    <manufacturer>ACME</manufacturer>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:Layer3Forwarding:1</serviceType>
        <controlURL>/l3f</controlURL>
      </service>
    </serviceList>
    <deviceList>
      <device>
        <friendlyName>WAN A</friendlyName>
        <deviceList>
          <device>
            <friendlyName>WAN A conn</friendlyName>
            <serviceList>
              <service>
                <serviceType>urn:schemas-upnp-org:service:WANPPPConnection:1</serviceType>
                <controlURL>/a/ppp</controlURL>
              </service>
            </serviceList>
          </device>
        </deviceList>
      </device>
      <device>
        <friendlyName>WAN B</friendlyName>
        <serviceList>
          <service>
            <serviceType>urn:schemas-upnp-org:service:WANIPConnection:1</serviceType>
            <controlURL>/b/ip</controlURL>
          </service>
        </serviceList>
      </device>
    </deviceList>
  </device>
</root>"#;

    #[test]
    fn test_parse_tree() {
        let desc = DeviceDescription::parse(NESTED).unwrap();
        assert_eq!(desc.url_base, "http://10.0.0.1:5000");
        assert_eq!(desc.spec_version.major, 1);
        assert_eq!(desc.device.friendly_name, "Gateway");
        assert_eq!(desc.device.manufacturer, "ACME");
        assert_eq!(desc.device.services().len(), 1);

        let children = desc.device.subdevices();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].friendly_name, "WAN A");
        assert!(children[0].services().is_empty());
        assert_eq!(children[0].subdevices()[0].friendly_name, "WAN A conn");
        assert_eq!(children[1].friendly_name, "WAN B");
    }

    #[test]
    fn test_depth_first_document_order() {
        let desc = DeviceDescription::parse(NESTED).unwrap();
        let found = desc
            .device
            .find_service(&|s: &ServiceRef| s.service_type.contains("Connection:1"))
            .unwrap();

        // WAN A is explored completely before WAN B
        assert_eq!(found.control_url, "/a/ppp");
    }

    #[test]
    fn test_services_before_subdevices() {
        let desc = DeviceDescription::parse(NESTED).unwrap();
        let found = desc
            .device
            .find_service(&|s: &ServiceRef| s.control_url.starts_with('/'))
            .unwrap();
        assert_eq!(found.control_url, "/l3f");
    }

    #[test]
    fn test_no_match() {
        let desc = DeviceDescription::parse(NESTED).unwrap();
        assert!(desc
            .device
            .find_service(&|s: &ServiceRef| s.service_type.is_empty())
            .is_none());
    }

    #[test]
    fn test_wrong_namespace_is_rejected() {
        let xml = r#"<root xmlns="urn:example"><device><friendlyName>x</friendlyName></device></root>"#;
        assert!(matches!(
            DeviceDescription::parse(xml),
            Err(DescriptionError::WrongNamespace(_))
        ));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(matches!(
            DeviceDescription::parse("<root xmlns=\"urn:schemas-upnp-org:device-1-0\"><device>"),
            Err(DescriptionError::Xml(_))
        ));
    }

    #[test]
    fn test_effective_url_base() {
        let desc = DeviceDescription::parse(NESTED).unwrap();
        assert_eq!(
            desc.effective_url_base("http://10.0.0.1:1900/desc.xml"),
            "http://10.0.0.1:5000"
        );

        let no_base = DeviceDescription::parse(
            r#"<root xmlns="urn:schemas-upnp-org:device-1-0"><device><friendlyName>x</friendlyName></device></root>"#,
        )
        .unwrap();
        assert_eq!(
            no_base.effective_url_base("http://192.168.1.1:49000/igddesc.xml"),
            "http://192.168.1.1:49000"
        );
    }

    #[test]
    fn test_url_base_is_kept_as_is() {
        let slash = DeviceDescription::parse(
            r#"<root xmlns="urn:schemas-upnp-org:device-1-0"><URLBase>http://10.0.0.1:5000/</URLBase><device><friendlyName>x</friendlyName></device></root>"#,
        )
        .unwrap();
        assert_eq!(
            slash.effective_url_base("http://10.0.0.1:1900/desc.xml"),
            "http://10.0.0.1:5000/"
        );
    }
}

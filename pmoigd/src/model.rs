use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::IgdError;

/// Protocole de transport d'une redirection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = IgdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("tcp") {
            Ok(Protocol::Tcp)
        } else if s.eq_ignore_ascii_case("udp") {
            Ok(Protocol::Udp)
        } else {
            Err(IgdError::InvalidProtocol(s.to_string()))
        }
    }
}

/// Redirection de port déclarée sur la passerelle.
///
/// Sert aussi de poignée pour [`crate::Igd::delete_port_redirection`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    pub internal_port: u16,
    pub external_port: u16,
    pub protocol: Protocol,
    pub internal_host: IpAddr,
    pub description: String,
    pub enabled: bool,
    /// Durée du bail en secondes, 0 = permanent
    pub lease: u32,
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}<={} {} \"{}\" ({}, {})",
            self.internal_host,
            self.internal_port,
            self.external_port,
            self.protocol,
            self.description,
            self.enabled,
            self.lease
        )
    }
}

/// État de la connexion WAN.
///
/// L'adresse externe n'est connue que lorsque la passerelle est connectée.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    connected: bool,
    external_ip: Option<IpAddr>,
}

impl ConnectionStatus {
    pub fn connected(external_ip: IpAddr) -> Self {
        Self {
            connected: true,
            external_ip: Some(external_ip),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            external_ip: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn external_ip(&self) -> Option<IpAddr> {
        self.external_ip
    }
}

//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Ce module implémente le strict minimum de SSDP côté *control point*
//! pour localiser une passerelle Internet (IGD) sur le réseau local.
//!
//! ## Fonctionnement
//!
//! Pour une adresse locale donnée, un M-SEARCH est envoyé en multicast pour
//! chaque cible de [`SEARCH_TARGETS`], de la plus spécifique à la plus
//! générale. Après chaque envoi, on attend au plus `timeout` une unique
//! réponse. La première réponse HTTP portant un en-tête `LOCATION` termine
//! la recherche ; sinon on passe à la cible suivante.
//!
//! La durée totale est donc bornée par `SEARCH_TARGETS.len() × timeout`.
//!
//! ## Constants SSDP
//!
//! - **Multicast Address**: 239.255.255.250:1900
//! - **MX**: le timeout en secondes entières (au moins 1)

mod client;

pub use client::{SearchResponse, SsdpClient, discover_description_url, parse_search_response};

use crate::urns::{DEVICE_TYPE_IGD, ROOT_DEVICE, SERVICE_TYPE_WANIPC, SERVICE_TYPE_WANPPPC};

/// Adresse multicast SSDP
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Port SSDP
pub const SSDP_PORT: u16 = 1900;

/// Cibles de recherche, de la plus spécifique à la plus générale.
///
/// La dernière est un repli (copié du comportement de MiniUPnPc) qui donne
/// rarement un résultat exploitable.
pub const SEARCH_TARGETS: [&str; 4] = [
    DEVICE_TYPE_IGD,
    SERVICE_TYPE_WANIPC,
    SERVICE_TYPE_WANPPPC,
    ROOT_DEVICE,
];

/// Erreurs de la recherche SSDP
#[derive(Debug, thiserror::Error)]
pub enum SsdpError {
    #[error("SSDP socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No SSDP answer with a LOCATION header from {0}")]
    NotFound(std::net::Ipv4Addr),
}

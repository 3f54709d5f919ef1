/// Utilitaires pour la gestion des adresses IP réseau.
///
/// Ce module fournit des fonctions pour lister les adresses des interfaces
/// réseau locales et pour reconnaître les plages privées de la RFC 1918.
///
/// # Fonctions principales
///
/// - [`is_private_ip`] : vrai si l'adresse appartient à 10/8, 172.16/12 ou 192.168/16
/// - [`list_local_addresses`] : toutes les adresses non-loopback, avec leur classification
/// - [`local_private_addrs`] : les adresses IPv4 privées, dans l'ordre des interfaces
///
/// # Examples
///
/// ```
/// use pmoutils::is_private_ip;
///
/// assert!(is_private_ip(&"192.168.1.42".parse().unwrap()));
/// assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
/// ```
mod ip_utils;

pub use ip_utils::{LocalAddress, is_private_ip, list_local_addresses, local_private_addrs};

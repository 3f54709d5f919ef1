use get_if_addrs::get_if_addrs;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// Adresse d'une interface locale, avec sa classification RFC 1918.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAddress {
    /// Nom de l'interface (ex: `"eth0"`, `"wlan0"`, `"en0"`)
    pub name: String,
    pub ip: IpAddr,
    /// `true` si l'adresse est dans une plage privée
    pub private: bool,
}

/// Indique si une adresse appartient à l'une des plages réservées par la
/// RFC 1918 aux réseaux privés.
///
/// Plages reconnues : `10.0.0.0/8`, `172.16.0.0/12` et `192.168.0.0/16`.
/// Les adresses IPv6 ne sont jamais considérées comme privées.
///
/// Utile aussi pour savoir si l'adresse externe annoncée par une passerelle
/// est réellement publique (double NAT).
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private(),
        IpAddr::V6(_) => false,
    }
}

/// Liste toutes les adresses non-loopback des interfaces réseau.
///
/// L'ordre est celui renvoyé par le système.
pub fn list_local_addresses() -> io::Result<Vec<LocalAddress>> {
    let addresses = get_if_addrs()?
        .into_iter()
        .filter(|iface| !iface.ip().is_loopback())
        .map(|iface| {
            let ip = iface.ip();
            LocalAddress {
                private: is_private_ip(&ip),
                name: iface.name,
                ip,
            }
        })
        .collect();

    Ok(addresses)
}

/// Retourne les adresses IPv4 locales situées dans une plage privée.
///
/// Ce sont les seules adresses depuis lesquelles une passerelle NAT a un
/// sens. En cas d'erreur d'énumération, la liste est vide.
pub fn local_private_addrs() -> Vec<Ipv4Addr> {
    let addresses = match list_local_addresses() {
        Ok(addresses) => addresses,
        Err(e) => {
            warn!("Failed to enumerate network interfaces: {}", e);
            return Vec::new();
        }
    };

    addresses
        .into_iter()
        .filter_map(|addr| match addr.ip {
            IpAddr::V4(ipv4) if addr.private => {
                debug!("Found private addr {} on {}", ipv4, addr.name);
                Some(ipv4)
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_private_ranges() {
        assert!(is_private_ip(&ip("192.168.2.32")));
        assert!(is_private_ip(&ip("10.230.46.52")));
        assert!(is_private_ip(&ip("172.22.8.61")));
        assert!(is_private_ip(&ip("10.0.0.1")));
        assert!(is_private_ip(&ip("172.16.0.0")));
        assert!(is_private_ip(&ip("172.31.255.255")));
        assert!(is_private_ip(&ip("192.168.0.1")));
    }

    #[test]
    fn test_public_addresses() {
        assert!(!is_private_ip(&ip("184.85.61.15")));
        assert!(!is_private_ip(&ip("137.164.29.67")));
        assert!(!is_private_ip(&ip("8.8.8.8")));
    }

    #[test]
    fn test_range_boundaries() {
        assert!(!is_private_ip(&ip("172.15.255.255")));
        assert!(!is_private_ip(&ip("172.32.0.0")));
        assert!(!is_private_ip(&ip("192.169.0.1")));
        assert!(!is_private_ip(&ip("11.0.0.1")));
    }

    #[test]
    fn test_loopback_and_ipv6_are_not_private() {
        // loopback n'est pas "privé" au sens réseau local
        assert!(!is_private_ip(&ip("127.0.0.1")));
        assert!(!is_private_ip(&ip("::1")));
        assert!(!is_private_ip(&ip("fd00::1")));
    }

    #[test]
    fn test_list_local_addresses_no_loopback() {
        if let Ok(addresses) = list_local_addresses() {
            for addr in addresses {
                assert!(!addr.ip.is_loopback(), "Loopback addresses should be filtered out");
                assert_eq!(addr.private, is_private_ip(&addr.ip));
            }
        }
    }

    #[test]
    fn test_local_private_addrs_are_private() {
        for addr in local_private_addrs() {
            assert!(addr.is_private(), "{} should be private", addr);
        }
    }
}

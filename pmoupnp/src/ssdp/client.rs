/*!
The SSDP client is a *control point*.
It must **not** bind to UDP port 1900.

It binds an ephemeral port on one local IPv4 address, sends M-SEARCH
requests to the multicast group through that interface, and reads the
unicast HTTP replies the devices send back to the ephemeral port.

One socket is opened per local address and dropped when the search over
all targets for that address is over.
*/
//! Client SSDP pour la découverte de la passerelle

use super::{SEARCH_TARGETS, SSDP_MULTICAST_ADDR, SSDP_PORT, SsdpError};
use socket2::{Domain, Protocol, SockRef, Socket, Type};
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Réponse HTTP à un M-SEARCH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub status: u16,
    /// URL de la description du device (en-tête `LOCATION`)
    pub location: String,
    pub st: Option<String>,
    pub usn: Option<String>,
    pub server: Option<String>,
}

/// Client SSDP lié à une adresse locale
pub struct SsdpClient {
    socket: UdpSocket,
    local_ip: Ipv4Addr,
    destination: SocketAddr,
}

impl SsdpClient {
    /// Crée un client lié à `local_ip` sur un port éphémère.
    ///
    /// Les M-SEARCH partent vers 239.255.255.250:1900 par cette interface.
    pub fn bind(local_ip: Ipv4Addr) -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;

        let bind_addr = SocketAddr::V4(SocketAddrV4::new(local_ip, 0));
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        let destination = SocketAddr::V4(SocketAddrV4::new(multicast_group(), SSDP_PORT));

        debug!("SSDP client bound on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            local_ip,
            destination,
        })
    }

    /// Remplace la destination des M-SEARCH (multicast par défaut).
    ///
    /// Une destination unicast permet d'interroger un device connu.
    pub fn with_destination(mut self, destination: SocketAddr) -> Self {
        self.destination = destination;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Fait sortir le multicast par l'interface de `local_ip`.
    fn select_multicast_interface(&self) -> io::Result<()> {
        if let IpAddr::V4(group) = self.destination.ip() {
            if group.is_multicast() {
                SockRef::from(&self.socket).set_multicast_if_v4(&self.local_ip)?;
            }
        }
        Ok(())
    }

    /// Envoie un M-SEARCH pour un type donné
    pub fn send_msearch(&self, st: &str, mx: u64) -> io::Result<()> {
        self.select_multicast_interface()?;

        let msg = build_msearch(st, mx);

        match self.socket.send_to(msg.as_bytes(), self.destination) {
            Ok(_) => {
                debug!("M-SEARCH sent from {} (ST={}, MX={})", self.local_ip, st, mx);
                trace!("M-SEARCH payload:\n{}", msg);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send M-SEARCH from {}: {}", self.local_ip, e);
                Err(e)
            }
        }
    }

    /// Attend une unique réponse pendant au plus `timeout`.
    ///
    /// Retourne `Ok(None)` si la réponse n'est pas une réponse HTTP
    /// exploitable (pas de ligne de statut ou pas de `LOCATION`).
    pub fn recv_response(&self, timeout: Duration) -> io::Result<Option<SearchResponse>> {
        self.socket
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;

        let mut buf = [0u8; 8192];
        let (n, from) = self.socket.recv_from(&mut buf)?;
        debug!("Received {} bytes from {}", n, from);

        let data = String::from_utf8_lossy(&buf[..n]);
        let response = parse_search_response(&data);
        if response.is_none() {
            warn!("Unusable SSDP answer from {}:\n{}", from, data);
        }
        Ok(response)
    }

    /// Parcourt `targets` dans l'ordre et retourne la première `LOCATION` reçue.
    ///
    /// Une erreur d'envoi, un timeout ou une réponse inexploitable font
    /// passer à la cible suivante.
    pub fn search(&self, targets: &[&str], timeout: Duration) -> Result<String, SsdpError> {
        let mx = timeout.as_secs().max(1);

        for st in targets {
            if self.send_msearch(st, mx).is_err() {
                continue;
            }

            match self.recv_response(timeout) {
                Ok(Some(response)) => {
                    info!(
                        "IGD candidate for ST={} on {}: {}",
                        st, self.local_ip, response.location
                    );
                    return Ok(response.location);
                }
                Ok(None) => {}
                Err(e) if is_timeout(&e) => {
                    debug!("No SSDP answer for ST={} on {} within {:?}", st, self.local_ip, timeout);
                }
                Err(e) => {
                    warn!("SSDP read error on {}: {}", self.local_ip, e);
                }
            }
        }

        Err(SsdpError::NotFound(self.local_ip))
    }
}

/// Cherche une passerelle depuis `local_ip` et retourne l'URL de sa description.
///
/// Les quatre cibles de [`SEARCH_TARGETS`] sont essayées l'une après
/// l'autre, chacune avec une attente d'au plus `timeout`. Un timeout
/// inférieur à 3 secondes laisse peu de chances aux vrais devices.
pub fn discover_description_url(local_ip: Ipv4Addr, timeout: Duration) -> Result<String, SsdpError> {
    let client = SsdpClient::bind(local_ip)?;
    client.search(&SEARCH_TARGETS, timeout)
}

fn multicast_group() -> Ipv4Addr {
    SSDP_MULTICAST_ADDR
        .parse()
        .unwrap_or(Ipv4Addr::new(239, 255, 255, 250))
}

fn build_msearch(st: &str, mx: u64) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         ST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, SSDP_PORT, st, mx
    )
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Analyse une réponse HTTP à un M-SEARCH.
///
/// La réponse doit commencer par une ligne de statut `HTTP/x.y CODE` et
/// porter un en-tête `LOCATION` non vide.
pub fn parse_search_response(data: &str) -> Option<SearchResponse> {
    let mut lines = data.lines();
    let status_line = lines.next()?.trim();
    let status = parse_status_line(status_line)?;
    let mut headers = parse_headers(lines);

    let location = match headers.remove("LOCATION") {
        Some(loc) => loc,
        None => {
            trace!("M-SEARCH response missing LOCATION header, ignoring");
            return None;
        }
    };

    Some(SearchResponse {
        status,
        location,
        st: headers.remove("ST"),
        usn: headers.remove("USN"),
        server: headers.remove("SERVER"),
    })
}

fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.to_ascii_uppercase().starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse::<u16>().ok()
}

fn parse_headers<'a, I>(lines: I) -> HashMap<String, String>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();

        // Empty line marks end of headers
        if line.is_empty() {
            break;
        }

        // Split on first ':' only (values may contain ':')
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_uppercase();
            let value = value.trim().to_string();

            if !name.is_empty() && !value.is_empty() {
                headers.insert(name, value);
            } else {
                trace!("Skipping malformed header: '{}'", line);
            }
        } else {
            trace!("Skipping line without colon: '{}'", line);
        }
    }
    headers
}

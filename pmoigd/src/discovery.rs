//! Découverte d'une passerelle : SSDP, puis description, puis URL de contrôle.
//!
//! Les adresses locales privées sont essayées une à une, dans l'ordre ;
//! la première passerelle exploitable gagne.

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, bounded};
use pmoupnp::description::{DeviceDescription, ServiceRef};
use pmoupnp::ssdp::{SEARCH_TARGETS, SsdpClient, SsdpError, discover_description_url};
use pmoupnp::urns::is_wan_connection_service;
use pmoutils::local_private_addrs;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::errors::IgdError;
use crate::igd::Igd;
use crate::options::IgdOptions;

/// Télécharge et décode la description d'un device.
pub fn fetch_description(location: &str, timeout: Duration) -> Result<DeviceDescription, IgdError> {
    debug!("Fetching description at {}", location);

    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();

    let agent: Agent = config.into();

    let mut response = agent.get(location).call()?;
    let body = response.body_mut().read_to_string()?;
    debug!("Description at {}:\n{}", location, body);

    Ok(DeviceDescription::parse(&body)?)
}

/// Premier service de connexion WAN de la description, et son URL de contrôle.
///
/// L'URL est la simple concaténation de la base et du `controlURL` du
/// service, sans résolution de référence d'URI.
pub fn resolve_control_url(
    description: &DeviceDescription,
    location: &str,
) -> Result<(String, String), IgdError> {
    let service: &ServiceRef = description
        .device
        .find_service(&|s: &ServiceRef| is_wan_connection_service(&s.service_type))
        .ok_or_else(|| IgdError::NoWanConnectionService(location.to_string()))?;

    let control_url = format!(
        "{}{}",
        description.effective_url_base(location),
        service.control_url
    );

    Ok((service.service_type.clone(), control_url))
}

/// Construit la poignée d'une passerelle dont on connaît la description.
pub fn igd_from_location(
    location: &str,
    local_ip: Ipv4Addr,
    options: &IgdOptions,
) -> Result<Igd, IgdError> {
    let description = fetch_description(location, options.http_timeout)?;
    info!(
        "Gateway {:?} ({}) at {}",
        description.device.friendly_name, description.device.manufacturer, location
    );

    let (service_type, control_url) = resolve_control_url(&description, location)?;
    Igd::new(control_url, service_type, local_ip, options.clone())
}

/// Cherche une passerelle depuis une adresse locale.
///
/// Les M-SEARCH partent vers `options.ssdp_destination` si elle est
/// renseignée, vers le groupe multicast SSDP sinon.
pub fn discover_igd_on(local_ip: Ipv4Addr, options: &IgdOptions) -> Result<Igd, IgdError> {
    let location = match options.ssdp_destination {
        Some(destination) => SsdpClient::bind(local_ip)
            .map_err(SsdpError::from)?
            .with_destination(destination)
            .search(&SEARCH_TARGETS, options.ssdp_timeout)?,
        None => discover_description_url(local_ip, options.ssdp_timeout)?,
    };
    info!("Description URL {} found from {}", location, local_ip);

    igd_from_location(&location, local_ip, options)
}

/// Essaie chaque adresse de `local_ips`, dans l'ordre.
///
/// Les échecs sur une adresse sont journalisés puis on passe à la suivante.
pub fn discover_igd_from(local_ips: &[Ipv4Addr], options: &IgdOptions) -> Result<Igd, IgdError> {
    if local_ips.is_empty() {
        return Err(IgdError::NoPrivateAddress);
    }

    for local_ip in local_ips {
        match discover_igd_on(*local_ip, options) {
            Ok(igd) => {
                info!("Internet Gateway Device found: {}", igd);
                return Ok(igd);
            }
            Err(e) => warn!("No usable gateway from {}: {}", local_ip, e),
        }
    }

    Err(IgdError::NoGateway)
}

/// Cherche une passerelle depuis les adresses privées de la machine.
pub fn discover_igd(options: &IgdOptions) -> Result<Igd, IgdError> {
    discover_igd_from(&local_private_addrs(), options)
}

/// Lance [`discover_igd`] en tâche de fond.
///
/// Le canal reçoit au plus une passerelle ; il se ferme sans valeur si
/// aucune n'est trouvée.
pub fn spawn_discover_igd(options: IgdOptions) -> Receiver<Igd> {
    let (tx, rx) = bounded(1);

    let spawned = thread::Builder::new()
        .name("igd-discovery".into())
        .spawn(move || match discover_igd(&options) {
            Ok(igd) => {
                let _ = tx.send(igd);
            }
            Err(e) => warn!("IGD discovery failed: {}", e),
        });
    if let Err(e) = spawned {
        warn!("Cannot spawn igd-discovery thread: {}", e);
    }

    rx
}

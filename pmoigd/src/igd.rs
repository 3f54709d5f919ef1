use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::thread;

use crossbeam_channel::{Receiver, bounded};
use pmoupnp::urns::is_wan_connection_service;
use tracing::{debug, info, warn};

use crate::actions::{ActionResponse, IgdAction, decode_response};
use crate::errors::IgdError;
use crate::model::{ConnectionStatus, PortMapping, Protocol};
use crate::options::IgdOptions;
use crate::soap_client::call_upnp_action;

/// Capacité du canal de [`Igd::spawn_list_redirections`]
pub const LIST_CHANNEL_CAPACITY: usize = 10;

/// Poignée sur une passerelle découverte.
///
/// Immuable : chaque opération est un appel SOAP indépendant, sans session
/// ni connexion gardée ouverte. Le clone est bon marché et chaque tâche de
/// fond travaille sur le sien.
#[derive(Clone, Debug)]
pub struct Igd {
    control_url: String,
    service_type: String,
    local_addr: Ipv4Addr,
    options: IgdOptions,
}

impl Igd {
    /// `service_type` doit être WANIPConnection:1 ou WANPPPConnection:1.
    pub fn new(
        control_url: impl Into<String>,
        service_type: impl Into<String>,
        local_addr: Ipv4Addr,
        options: IgdOptions,
    ) -> Result<Self, IgdError> {
        let service_type = service_type.into();
        if !is_wan_connection_service(&service_type) {
            return Err(IgdError::InvalidServiceType(service_type));
        }

        Ok(Self {
            control_url: control_url.into(),
            service_type,
            local_addr,
            options,
        })
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Adresse locale depuis laquelle la passerelle a été trouvée
    pub fn local_addr(&self) -> Ipv4Addr {
        self.local_addr
    }

    pub fn options(&self) -> &IgdOptions {
        &self.options
    }

    fn call(&self, action: &IgdAction<'_>) -> Result<ActionResponse, IgdError> {
        let envelope = call_upnp_action(
            &self.control_url,
            &self.service_type,
            action.name(),
            &action.arguments(),
            self.options.http_timeout,
        )?;
        decode_response(action, &envelope)
    }

    /// Adresse IP publique de la passerelle
    pub fn external_ip(&self) -> Result<IpAddr, IgdError> {
        match self.call(&IgdAction::GetExternalIpAddress)? {
            ActionResponse::ExternalIp(ip) => Ok(ip),
            _ => Err(IgdError::missing_return_value("NewExternalIPAddress")),
        }
    }

    /// État de la connexion WAN.
    ///
    /// `Connected` (sans tenir compte de la casse) déclenche un second appel
    /// pour l'adresse externe, qui doit réussir lui aussi. Tout autre état
    /// que `Connected` ou `Disconnected` est une erreur.
    pub fn connection_status(&self) -> Result<ConnectionStatus, IgdError> {
        let status = match self.call(&IgdAction::GetStatusInfo)? {
            ActionResponse::Status(status) => status,
            _ => return Err(IgdError::missing_return_value("NewConnectionStatus")),
        };
        debug!("{} reports connection status {}", self, status.connection_status);

        if status.connection_status.eq_ignore_ascii_case("Connected") {
            let ip = self.external_ip()?;
            Ok(ConnectionStatus::connected(ip))
        } else if status.connection_status.eq_ignore_ascii_case("Disconnected") {
            Ok(ConnectionStatus::disconnected())
        } else {
            Err(IgdError::UnexpectedStatus(status.connection_status))
        }
    }

    /// Redirige `port` externe vers le même `port` de l'adresse locale.
    pub fn add_local_port_redirection(
        &self,
        port: u16,
        protocol: Protocol,
    ) -> Result<PortMapping, IgdError> {
        let description = format!(
            "{} {} {} {}",
            self.options.description_prefix, self.local_addr, port, protocol
        );

        self.call(&IgdAction::AddPortMapping {
            port,
            protocol,
            internal_client: self.local_addr,
            description: &description,
        })?;
        info!("Port {} {} redirected to {}", port, protocol, self.local_addr);

        Ok(PortMapping {
            internal_port: port,
            external_port: port,
            protocol,
            internal_host: IpAddr::V4(self.local_addr),
            description,
            enabled: true,
            lease: 0,
        })
    }

    /// Entrée `index` (à partir de 0) de la table des redirections
    pub fn port_mapping_entry(&self, index: u32) -> Result<PortMapping, IgdError> {
        match self.call(&IgdAction::GetGenericPortMappingEntry { index })? {
            ActionResponse::PortMappingEntry(mapping) => Ok(mapping),
            _ => Err(IgdError::missing_return_value("GetGenericPortMappingEntryResponse")),
        }
    }

    /// Parcours paresseux de la table des redirections.
    ///
    /// Les index sont demandés un par un, dans l'ordre ; abandonner
    /// l'itérateur arrête le parcours. Une entrée illisible est journalisée
    /// puis sautée.
    pub fn list_redirections(&self) -> PortMappings<'_> {
        PortMappings {
            igd: self,
            next_index: 0,
            end: None,
        }
    }

    pub fn delete_port_redirection(&self, mappings: &[PortMapping]) -> Result<(), IgdError> {
        debug!("Refusing to delete {} mapping(s) on {}", mappings.len(), self);
        Err(IgdError::NotImplemented("DeletePortRedirection"))
    }

    /// Lance [`Igd::connection_status`] en tâche de fond.
    ///
    /// Le canal se ferme sans valeur en cas d'échec.
    pub fn spawn_connection_status(&self) -> Receiver<ConnectionStatus> {
        self.spawn_oneshot("igd-status", |igd| igd.connection_status())
    }

    /// Lance [`Igd::add_local_port_redirection`] en tâche de fond.
    pub fn spawn_add_local_port_redirection(
        &self,
        port: u16,
        protocol: Protocol,
    ) -> Receiver<PortMapping> {
        self.spawn_oneshot("igd-add-mapping", move |igd| {
            igd.add_local_port_redirection(port, protocol)
        })
    }

    /// Toujours une erreur [`IgdError::NotImplemented`]
    pub fn spawn_delete_port_redirection(&self, mappings: Vec<PortMapping>) -> Receiver<IgdError> {
        let (tx, rx) = bounded(1);
        let igd = self.clone();

        let spawned = thread::Builder::new()
            .name("igd-delete-mapping".into())
            .spawn(move || {
                if let Err(e) = igd.delete_port_redirection(&mappings) {
                    let _ = tx.send(e);
                }
            });
        if let Err(e) = spawned {
            warn!("Cannot spawn igd-delete-mapping thread: {}", e);
        }

        rx
    }

    /// Parcourt la table en tâche de fond.
    ///
    /// Le canal est borné à [`LIST_CHANNEL_CAPACITY`] et se ferme après la
    /// dernière redirection. Le parcours s'arrête dès que le récepteur est
    /// abandonné.
    pub fn spawn_list_redirections(&self) -> Receiver<PortMapping> {
        let (tx, rx) = bounded(LIST_CHANNEL_CAPACITY);
        let igd = self.clone();

        let spawned = thread::Builder::new()
            .name("igd-list-mappings".into())
            .spawn(move || {
                let mut mappings = igd.list_redirections();
                for mapping in mappings.by_ref() {
                    if tx.send(mapping).is_err() {
                        debug!("Port mapping receiver dropped, stopping enumeration");
                        return;
                    }
                }
                debug!("Port mapping enumeration ended: {:?}", mappings.end());
            });
        if let Err(e) = spawned {
            warn!("Cannot spawn igd-list-mappings thread: {}", e);
        }

        rx
    }

    fn spawn_oneshot<T, F>(&self, name: &str, job: F) -> Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce(&Igd) -> Result<T, IgdError> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let igd = self.clone();
        let thread_name = name.to_string();

        let spawned = thread::Builder::new().name(name.into()).spawn(move || {
            match job(&igd) {
                Ok(value) => {
                    let _ = tx.send(value);
                }
                Err(e) => warn!("{} on {} failed: {}", thread_name, igd, e),
            }
        });
        if let Err(e) = spawned {
            warn!("Cannot spawn {} thread: {}", name, e);
        }

        rx
    }
}

impl fmt::Display for Igd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.control_url)
    }
}

/// Raison de la fin d'un parcours de la table des redirections
#[derive(Debug)]
pub enum EnumerationEnd {
    /// La passerelle a signalé un index hors table (erreur UPnP 713 ou 714)
    EndOfTable,
    /// Tout autre échec (transport, SOAP), qui termine aussi le parcours
    Failed(IgdError),
}

/// Itérateur renvoyé par [`Igd::list_redirections`]
pub struct PortMappings<'a> {
    igd: &'a Igd,
    next_index: u32,
    end: Option<EnumerationEnd>,
}

impl PortMappings<'_> {
    /// Pourquoi le parcours s'est arrêté, `None` tant qu'il continue
    pub fn end(&self) -> Option<&EnumerationEnd> {
        self.end.as_ref()
    }
}

impl Iterator for PortMappings<'_> {
    type Item = PortMapping;

    fn next(&mut self) -> Option<PortMapping> {
        while self.end.is_none() {
            let index = self.next_index;
            match self.igd.port_mapping_entry(index) {
                Ok(mapping) => {
                    self.next_index += 1;
                    return Some(mapping);
                }
                Err(e) if e.is_malformed_entry() => {
                    // l'entrée existe : on la saute
                    warn!("Skipping port mapping at index {}: {}", index, e);
                    self.next_index += 1;
                }
                Err(e) if e.is_end_of_table() => {
                    debug!("End of port mapping table at index {}", index);
                    self.end = Some(EnumerationEnd::EndOfTable);
                }
                Err(e) => {
                    warn!("Port mapping enumeration stopped at index {}: {}", index, e);
                    self.end = Some(EnumerationEnd::Failed(e));
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for PortMappings<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pmoupnp::urns::{SERVICE_TYPE_WANIPC, SERVICE_TYPE_WANPPPC};

    fn local() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 2, 10)
    }

    #[test]
    fn only_wan_connection_services() {
        let url = "http://192.168.2.1:80/upnp/service/WANIPConnection";
        assert!(Igd::new(url, SERVICE_TYPE_WANIPC, local(), IgdOptions::default()).is_ok());
        assert!(Igd::new(url, SERVICE_TYPE_WANPPPC, local(), IgdOptions::default()).is_ok());
        assert!(matches!(
            Igd::new(
                url,
                "urn:schemas-upnp-org:service:Layer3Forwarding:1",
                local(),
                IgdOptions::default()
            ),
            Err(IgdError::InvalidServiceType(_))
        ));
    }

    #[test]
    fn display_is_control_url() {
        let igd = Igd::new(
            "http://192.168.2.1:80/upnp/service/WANIPConnection",
            SERVICE_TYPE_WANIPC,
            local(),
            IgdOptions::default(),
        )
        .unwrap();
        assert_eq!(igd.to_string(), "http://192.168.2.1:80/upnp/service/WANIPConnection");
    }

    #[test]
    fn delete_is_not_implemented() {
        let igd = Igd::new("http://127.0.0.1:9/ctl", SERVICE_TYPE_WANIPC, local(), IgdOptions::default())
            .unwrap();

        assert!(matches!(
            igd.delete_port_redirection(&[]),
            Err(IgdError::NotImplemented(_))
        ));

        let rx = igd.spawn_delete_port_redirection(Vec::new());
        assert!(matches!(rx.recv(), Ok(IgdError::NotImplemented(_))));
        // one error, then closed
        assert!(rx.recv().is_err());
    }
}

//! # pmoigd - Control point UPnP pour passerelles Internet (IGD)
//!
//! Localise la passerelle NAT du réseau local et pilote son service de
//! connexion WAN (WANIPConnection ou WANPPPConnection) :
//!
//! - état de la connexion et adresse IP externe,
//! - parcours de la table des redirections de ports,
//! - création d'une redirection vers la machine locale.
//!
//! Chaque opération existe en version bloquante, qui rend un `Result`, et
//! en tâche de fond (`spawn_*`) qui répond sur un canal `crossbeam` ; le
//! canal se ferme sans valeur en cas d'échec.
//!
//! ```no_run
//! use pmoigd::{IgdOptions, Protocol, discover_igd};
//!
//! let igd = discover_igd(&IgdOptions::default())?;
//! println!("{}", igd.connection_status()?.is_connected());
//!
//! let mapping = igd.add_local_port_redirection(6881, Protocol::Tcp)?;
//! println!("{}", mapping);
//!
//! for mapping in igd.list_redirections() {
//!     println!("{}", mapping);
//! }
//! # Ok::<(), pmoigd::IgdError>(())
//! ```

pub mod actions;
pub mod discovery;
pub mod errors;
pub mod igd;
pub mod model;
pub mod options;
pub mod soap_client;

pub use discovery::{
    discover_igd, discover_igd_from, discover_igd_on, fetch_description, igd_from_location,
    resolve_control_url, spawn_discover_igd,
};
pub use errors::IgdError;
pub use igd::{EnumerationEnd, Igd, LIST_CHANNEL_CAPACITY, PortMappings};
pub use model::{ConnectionStatus, PortMapping, Protocol};
pub use options::IgdOptions;

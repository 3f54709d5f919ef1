use std::net::SocketAddr;
use std::time::Duration;

use pmoconfig::Config;
use tracing::warn;

const DEFAULT_SSDP_TIMEOUT: Duration = Duration::from_secs(4);
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DESCRIPTION_PREFIX: &str = "pmoigd";

/// Réglages du control point IGD
#[derive(Clone, Debug)]
pub struct IgdOptions {
    /// Attente d'une réponse SSDP, par cible de recherche
    pub ssdp_timeout: Duration,
    /// Borne de chaque appel HTTP (description, SOAP)
    pub http_timeout: Duration,
    /// Préfixe des descriptions de redirection
    pub description_prefix: String,
    /// Destination des M-SEARCH à la place du groupe multicast SSDP
    pub ssdp_destination: Option<SocketAddr>,
}

impl Default for IgdOptions {
    fn default() -> Self {
        Self {
            ssdp_timeout: DEFAULT_SSDP_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            description_prefix: DEFAULT_DESCRIPTION_PREFIX.to_string(),
            ssdp_destination: None,
        }
    }
}

impl IgdOptions {
    /// Lit les clés `igd.*` de la configuration.
    ///
    /// Une valeur illisible garde la valeur par défaut.
    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::default();

        match config.get_ssdp_timeout_secs() {
            Ok(secs) => options.ssdp_timeout = Duration::from_secs(secs),
            Err(e) => warn!("igd.ssdp.timeout_secs: {}", e),
        }
        match config.get_http_timeout_secs() {
            Ok(secs) => options.http_timeout = Duration::from_secs(secs),
            Err(e) => warn!("igd.http.timeout_secs: {}", e),
        }
        match config.get_description_prefix() {
            Ok(prefix) => options.description_prefix = prefix,
            Err(e) => warn!("igd.mapping.description_prefix: {}", e),
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_embedded_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        let options = IgdOptions::from_config(&config);

        assert_eq!(options.ssdp_timeout, Duration::from_secs(4));
        assert_eq!(options.http_timeout, Duration::from_secs(10));
        assert_eq!(options.description_prefix, "pmoigd");
        assert_eq!(options.ssdp_destination, None);
    }

    #[test]
    fn options_from_overrides() {
        let config = Config::from_yaml_str(
            "igd:\n  ssdp:\n    timeout_secs: 2\n  mapping:\n    description_prefix: seedbox\n",
        )
        .unwrap();
        let options = IgdOptions::from_config(&config);

        assert_eq!(options.ssdp_timeout, Duration::from_secs(2));
        assert_eq!(options.http_timeout, Duration::from_secs(10));
        assert_eq!(options.description_prefix, "seedbox");
    }
}

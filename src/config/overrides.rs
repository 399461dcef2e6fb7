//! Command-line overrides layered on top of the configuration file.
//!
//! Overrides are kept for the lifetime of the process and re-applied on
//! every reload, so a value given on the command line always beats the file.

use std::path::PathBuf;

use crate::config::schema::GatewayConfig;

/// Values that replace their configuration file counterparts when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `server.bind_address`.
    pub bind_address: Option<String>,

    /// Replaces `server.document_root`.
    pub document_root: Option<PathBuf>,

    /// Replaces `redirect.map`.
    pub redirect_map: Option<String>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.bind_address.is_none() && self.document_root.is_none() && self.redirect_map.is_none()
    }

    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(bind_address) = &self.bind_address {
            config.server.bind_address = bind_address.clone();
        }
        if let Some(document_root) = &self.document_root {
            config.server.document_root = document_root.clone();
        }
        if let Some(redirect_map) = &self.redirect_map {
            config.redirect.map = Some(redirect_map.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_fields_keep_file_values() {
        let mut config = GatewayConfig::default();
        config.redirect.map = Some("/srv/=/files/".into());

        let overrides = ConfigOverrides {
            bind_address: Some("0.0.0.0:9000".into()),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.document_root, PathBuf::from("."));
        assert_eq!(config.redirect.map.as_deref(), Some("/srv/=/files/"));
    }

    #[test]
    fn test_redirect_map_override_replaces_file_map() {
        let mut config = GatewayConfig::default();
        config.redirect.map = Some("/srv/=/files/".into());

        let overrides = ConfigOverrides {
            redirect_map: Some("/var/www/=/protected/".into()),
            ..Default::default()
        };
        assert!(!overrides.is_empty());
        overrides.apply(&mut config);

        assert_eq!(config.redirect.map.as_deref(), Some("/var/www/=/protected/"));
    }

    #[test]
    fn test_default_overrides_change_nothing() {
        let overrides = ConfigOverrides::default();
        assert!(overrides.is_empty());

        let mut config = GatewayConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.server.bind_address, GatewayConfig::default().server.bind_address);
        assert_eq!(config.redirect.map, None);
    }
}

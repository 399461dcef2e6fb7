//! Configuration file watcher for hot reload.
//!
//! Each reload reads the file again and layers the command-line overrides
//! over it before validation, so overridden values survive file edits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_with_overrides, ConfigError};
use crate::config::overrides::ConfigOverrides;
use crate::config::schema::GatewayConfig;

/// The file being watched and the overrides every reload must keep.
#[derive(Debug, Clone)]
struct ReloadSource {
    path: PathBuf,
    overrides: ConfigOverrides,
}

impl ReloadSource {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        load_with_overrides(Some(&self.path), &self.overrides)
    }

    fn handle(&self, event: notify::Result<Event>, tx: &mpsc::UnboundedSender<GatewayConfig>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = ?e, "Config watch error");
                return;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return;
        }

        tracing::info!(path = %self.path.display(), "Config file change detected, reloading");
        match self.load() {
            Ok(new_config) => {
                tracing::debug!(
                    redirect_map = ?new_config.redirect.map,
                    overridden = !self.overrides.is_empty(),
                    "Config reloaded"
                );
                let _ = tx.send(new_config);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}

/// Monitors the configuration file and emits validated reloads.
pub struct ConfigWatcher {
    source: ReloadSource,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let source = ReloadSource {
            path: path.to_path_buf(),
            overrides: ConfigOverrides::default(),
        };
        (Self { source, update_tx }, update_rx)
    }

    /// Re-apply `overrides` on top of every reloaded file.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.source.overrides = overrides;
        self
    }

    /// Load the configuration the way a file change would.
    pub fn reload(&self) -> Result<GatewayConfig, ConfigError> {
        self.source.load()
    }

    /// Start watching. Keep the returned watcher alive for as long as
    /// reloads should be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { source, update_tx } = self;
        let path = source.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| source.handle(res, &update_tx),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

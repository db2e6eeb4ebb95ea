//! Session store for the current projection inputs
//!
//! Holds the last configuration that loaded successfully. A failed import
//! leaves it untouched so the next run still has usable inputs.

use super::loader::{load_config, parse_config};
use super::ProjectionInputs;
use crate::error::ConfigError;
use log::{info, warn};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    current: ProjectionInputs,
}

impl ConfigStore {
    pub fn new(initial: ProjectionInputs) -> Self {
        Self { current: initial }
    }

    /// The last-known-good inputs
    pub fn current(&self) -> &ProjectionInputs {
        &self.current
    }

    /// Import a configuration from text, keeping the current inputs on failure
    pub fn import_str(&mut self, text: &str) -> Result<&ProjectionInputs, ConfigError> {
        let loaded = parse_config(text);
        self.accept(loaded, "text")
    }

    /// Import a configuration file, keeping the current inputs on failure
    pub fn import_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&ProjectionInputs, ConfigError> {
        let path = path.as_ref();
        let loaded = load_config(path);
        self.accept(loaded, &path.display().to_string())
    }

    fn accept(
        &mut self,
        loaded: Result<ProjectionInputs, ConfigError>,
        source: &str,
    ) -> Result<&ProjectionInputs, ConfigError> {
        match loaded {
            Ok(inputs) => {
                info!(
                    "Loaded configuration from {}: {} projects, {} action plans",
                    source,
                    inputs.projects.len(),
                    inputs.action_plans.len()
                );
                self.current = inputs;
                Ok(&self.current)
            }
            Err(e) => {
                warn!("Could not load configuration from {} ({}); keeping previous inputs", source, e);
                Err(e)
            }
        }
    }
}

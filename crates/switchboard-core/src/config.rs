// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Manager configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime knobs of a [`Manager`](crate::Manager).
///
/// Missing fields take their default value when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Maximum nesting of dispatches triggered by emissions.
    /// Exceeding it is fatal: the manager logs an error and panics.
    pub max_emission_depth: usize,
    /// Computes the plan of every message type named in a capability table
    /// while composing, instead of on first dispatch.
    pub precompute_plans: bool,
    /// Logs every dispatch step at trace level.
    pub trace_dispatch: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_emission_depth: 64,
            precompute_plans: true,
            trace_dispatch: false,
        }
    }
}

impl ManagerConfig {
    /// Sets [`max_emission_depth`](Self::max_emission_depth).
    #[must_use]
    pub fn with_max_emission_depth(mut self, depth: usize) -> Self {
        self.max_emission_depth = depth;
        self
    }

    /// Sets [`precompute_plans`](Self::precompute_plans).
    #[must_use]
    pub fn with_precompute_plans(mut self, enabled: bool) -> Self {
        self.precompute_plans = enabled;
        self
    }

    /// Sets [`trace_dispatch`](Self::trace_dispatch).
    #[must_use]
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_emission_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_emission_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, picking the format from its extension
    /// (`json` or `ron`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);

        let config = match extension.as_deref() {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            Some("ron") => Self::from_ron_str(&std::fs::read_to_string(path)?)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        log::debug!("Loaded manager configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = ManagerConfig::from_json_str(r#"{ "trace_dispatch": true }"#).unwrap();
        assert_eq!(
            config,
            ManagerConfig::default().with_trace_dispatch(true)
        );
    }

    #[test]
    fn test_ron_document() {
        let config =
            ManagerConfig::from_ron_str("(max_emission_depth: 8, precompute_plans: false)")
                .unwrap();
        assert_eq!(config.max_emission_depth, 8);
        assert!(!config.precompute_plans);
        assert!(!config.trace_dispatch);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = ManagerConfig::from_json_str(r#"{ "max_emission_depth": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = ManagerConfig::from_json_str("{ max_emission_depth: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{ "max_emission_depth": 3 }}"#).unwrap();
        assert_eq!(
            ManagerConfig::from_file(json.path()).unwrap().max_emission_depth,
            3
        );

        let mut ron = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(ron, "(trace_dispatch: true)").unwrap();
        assert!(ManagerConfig::from_file(ron.path()).unwrap().trace_dispatch);

        let toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            ManagerConfig::from_file(toml.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManagerConfig::from_file(dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

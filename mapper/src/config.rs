//! Mapper configuration.
//!
//! ```toml
//! strict = false
//! max_depth = 32
//! max_nodes = 10000
//!
//! [prefixes]
//! ex = "http://example.org/"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::ConfigError;

/// Default bound on entity nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default bound on the entities one decode call may build.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Options for encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Reject unmapped predicates and unresolved references while decoding.
    /// Lenient decoding drops them instead.
    pub strict: bool,
    /// Maximum nesting depth of entities.
    pub max_depth: usize,
    /// Maximum number of entities built by one decode call. A subject
    /// referenced from several places is built once per reference.
    pub max_nodes: usize,
    /// Extra prefixes merged over the StreamPipes defaults.
    pub prefixes: BTreeMap<String, String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            prefixes: BTreeMap::new(),
        }
    }
}

impl MapperConfig {
    /// Lenient defaults with strict decoding switched on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded mapper config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the string cannot be parsed or validated.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MapperConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if `max_depth` or `max_nodes` is zero, or a
    /// prefix is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be > 0".to_string()));
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::Invalid("max_nodes must be > 0".to_string()));
        }
        if let Some((prefix, _)) = self
            .prefixes
            .iter()
            .find(|(p, ns)| p.is_empty() || ns.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "prefix `{prefix}` must have a non-empty name and namespace"
            )));
        }
        Ok(())
    }

    /// The StreamPipes context extended with the configured prefixes.
    #[must_use]
    pub fn context(&self) -> Context {
        let mut ctx = Context::streampipes();
        for (prefix, ns) in &self.prefixes {
            ctx.insert(prefix.clone(), ns.clone());
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = MapperConfig::from_toml_str("").unwrap();
        assert_eq!(config, MapperConfig::default());
        assert!(!config.strict);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_nodes, DEFAULT_MAX_NODES);
    }

    #[test]
    fn parses_all_fields() {
        let config = MapperConfig::from_toml_str(
            r#"
            strict = true
            max_depth = 4
            max_nodes = 500

            [prefixes]
            ex = "http://example.org/"
            "#,
        )
        .unwrap();
        assert!(config.strict);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_nodes, 500);
        assert_eq!(config.context().expand("ex:a"), "http://example.org/a");
        assert_eq!(
            config.context().expand("sp:mapsTo"),
            "https://streampipes.org/vocabulary/v1/mapsTo"
        );
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = MapperConfig::from_toml_str("max_depth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_node_budget_is_rejected() {
        let err = MapperConfig::from_toml_str("max_nodes = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("max_nodes")));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = MapperConfig::from_toml_str("strict = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

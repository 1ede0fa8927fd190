//! Configuration loading
//!
//! Reads a [`ContextConfig`] from TOML or JSON and turns it into a
//! [`StaticContext`].

use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::ContextConfig;
use crate::node::Node;
use crate::static_context::{StaticContext, UrlPolicy};
use crate::units::Numeric;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// JSON parsing error
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Load configuration from a file.
///
/// Files ending in `.json` are read as JSON, anything else as TOML.
///
/// # Example
/// ```ignore
/// let config = load_config(Path::new("env.toml"))?;
/// let ctx = StaticContext::from_config(&config)?;
/// ```
pub fn load_config(path: &Path) -> Result<ContextConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_str(&contents)
    } else {
        from_toml_str(&contents)
    }
}

/// Parse and validate a TOML configuration.
pub fn from_toml_str(contents: &str) -> Result<ContextConfig, ConfigError> {
    let config: ContextConfig = toml::from_str(contents)?;
    ensure_valid(&config)?;
    Ok(config)
}

/// Parse and validate a JSON configuration.
pub fn from_json_str(contents: &str) -> Result<ContextConfig, ConfigError> {
    let config: ContextConfig = serde_json::from_str(contents)?;
    ensure_valid(&config)?;
    Ok(config)
}

fn ensure_valid(config: &ContextConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    Err(ConfigError::Validation(errors.iter().map(ToString::to_string).collect()))
}

/// Node for a configured variable value.
///
/// Single numeric tokens (`8px`, `50%`, `0.3s`) become numeric nodes so
/// they can take part in `calc()`; anything else is kept as literal text.
pub fn parse_var_value(text: &str) -> Node {
    match text.parse::<Numeric>() {
        Ok(n) => Node::Numeric(n),
        Err(_) => Node::passthrough(text.trim()),
    }
}

impl StaticContext {
    /// Build a context from a validated configuration.
    pub fn from_config(config: &ContextConfig) -> Result<Self, ConfigError> {
        ensure_valid(config)?;

        let base = match &config.urls.base {
            // validate() already checked the base parses
            Some(base) => url::Url::parse(base).ok(),
            None => None,
        };

        let mut ctx = StaticContext::new()
            .with_viewport(config.viewport)
            .with_element_size(config.element)
            .with_font_size(config.fonts.size)
            .with_root_font_size(config.fonts.root)
            .with_index(config.index)
            .with_url_policy(UrlPolicy {
                base,
                allow_insecure: config.urls.allow_insecure,
            });

        for (name, value) in &config.vars {
            ctx.set_var(name, parse_var_value(value));
        }
        Ok(ctx)
    }
}

//! Configuration schema for evaluation environments
//!
//! A [`ContextConfig`] describes a fixed environment snapshot:
//!
//! ```toml
//! index = 2
//!
//! [viewport]
//! width = 1280
//! height = 720
//!
//! [element]
//! width = 200
//! height = 100
//!
//! [fonts]
//! size = 14
//! root = 16
//!
//! [urls]
//! base = "https://cdn.example.com/"
//! allow_insecure = false
//!
//! [vars]
//! "--gap" = "8px"
//! "--easing" = "ease-in-out"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::context::Size;
use crate::static_context::DEFAULT_FONT_SIZE;

/// Font sizes in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font size of the current element
    #[serde(default = "default_font_size")]
    pub size: f64,
    /// Font size of the root element
    #[serde(default = "default_font_size")]
    pub root: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size: default_font_size(),
            root: default_font_size(),
        }
    }
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// URL policy section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Base for relative `url()` values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Accept non-https results
    #[serde(default)]
    pub allow_insecure: bool,
}

/// Complete environment description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub viewport: Size,
    #[serde(default)]
    pub element: Size,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub urls: UrlConfig,
    /// Target index reported by `index()`
    #[serde(default)]
    pub index: usize,
    /// Custom properties, as CSS text
    #[serde(default)]
    pub vars: HashMap<String, String>,
}

/// A validation error in the config
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "viewport.width")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

impl ContextConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut check = |field: &str, ok: bool, message: &str| {
            if !ok {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: message.to_string(),
                });
            }
        };

        for (section, size) in [("viewport", self.viewport), ("element", self.element)] {
            check(
                &format!("{}.width", section),
                size.width.is_finite() && size.width >= 0.0,
                "must be a non-negative number",
            );
            check(
                &format!("{}.height", section),
                size.height.is_finite() && size.height >= 0.0,
                "must be a non-negative number",
            );
        }

        check(
            "fonts.size",
            self.fonts.size.is_finite() && self.fonts.size > 0.0,
            "must be a positive number",
        );
        check(
            "fonts.root",
            self.fonts.root.is_finite() && self.fonts.root > 0.0,
            "must be a positive number",
        );

        if let Some(base) = &self.urls.base {
            check(
                "urls.base",
                Url::parse(base).is_ok(),
                "must be an absolute URL",
            );
        }

        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        for name in names {
            check(
                &format!("vars.{}", name),
                !name.trim().is_empty(),
                "must have a name",
            );
        }

        errors
    }
}

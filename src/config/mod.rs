//! Configuration for evaluation environments
//!
//! Provides the schema and loaders for environment snapshots used to build
//! a [`StaticContext`](crate::StaticContext).

pub mod loader;
pub mod schema;

pub use loader::{from_json_str, from_toml_str, load_config, parse_var_value, ConfigError};
pub use schema::*;

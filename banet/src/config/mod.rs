//! Configuration module for BANet.
//!
//! This module provides the dynamic configuration layer:
//! - `value`: Dynamically typed configuration values
//! - `dict`: The nested configuration dictionary
//! - `loader`: Loading TOML/JSON files into a dictionary

pub mod dict;
pub mod loader;
pub mod value;

pub use dict::ConfigDict;
pub use loader::{load_config, load_config_dict, ConfigFormat, ConfigLoader, INCLUDE_KEY};
pub use value::ConfigValue;

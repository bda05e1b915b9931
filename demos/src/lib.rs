//! BANet Demos
//!
//! Command line tools built on `banet-burn`.
//!
//! ## Available Tools
//!
//! - `inspect_config`: Load a TOML/JSON config and print it, or one value of it
//! - `evaluate_loss`: Build a loss from a config and evaluate it on random data
//!
//! ## Usage
//!
//! ```bash
//! # Print a whole config, resolving includes against a shared directory
//! cargo run --bin inspect_config -- configs/train.toml --search-path configs/base
//!
//! # Print one value
//! cargo run --bin inspect_config -- configs/train.toml --key loss.type
//!
//! # Evaluate the configured loss with the WGPU backend
//! cargo run --bin evaluate_loss --features wgpu --no-default-features -- configs/train.toml
//! ```

pub mod backend;

pub use backend::{create_device, get_backend_name, SelectedBackend};

/// Initialise `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();
}

pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::config::{toml_config::TomlConfig, CliConfig};
pub use crate::core::lookup::LookupProxy;
pub use crate::domain::model::{Envelope, LookupOutcome, NormalizedRecord, Query};
pub use crate::domain::ports::{ConfigProvider, NumberLookup};
pub use crate::server::{create_router, ProxyServer};
pub use crate::utils::error::{ProxyError, Result};

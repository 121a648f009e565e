pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{run_config::RunConfig, toml_config::TomlConfig};
pub use crate::core::{
    dispatcher::{DispatchReport, Dispatcher},
    engine::LabelEngine,
    source::SpreadsheetSource,
    template::Template,
    transport::{DryRunTransport, TcpTransport},
};
pub use utils::error::{LabelError, Result};

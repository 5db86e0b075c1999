pub mod actions;
pub mod commands;
pub mod config;
pub mod error;

pub use commands::{Cli, CliCommands, kvcli_main};

pub mod reexport {
    pub use keyvault_client;
    pub use keyvault_client_utils;
}

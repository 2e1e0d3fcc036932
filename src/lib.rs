pub mod config;
pub mod logging;
pub mod parser;
pub mod provider;
pub mod version;

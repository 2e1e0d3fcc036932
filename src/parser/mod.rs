//! Parser layer
//! - plugin_header.rs: plugin main file header parser

pub mod plugin_header;

pub use plugin_header::{PluginHeader, PluginHeaderParser};

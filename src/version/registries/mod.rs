//! Registry implementations for fetching plugin metadata

pub mod update_server;

pub use update_server::UpdateServerRegistry;

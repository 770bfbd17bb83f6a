//! Port traits for external capabilities.

pub mod oracle_port;
pub mod data_port;
pub mod config_port;
pub mod report_port;

//! Concrete port implementations.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod drift_oracle;
pub mod replay_oracle;
pub mod csv_report_adapter;

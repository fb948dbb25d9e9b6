pub mod audit_log;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod provider;
pub mod proxy;
pub mod telemetry;

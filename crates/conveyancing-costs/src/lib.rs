pub mod api;
pub mod calculator;
pub mod config;
pub mod delivery;
pub mod documents;
pub mod error;
pub mod settings;
pub mod snapshot;
pub mod tables;
pub mod telemetry;

pub mod api;
pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod files;
pub mod persons;
pub mod records;
pub mod telemetry;
pub mod utils;

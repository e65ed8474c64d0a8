pub mod cli;
pub mod config;
pub mod data;
pub mod plot;
pub mod selection;
pub mod server;

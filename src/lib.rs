// Main library entry point for the graph-database debug panel.

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod ports;

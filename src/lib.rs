//! Agent Hub: lifecycle and coordination for IDE agent workers.

pub mod agent;
pub mod api;
pub mod config;
pub mod console;
pub mod error;

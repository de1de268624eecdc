//! CLI commands.

pub mod chat;
pub mod launch;
pub mod models;
pub mod persona;
pub mod status;

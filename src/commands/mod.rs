//! Command implementations

pub mod action;
pub mod cleanup;
pub mod setup;
pub mod status;
pub mod version;

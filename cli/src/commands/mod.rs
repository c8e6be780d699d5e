//! Command implementations

pub mod configcheck;
pub mod flare;
pub mod version;

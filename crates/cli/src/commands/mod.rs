//! CLI Commands

pub mod dashboard;
pub mod driver;
pub mod env;

//! Campsuite CLI
//!
//! Command-line tools around the BDD suite: environment switching,
//! driver provisioning and the HTML results dashboard.

pub mod commands;
pub mod dashboard;
pub mod output;

//! HTML dashboard built from the BDD suite's JSON and JUnit reports

pub mod render;
pub mod results;

pub use render::{chart_config, render_html, write_dashboard};
pub use results::{load_results, DashboardData, FeatureSummary};

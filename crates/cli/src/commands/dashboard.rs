//! Dashboard Command
//!
//! Turns the suite's Cucumber JSON and JUnit reports into `index.html`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::dashboard::{load_results, render_html, write_dashboard, FeatureSummary};
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct DashboardArgs {
    /// Directory holding the reports; the dashboard is written here too
    #[arg(long, env = "REPORTS_DIR", default_value = "reports")]
    pub reports_dir: PathBuf,

    /// Cucumber JSON report file name, relative to the reports directory
    #[arg(long, default_value = "cucumber.json")]
    pub json: String,

    /// JUnit XML directory; defaults to `<reports-dir>/junit`
    #[arg(long)]
    pub junit_dir: Option<PathBuf>,
}

#[derive(Serialize, Clone)]
struct FeatureRow {
    feature: String,
    scenarios: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    duration: String,
}

impl From<&FeatureSummary> for FeatureRow {
    fn from(f: &FeatureSummary) -> Self {
        Self {
            feature: f.name.clone(),
            scenarios: f.scenarios,
            passed: f.passed_scenarios,
            failed: f.failed_scenarios,
            skipped: f.skipped_scenarios,
            duration: format!("{:.2}s", f.duration),
        }
    }
}

impl TableDisplay for FeatureRow {
    fn headers() -> Vec<&'static str> {
        vec!["Feature", "Scenarios", "Passed", "Failed", "Skipped", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.feature.clone(),
            self.scenarios.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.skipped.to_string(),
            self.duration.clone(),
        ]
    }
}

pub async fn execute(args: DashboardArgs, format: OutputFormat) -> Result<()> {
    let junit_dir = args
        .junit_dir
        .unwrap_or_else(|| args.reports_dir.join("junit"));

    let data = load_results(&args.reports_dir, &args.json, &junit_dir);
    let path = write_dashboard(&args.reports_dir, &render_html(&data))?;

    println!("Dashboard generated at {}", path.display().to_string().bold());

    let rows: Vec<FeatureRow> = data.features.iter().map(FeatureRow::from).collect();
    print_list(&rows, format);

    let failed = if data.failed_scenarios > 0 {
        data.failed_scenarios.to_string().red().bold()
    } else {
        data.failed_scenarios.to_string().green()
    };
    println!(
        "{} scenarios: {} passed, {} failed, {} skipped in {:.2}s",
        data.total_scenarios,
        data.passed_scenarios.to_string().green(),
        failed,
        data.skipped_scenarios.to_string().dimmed(),
        data.duration,
    );

    Ok(())
}

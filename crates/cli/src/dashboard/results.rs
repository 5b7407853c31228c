//! Test result loading: Cucumber JSON plus JUnit XML timings

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Aggregated results for one feature file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    pub description: String,
    pub scenarios: usize,
    pub passed_scenarios: usize,
    pub failed_scenarios: usize,
    pub skipped_scenarios: usize,
    pub total_steps: usize,
    pub passed_steps: usize,
    pub failed_steps: usize,
    /// Seconds, from step durations
    pub duration: f64,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub timestamp: String,
    pub features: Vec<FeatureSummary>,
    pub total_scenarios: usize,
    pub passed_scenarios: usize,
    pub failed_scenarios: usize,
    pub skipped_scenarios: usize,
    pub total_steps: usize,
    pub passed_steps: usize,
    pub failed_steps: usize,
    /// Seconds; JUnit suite times when available
    pub duration: f64,
}

impl DashboardData {
    /// Percentage of scenarios that passed, 0 when nothing ran
    pub fn pass_rate(&self) -> f64 {
        if self.total_scenarios == 0 {
            0.0
        } else {
            self.passed_scenarios as f64 * 100.0 / self.total_scenarios as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Deserialize)]
struct JsonFeature {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default)]
    elements: Vec<JsonElement>,
}

/// Cucumber writes a string, behave a list of lines
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Text(String),
    Lines(Vec<String>),
}

impl Description {
    fn into_text(self) -> String {
        match self {
            Description::Text(text) => text.trim().to_string(),
            Description::Lines(lines) => lines.join(" ").trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonElement {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    steps: Vec<JsonStep>,
}

#[derive(Debug, Deserialize)]
struct JsonStep {
    #[serde(default)]
    result: Option<JsonStepResult>,
}

#[derive(Debug, Deserialize)]
struct JsonStepResult {
    #[serde(default)]
    status: Option<String>,
    /// Nanoseconds
    #[serde(default)]
    duration: Option<f64>,
}

impl JsonStep {
    fn status(&self) -> &str {
        self.result
            .as_ref()
            .and_then(|r| r.status.as_deref())
            .unwrap_or("skipped")
    }

    fn duration_nanos(&self) -> f64 {
        self.result.as_ref().and_then(|r| r.duration).unwrap_or(0.0)
    }
}

impl JsonElement {
    fn is_background(&self) -> bool {
        self.kind.eq_ignore_ascii_case("background") || self.keyword.eq_ignore_ascii_case("background")
    }

    fn is_scenario(&self) -> bool {
        let kind = self.kind.to_lowercase();
        (kind == "scenario" || kind == "scenario_outline") && !self.is_background()
    }

    fn scenario_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Steps of one executed scenario, background steps first
struct ScenarioRun<'a> {
    steps: Vec<&'a JsonStep>,
}

impl ScenarioRun<'_> {
    fn status(&self) -> ScenarioStatus {
        scenario_status(self.steps.iter().map(|s| s.status()))
    }
}

/// Pair cucumber-rs background elements with the scenario that follows them.
///
/// cucumber-rs writes a scenario's background as a separate element carrying
/// the scenario's `id`; when a background step fails the scenario element is
/// never written, so the background stands in for it. Backgrounds without an
/// id (behave) repeat their steps inside each scenario and are skipped.
fn scenario_runs(elements: &[JsonElement]) -> Vec<ScenarioRun<'_>> {
    let mut runs = Vec::new();
    let mut pending: Option<&JsonElement> = None;

    for element in elements {
        if element.is_background() {
            if element.scenario_id().is_none() {
                continue;
            }
            if let Some(orphan) = pending.replace(element) {
                runs.push(ScenarioRun { steps: orphan.steps.iter().collect() });
            }
            continue;
        }
        if !element.is_scenario() {
            continue;
        }

        let mut steps = Vec::new();
        if let Some(background) = pending.take() {
            if background.scenario_id() == element.scenario_id() {
                steps.extend(background.steps.iter());
            } else {
                runs.push(ScenarioRun { steps: background.steps.iter().collect() });
            }
        }
        steps.extend(element.steps.iter());
        runs.push(ScenarioRun { steps });
    }

    if let Some(orphan) = pending {
        runs.push(ScenarioRun { steps: orphan.steps.iter().collect() });
    }
    runs
}

/// Failed if any step failed, passed if every step passed, otherwise skipped
pub fn scenario_status<'a>(statuses: impl IntoIterator<Item = &'a str>) -> ScenarioStatus {
    let mut all_passed = true;
    let mut any = false;
    for status in statuses {
        any = true;
        match status {
            "failed" => return ScenarioStatus::Failed,
            "passed" => {}
            _ => all_passed = false,
        }
    }
    if any && all_passed {
        ScenarioStatus::Passed
    } else {
        ScenarioStatus::Skipped
    }
}

fn summarize_feature(feature: JsonFeature) -> FeatureSummary {
    let mut summary = FeatureSummary {
        name: feature.name,
        description: feature.description.map(Description::into_text).unwrap_or_default(),
        ..Default::default()
    };

    for run in scenario_runs(&feature.elements) {
        summary.scenarios += 1;
        match run.status() {
            ScenarioStatus::Passed => summary.passed_scenarios += 1,
            ScenarioStatus::Failed => summary.failed_scenarios += 1,
            ScenarioStatus::Skipped => summary.skipped_scenarios += 1,
        }

        for step in &run.steps {
            summary.total_steps += 1;
            match step.status() {
                "passed" => summary.passed_steps += 1,
                "failed" => summary.failed_steps += 1,
                _ => {}
            }
            summary.duration += step.duration_nanos() / 1e9;
        }
    }
    summary
}

/// Summaries for every feature in a Cucumber JSON report
pub fn parse_cucumber_json(content: &str) -> Result<Vec<FeatureSummary>> {
    let features: Vec<JsonFeature> =
        serde_json::from_str(content).context("Invalid Cucumber JSON report")?;
    Ok(features.into_iter().map(summarize_feature).collect())
}

fn testsuite_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<testsuite\b[^>]*?\btime="([0-9]+(?:\.[0-9]+)?)""#)
            .unwrap_or_else(|e| panic!("testsuite regex: {}", e))
    })
}

/// Sum of the `time` attributes of `<testsuite>` elements in one document
pub fn junit_suite_time(xml: &str) -> f64 {
    testsuite_time_re()
        .captures_iter(xml)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .sum()
}

/// Total suite time across every `*.xml` under `dir`; `None` if no suite carried a time
pub fn junit_duration(dir: &Path) -> Option<f64> {
    if !dir.is_dir() {
        debug!("No JUnit directory at {}", dir.display());
        return None;
    }

    let mut found = false;
    let mut total = 0.0;

    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(xml) => {
                if testsuite_time_re().is_match(&xml) {
                    found = true;
                    total += junit_suite_time(&xml);
                } else {
                    warn!("No testsuite timing in {}", path.display());
                }
            }
            Err(e) => error!("Error processing JUnit XML {}: {}", path.display(), e),
        }
    }

    found.then_some(total)
}

/// Load the JSON report and JUnit timings; unreadable parts are logged and left empty
pub fn load_results(reports_dir: &Path, json_name: &str, junit_dir: &Path) -> DashboardData {
    let mut data = DashboardData {
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ..Default::default()
    };

    let json_path = reports_dir.join(json_name);
    if json_path.is_file() {
        let parsed = std::fs::read_to_string(&json_path)
            .with_context(|| format!("Failed to read {}", json_path.display()))
            .and_then(|content| parse_cucumber_json(&content));
        match parsed {
            Ok(features) => data.features = features,
            Err(e) => error!("Error processing JSON results: {:#}", e),
        }
    } else {
        warn!("No JSON report at {}", json_path.display());
    }

    for feature in &data.features {
        data.total_scenarios += feature.scenarios;
        data.passed_scenarios += feature.passed_scenarios;
        data.failed_scenarios += feature.failed_scenarios;
        data.skipped_scenarios += feature.skipped_scenarios;
        data.total_steps += feature.total_steps;
        data.passed_steps += feature.passed_steps;
        data.failed_steps += feature.failed_steps;
    }

    data.duration = junit_duration(junit_dir)
        .unwrap_or_else(|| data.features.iter().map(|f| f.duration).sum());
    data
}

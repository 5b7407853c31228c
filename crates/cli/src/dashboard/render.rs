//! Static HTML dashboard rendering

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use super::results::DashboardData;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Chart.js setup: a status doughnut and a per-feature stacked bar
pub fn chart_config(data: &DashboardData) -> String {
    let labels: Vec<&str> = data.features.iter().map(|f| f.name.as_str()).collect();
    let passed: Vec<usize> = data.features.iter().map(|f| f.passed_scenarios).collect();
    let failed: Vec<usize> = data.features.iter().map(|f| f.failed_scenarios).collect();

    // JSON arrays are valid JS literals; `</` is split so names cannot close the script tag.
    let json = |value: serde_json::Value| value.to_string().replace("</", "<\\/");

    format!(
        r#"new Chart(document.getElementById('statusChart'), {{
  type: 'doughnut',
  data: {{
    labels: ['Passed', 'Failed', 'Skipped'],
    datasets: [{{
      data: [{passed_total}, {failed_total}, {skipped_total}],
      backgroundColor: ['#10b981', '#ef4444', '#9ca3af']
    }}]
  }},
  options: {{ plugins: {{ legend: {{ position: 'bottom' }} }} }}
}});
new Chart(document.getElementById('featureChart'), {{
  type: 'bar',
  data: {{
    labels: {labels},
    datasets: [
      {{ label: 'Passed', data: {passed}, backgroundColor: '#10b981' }},
      {{ label: 'Failed', data: {failed}, backgroundColor: '#ef4444' }}
    ]
  }},
  options: {{
    responsive: true,
    scales: {{ x: {{ stacked: true }}, y: {{ stacked: true, beginAtZero: true, ticks: {{ precision: 0 }} }} }}
  }}
}});"#,
        passed_total = data.passed_scenarios,
        failed_total = data.failed_scenarios,
        skipped_total = data.skipped_scenarios,
        labels = json(serde_json::json!(labels)),
        passed = json(serde_json::json!(passed)),
        failed = json(serde_json::json!(failed)),
    )
}

fn feature_rows(data: &DashboardData) -> String {
    let mut rows = String::new();
    for feature in &data.features {
        let status = if feature.failed_scenarios > 0 {
            "failed"
        } else if feature.scenarios > 0 && feature.passed_scenarios == feature.scenarios {
            "passed"
        } else {
            "skipped"
        };

        let _ = write!(
            rows,
            r#"
        <tr class="{status}">
          <td><b>{name}</b><div class="hint">{description}</div></td>
          <td>{scenarios}</td>
          <td>{passed}</td>
          <td>{failed}</td>
          <td>{skipped}</td>
          <td>{passed_steps}/{total_steps}</td>
          <td>{duration:.2}s</td>
        </tr>"#,
            name = html_escape(&feature.name),
            description = html_escape(&feature.description),
            scenarios = feature.scenarios,
            passed = feature.passed_scenarios,
            failed = feature.failed_scenarios,
            skipped = feature.skipped_scenarios,
            passed_steps = feature.passed_steps,
            total_steps = feature.total_steps,
            duration = feature.duration,
        );
    }

    if rows.is_empty() {
        rows.push_str(r#"
        <tr><td colspan="7" class="hint">No test results found.</td></tr>"#);
    }
    rows
}

/// Self-contained dashboard page
pub fn render_html(data: &DashboardData) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Test Execution Dashboard</title>
    <script src="{chart_js}"></script>
    <style>
      body {{ font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; padding: 18px; max-width: 1100px; margin: 0 auto; background: #f9fafb; color: #111827; }}
      .cards {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }}
      .card {{ background: #fff; border: 1px solid #e5e7eb; border-radius: 10px; padding: 14px 16px; margin: 12px 0; }}
      .card .value {{ font-size: 1.8em; font-weight: 600; }}
      .passed .value, tr.passed td:first-child {{ color: #059669; }}
      .failed .value, tr.failed td:first-child {{ color: #dc2626; }}
      .skipped .value, tr.skipped td:first-child {{ color: #6b7280; }}
      .charts {{ display: grid; grid-template-columns: 1fr 2fr; gap: 12px; }}
      table {{ width: 100%; border-collapse: collapse; background: #fff; }}
      th, td {{ text-align: left; padding: 8px 10px; border-bottom: 1px solid #e5e7eb; }}
      .hint {{ color: #6b7280; font-size: 0.9em; }}
    </style>
  </head>
  <body>
    <h1>Test Execution Dashboard</h1>
    <p class="hint">Generated {timestamp}</p>

    <div class="cards">
      <div class="card"><div class="hint">Scenarios</div><div class="value">{total}</div></div>
      <div class="card passed"><div class="hint">Passed</div><div class="value">{passed}</div></div>
      <div class="card failed"><div class="hint">Failed</div><div class="value">{failed}</div></div>
      <div class="card skipped"><div class="hint">Skipped</div><div class="value">{skipped}</div></div>
      <div class="card"><div class="hint">Pass rate</div><div class="value">{pass_rate:.1}%</div></div>
      <div class="card"><div class="hint">Steps passed</div><div class="value">{passed_steps}/{total_steps}</div></div>
      <div class="card"><div class="hint">Duration</div><div class="value">{duration:.2}s</div></div>
    </div>

    <div class="charts">
      <div class="card"><h3>Scenario status</h3><canvas id="statusChart"></canvas></div>
      <div class="card"><h3>Scenarios per feature</h3><canvas id="featureChart"></canvas></div>
    </div>

    <div class="card">
      <h3>Features</h3>
      <table>
        <thead>
          <tr><th>Feature</th><th>Scenarios</th><th>Passed</th><th>Failed</th><th>Skipped</th><th>Steps</th><th>Duration</th></tr>
        </thead>
        <tbody>{rows}
        </tbody>
      </table>
    </div>

    <script>
{charts}
    </script>
  </body>
</html>
"#,
        chart_js = CHART_JS_CDN,
        timestamp = html_escape(&data.timestamp),
        total = data.total_scenarios,
        passed = data.passed_scenarios,
        failed = data.failed_scenarios,
        skipped = data.skipped_scenarios,
        pass_rate = data.pass_rate(),
        passed_steps = data.passed_steps,
        total_steps = data.total_steps,
        duration = data.duration,
        rows = feature_rows(data),
        charts = chart_config(data),
    )
}

/// Write `index.html` into `dir`, creating it if needed
pub fn write_dashboard(dir: &Path, html: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join("index.html");
    std::fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Dashboard written to {}", path.display());
    Ok(path)
}

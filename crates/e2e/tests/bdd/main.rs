//! BDD suite for the automationcamp practice site
//!
//! Runs every `.feature` file under `features/` against a real browser:
//!   cargo test -p campsuite-e2e --features bdd --test bdd
//!
//! Without the `bdd` feature this binary does nothing, so a plain
//! `cargo test` never needs a browser.

#[cfg(not(feature = "bdd"))]
fn main() {}

#[cfg(feature = "bdd")]
mod steps;
#[cfg(feature = "bdd")]
mod world;

#[cfg(feature = "bdd")]
#[tokio::main]
async fn main() {
    use campsuite_e2e::{DriverEndpoint, ScreenshotStore, SuiteConfig};
    use cucumber::event::ScenarioFinished;
    use cucumber::writer::Stats as _;
    use cucumber::{writer, World as _, WriterExt as _};
    use std::fs::{self, File};
    use std::path::Path;
    use tracing::{error, info};
    use world::{CampWorld, Harness};

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match SuiteConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    info!("Starting tests in {} environment", config.test_env);
    info!("Base URL: {}", config.base_url);

    let mut endpoint = match DriverEndpoint::start(&config).await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!("Failed to start browser driver: {}", e);
            std::process::exit(2);
        }
    };

    let reports_dir = config.reports_dir.clone();
    let junit_dir = reports_dir.join("junit");
    if let Err(e) = fs::create_dir_all(&junit_dir) {
        error!("Failed to create {}: {}", junit_dir.display(), e);
        std::process::exit(2);
    }
    let (json_out, junit_out) = match (
        File::create(reports_dir.join("cucumber.json")),
        File::create(junit_dir.join("cucumber.xml")),
    ) {
        (Ok(json), Ok(junit)) => (json, junit),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to create report files: {}", e);
            std::process::exit(2);
        }
    };

    world::install(Harness {
        screenshots: ScreenshotStore::new(config.screenshot_dir.clone()),
        endpoint_url: endpoint.url().to_string(),
        config,
    });

    let features = Path::new(env!("CARGO_MANIFEST_DIR")).join("features");

    let summary = CampWorld::cucumber()
        .max_concurrent_scenarios(1)
        .before(|_feature, _rule, scenario, world| {
            Box::pin(async move {
                info!("Starting scenario: {}", scenario.name);
                if let Err(e) = world.start_browser().await {
                    error!("Failed to start browser: {}", e);
                    panic!("Failed to start browser: {}", e);
                }
            })
        })
        .after(|_feature, _rule, scenario, event, world| {
            Box::pin(async move {
                let failed = matches!(
                    event,
                    ScenarioFinished::StepFailed(..) | ScenarioFinished::BeforeHookFailed(..)
                );
                if let Some(world) = world {
                    if failed {
                        world.capture_failure(&scenario.name).await;
                    }
                    world.close_browser().await;
                }
                info!("Finished scenario: {}", scenario.name);
            })
        })
        .with_writer(
            writer::Basic::stdout()
                .summarized()
                .tee::<CampWorld, _>(writer::Json::for_tee(json_out))
                .tee::<CampWorld, _>(writer::JUnit::for_tee(junit_out, 0))
                .normalized(),
        )
        .fail_on_skipped()
        .run(features)
        .await;

    endpoint.stop();

    if summary.execution_has_failed() {
        std::process::exit(1);
    }
}

use cucumber::{given, then, when};
use tracing::{error, info};

use crate::world::CampWorld;

#[given("I launch the browser")]
async fn launch_browser(world: &mut CampWorld) {
    assert!(world.has_browser(), "Browser failed to launch");
    info!("Browser launched successfully");
}

#[when("I navigate to the practice automation website")]
async fn navigate_to_site(world: &mut CampWorld) {
    let url = world.config().base_url();
    world
        .base()
        .open(url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open {}: {}", url, e));
    info!("Navigated to URL: {}", url);
}

#[then("I should see the homepage successfully loaded")]
async fn homepage_loaded(world: &mut CampWorld) {
    let home = world.home_page();

    if !home.verify_page_loaded().await {
        if let Ok(url) = home.current_url().await {
            error!("Current URL: {}", url);
        }
        panic!("Homepage failed to load");
    }

    if let Some(title) = home.page_title().await {
        info!("Found page title: {}", title);
    }
}

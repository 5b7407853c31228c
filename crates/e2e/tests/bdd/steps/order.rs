use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use std::time::Duration;
use tracing::info;

use super::login::{click_login, enter_credentials, on_login_page};
use super::table_rows;
use crate::world::CampWorld;

#[given("I am logged in successfully")]
async fn logged_in(world: &mut CampWorld) {
    on_login_page(world).await;
    enter_credentials(world, "admin".to_string(), "admin".to_string()).await;
    click_login(world).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
}

#[when(regex = r#"^I select "([^"]*)" as pizza size$"#)]
async fn select_size(world: &mut CampWorld, size: String) {
    let page = world.sample_page();
    tokio::time::sleep(Duration::from_secs(3)).await;

    if let Err(e) = page.select_pizza_size(&size).await {
        page.take_screenshot("size_selection_error").await;
        panic!("Failed to select {} pizza size: {}", size, e);
    }
    info!("Successfully selected {} pizza size", size);
    tokio::time::sleep(Duration::from_secs(1)).await;
}

#[when(regex = r#"^I select "([^"]*)" as pizza flavor$"#)]
async fn select_flavor(world: &mut CampWorld, flavor: String) {
    world
        .sample_page()
        .select_flavor(&flavor)
        .await
        .unwrap_or_else(|e| panic!("Failed to select flavor {}: {}", flavor, e));
}

#[when(regex = r#"^I select "([^"]*)" as sauce$"#)]
async fn select_sauce(world: &mut CampWorld, sauce: String) {
    let page = world.sample_page();
    if let Err(e) = page.select_sauce(&sauce).await {
        page.take_screenshot("sauce_selection_error").await;
        panic!("Failed to select sauce {}: {}", sauce, e);
    }
}

#[when("I select the following toppings")]
async fn select_toppings(world: &mut CampWorld, step: &Step) {
    let toppings: Vec<String> = table_rows(step)
        .into_iter()
        .filter_map(|mut row| row.remove("topping"))
        .collect();

    let page = world.sample_page();
    if let Err(e) = page.select_toppings(&toppings).await {
        page.take_screenshot("topping_selection_error").await;
        panic!("Failed to select toppings {:?}: {}", toppings, e);
    }
    info!("Successfully selected toppings: {:?}", toppings);
}

#[when(regex = r#"^I enter "([^"]*)" as quantity$"#)]
async fn enter_quantity(world: &mut CampWorld, quantity: String) {
    let page = world.sample_page();
    if let Err(e) = page.enter_quantity(&quantity).await {
        page.take_screenshot("quantity_entry_error").await;
        panic!("Failed to enter quantity {}: {}", quantity, e);
    }
}

#[when("I click Add to Cart")]
async fn add_to_cart(world: &mut CampWorld) {
    let page = world.sample_page();
    if let Err(e) = page.click_add_to_cart().await {
        page.take_screenshot("add_to_cart_error").await;
        panic!("Failed to click Add to Cart: {}", e);
    }
}

#[then("I should see the order confirmation")]
async fn order_confirmation(world: &mut CampWorld) {
    let page = world.sample_page();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    if !page.verify_order_confirmation().await {
        page.take_screenshot("order_confirmation_error").await;
        panic!("Failed to verify order confirmation message");
    }
}

#[then("I should see the quantity validation message")]
async fn quantity_validation(world: &mut CampWorld) {
    assert!(
        world.sample_page().verify_quantity_validation_message().await,
        "Quantity validation message not found"
    );
}

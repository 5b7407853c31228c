use cucumber::{given, then, when};
use std::time::Duration;
use tracing::{debug, info};

use campsuite_e2e::artifacts::{capture_on_failure, wait_for_download};
use campsuite_e2e::pages::forms::{DOWNLOAD_FILE_NAME, NON_ENGLISH_CHECKBOXES, NON_ENGLISH_TEXT};
use campsuite_e2e::pages::UploadSlot;

use crate::world::{fixture, harness, CampWorld};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[when("I navigate to the forms page")]
async fn navigate_to_forms(world: &mut CampWorld) {
    world
        .forms_page()
        .navigate_from_home()
        .await
        .unwrap_or_else(|e| panic!("Failed to navigate to the Forms page: {}", e));
}

#[then("I should see the forms page successfully loaded")]
async fn forms_page_loaded(world: &mut CampWorld) {
    assert!(world.forms_page().verify_page_loaded().await, "Forms page failed to load.");
}

#[given("I am on the forms page")]
async fn on_forms_page(world: &mut CampWorld) {
    let page = world.forms_page();
    page.navigate()
        .await
        .unwrap_or_else(|e| panic!("Failed to open the Forms page: {}", e));
    assert!(page.verify_page_loaded().await, "Failed to load the Forms page");
}

#[when("I fill out the basic form controls")]
async fn fill_basic_controls(world: &mut CampWorld) {
    let page = world.forms_page();

    let filled = capture_on_failure(page.driver(), &harness().screenshots, "basic_form", async {
        page.fill_years_of_experience("5").await?;
        page.select_checkboxes(&["Python", "JavaScript"]).await?;
        page.select_radio_button("Selenium").await?;
        page.select_primary_skill("Selenium").await?;
        page.choose_languages(&["JavaScript", "Python"]).await?;
        page.fill_notes("This is a sample note for testing.").await?;
        page.upload_file(&fixture("cv.html"), UploadSlot::Cv).await?;
        page.upload_file(&fixture("certificates.zip"), UploadSlot::Certificates)
            .await?;
        page.toggle_german_switch(true).await?;
        page.set_german_fluency(3).await
    })
    .await;

    if let Err(e) = filled {
        panic!("Failed to fill the basic form controls: {}", e);
    }

    debug!("Capturing filled form");
    page.take_screenshot("filled_form").await;
    info!("Screenshot of filled form captured.");
}

#[then("I submit the form")]
async fn submit_form(world: &mut CampWorld) {
    world
        .forms_page()
        .submit_form()
        .await
        .unwrap_or_else(|e| panic!("Failed to submit the form: {}", e));
    info!("Form submitted successfully.");
}

#[when("I fill out the non-English text field")]
async fn fill_non_english_text(world: &mut CampWorld) {
    world
        .forms_page()
        .fill_non_english_text_field(NON_ENGLISH_TEXT)
        .await
        .unwrap_or_else(|e| panic!("Failed to fill the non-English text field: {}", e));
}

#[when("I select the non-English checkboxes")]
async fn select_non_english(world: &mut CampWorld) {
    world
        .forms_page()
        .select_non_english_checkboxes(&NON_ENGLISH_CHECKBOXES)
        .await
        .unwrap_or_else(|e| panic!("Failed to select the non-English checkboxes: {}", e));
}

#[then("the non-English elements should reflect the changes")]
async fn non_english_reflected(world: &mut CampWorld) {
    let page = world.forms_page();
    assert!(
        page.verify_non_english_elements(NON_ENGLISH_TEXT, &NON_ENGLISH_CHECKBOXES)
            .await,
        "Non-English elements did not reflect the changes."
    );
    page.take_screenshot("non_english_elements_verification").await;
}

#[when("I click on the Download File link")]
async fn click_download(world: &mut CampWorld) {
    world
        .forms_page()
        .click_download_file()
        .await
        .unwrap_or_else(|e| panic!("Failed to click the Download File link: {}", e));
}

#[then("the file should be downloaded successfully")]
async fn file_downloaded(world: &mut CampWorld) {
    let dir = &world.config().download_dir;
    let path = wait_for_download(dir, DOWNLOAD_FILE_NAME, DOWNLOAD_TIMEOUT)
        .await
        .unwrap_or_else(|e| panic!("Download failed or file not found: {}", e));

    if std::fs::remove_file(&path).is_ok() {
        info!("Downloaded file removed after verification.");
    }
}

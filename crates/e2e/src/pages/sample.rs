//! Sample pages: login, registration and Dinesh's Pizza House order form

use std::ops::Deref;
use std::time::Duration;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use tracing::{debug, error, info, warn};

use super::BasePage;
use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, LocatorKind};

pub const SAMPLE_PAGE_LINK: Locator = Locator::xpath("//h5[contains(text(), 'Sample Pages')]");
pub const VIEW_PAGE_BUTTON: Locator = Locator::css("a[href='login.html'].btn-success");
pub const LOGIN_FORM: Locator = Locator::xpath("//h2[contains(text(), 'Log in')]");
pub const USERNAME_FIELD: Locator = Locator::id("user");
pub const PASSWORD_FIELD: Locator = Locator::id("password");
pub const LOGIN_BUTTON: Locator = Locator::id("login");
pub const LOGIN_BUTTON_ALT: Locator = Locator::css("button.btn.btn-primary.btn-block");
pub const ERROR_MESSAGE: Locator = Locator::id("message");

pub const PIZZA_HEADING: Locator = Locator::xpath("//h3[text()=\"Dinesh's Pizza House\"]");
pub const PIZZA_ORDER_FORM: Locator = Locator::id("pizza_order_form");
pub const FLAVOR_DROPDOWN: Locator = Locator::id("select_flavor");
pub const QUANTITY_INPUT: Locator = Locator::id("quantity");
pub const QUANTITY_INPUT_ALT: Locator = Locator::css("input[aria-describedby='How many pizza you want?']");
pub const ADD_TO_CART_BUTTON: Locator = Locator::id("submit_button");
pub const CONFIRMATION_MESSAGE: Locator = Locator::id("added_message");
pub const WARNING_ICON: Locator = Locator::xpath("//i[@class='fa fa-lg fa-info-circle text-warning']");
pub const MODAL_BODY: Locator = Locator::class_name("modal-body");
pub const MODAL_CLOSE_BUTTON: Locator =
    Locator::xpath("//button[@class='btn btn-warning' and @data-dismiss='modal']");

pub const REGISTER_LINK: Locator = Locator::xpath("//a[contains(text(), 'Register')]");
pub const REGISTRATION_HEADING: Locator = Locator::xpath("//h2[text()='Register']");
pub const FIRST_NAME: Locator = Locator::name("first_name");
pub const LAST_NAME: Locator = Locator::name("last_name");
pub const EMAIL: Locator = Locator::name("email");
pub const REG_PASSWORD: Locator = Locator::name("password");
pub const CONFIRM_PASSWORD: Locator = Locator::name("confirm_password");
pub const TERMS_CHECKBOX: Locator = Locator::xpath("//input[@type='checkbox']");
pub const REGISTER_BUTTON: Locator = Locator::xpath("//button[text()='Register Now']");

pub const LOGIN_ERROR_TEXT: &str = "Incorrect username or password. Try again!";
pub const ORDER_CONFIRMATION_TEXT: &str = "Pizza added to the cart!";
pub const QUANTITY_WARNING_TEXT: &str = "Quantity must be 1 or more!";

/// Timeout for each fallback probe, kept short so the chain stays fast
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(3);

/// Values typed into the registration form; the password also fills the confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Build from `(field, value)` rows; every field must be present
    pub fn from_rows<'r, I>(rows: I) -> E2eResult<Self>
    where
        I: IntoIterator<Item = (&'r str, &'r str)>,
    {
        let mut form = RegistrationForm::default();
        let mut seen = [false; 4];

        for (field, value) in rows {
            let (slot, idx) = match field.trim() {
                "first_name" => (&mut form.first_name, 0),
                "last_name" => (&mut form.last_name, 1),
                "email" => (&mut form.email, 2),
                "password" => (&mut form.password, 3),
                other => {
                    debug!("Ignoring unknown registration field: {}", other);
                    continue;
                }
            };
            *slot = value.trim().to_string();
            seen[idx] = true;
        }

        let names = ["first_name", "last_name", "email", "password"];
        if let Some(missing) = names.iter().zip(seen).find(|(_, ok)| !ok).map(|(n, _)| *n) {
            return Err(E2eError::AssertionFailed(format!(
                "Registration data is missing '{}'",
                missing
            )));
        }
        Ok(form)
    }
}

/// Candidate locators for a pizza size radio, most specific first
pub fn size_locators(size: &str) -> [Locator; 3] {
    let upper = size.to_uppercase();
    [
        Locator::dynamic(LocatorKind::Id, format!("rad_{}", size.to_lowercase())),
        Locator::dynamic(LocatorKind::Css, format!("input[name='size'][value='{}']", upper)),
        Locator::dynamic(
            LocatorKind::XPath,
            format!("//div[contains(@class, 'form-check-inline')]//input[@value='{}']", upper),
        ),
    ]
}

pub struct SamplePage<'a> {
    base: BasePage<'a>,
}

impl<'a> SamplePage<'a> {
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// From the homepage, open the login sample through its "View Page" button
    pub async fn click_sample_page_link(&self) -> E2eResult<()> {
        let opened = async {
            self.base.wait_for_visible(&SAMPLE_PAGE_LINK, None).await?;
            let button = self.base.wait_for_visible(&VIEW_PAGE_BUTTON, None).await?;
            self.base.scroll_to(&button).await;
            button.click().await?;
            Ok::<(), E2eError>(())
        }
        .await;

        match opened {
            Ok(()) => {
                info!("Clicked Sample Pages link");
                Ok(())
            }
            Err(e) => {
                error!("Failed to click Sample Pages link: {}", e);
                Err(e)
            }
        }
    }

    pub async fn verify_login_page(&self) -> bool {
        self.base.wait_for_visible(&LOGIN_FORM, None).await.is_ok()
    }

    /// Fill in the credentials and submit once
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        let user = self.base.wait_for_visible(&USERNAME_FIELD, None).await?;
        user.clear().await?;
        user.send_keys(username).await?;

        let pass = self.base.wait_for_visible(&PASSWORD_FIELD, None).await?;
        pass.clear().await?;
        pass.send_keys(password).await?;

        let button = self.base.wait_for_clickable(&LOGIN_BUTTON, None).await?;
        self.base.scroll_to(&button).await;
        button.click().await?;

        info!("Performed login with username: {}", username);
        Ok(())
    }

    /// Click login, tolerating a page that already moved past `login.html`
    pub async fn click_login_button(&self) -> E2eResult<()> {
        let url = self.base.current_url().await?;
        if !url.contains("login.html") {
            info!("Already navigated away from login page: {}", url);
            return Ok(());
        }

        for locator in [&LOGIN_BUTTON, &LOGIN_BUTTON_ALT] {
            match self.base.probe_visible(locator, FALLBACK_TIMEOUT).await {
                Ok(button) => match button.click().await {
                    Ok(()) => {
                        info!("Clicked login button using {}", locator);
                        return Ok(());
                    }
                    Err(e) => debug!("Click on {} failed: {}", locator, e),
                },
                Err(_) => debug!("Login button not found with {}", locator),
            }
        }

        warn!("Falling back to JavaScript click on the login button");
        let clicked = async {
            let button = self.base.driver().find(LOGIN_BUTTON.by()).await?;
            self.base.js_click(&button).await
        }
        .await;

        match clicked {
            Ok(()) => {
                info!("Clicked login button with JavaScript");
                Ok(())
            }
            Err(e) => {
                error!("Failed to click login button: {}", e);
                self.take_screenshot("login_button_failed").await;
                Err(e)
            }
        }
    }

    /// The pizza heading and order form are both visible
    pub async fn verify_login_result(&self) -> bool {
        let checked = async {
            self.base.wait_for_visible(&PIZZA_HEADING, None).await?;
            self.base.wait_for_visible(&PIZZA_ORDER_FORM, None).await?;
            Ok::<(), E2eError>(())
        }
        .await;

        match checked {
            Ok(()) => {
                info!("Login verified: pizza order page is displayed");
                true
            }
            Err(e) => {
                error!("Error verifying login result: {}", e);
                false
            }
        }
    }

    /// Pizza form check with storage reset and before/after screenshots
    pub async fn verify_pizza_form_displayed(&self) -> bool {
        info!("=== Starting Pizza Form Verification ===");
        match self.check_pizza_form().await {
            Ok(()) => {
                info!("Successfully verified pizza order form is displayed");
                info!("=== Pizza Form Verification Complete ===");
                true
            }
            Err(e) => {
                error!("=== Pizza Form Verification Failed ===");
                error!("Error verifying pizza form: {}", e);
                self.take_screenshot("pizza_form_verification_failed").await;
                if let Ok(url) = self.base.current_url().await {
                    error!("Current URL at time of error: {}", url);
                }
                self.log_page_errors().await;
                false
            }
        }
    }

    async fn check_pizza_form(&self) -> E2eResult<()> {
        let driver = self.base.driver();
        info!("Current URL: {}", self.base.current_url().await?);
        info!("Page Title: {}", driver.title().await?);

        driver.execute("localStorage.clear();", Vec::new()).await?;
        driver.execute("sessionStorage.clear();", Vec::new()).await?;
        self.take_screenshot("before_form_verification").await;

        let heading = self.base.wait_for_visible(&PIZZA_HEADING, None).await?;
        info!("Heading text: {}", heading.text().await?);

        let form = self.base.wait_for_visible(&PIZZA_ORDER_FORM, None).await?;
        self.take_screenshot("after_form_verification").await;

        info!("Form ID: {}", form.id().await?.unwrap_or_default());
        info!("Form Classes: {}", form.class_name().await?.unwrap_or_default());
        info!("Form is Displayed: {}", form.is_displayed().await?);
        info!("Form is Enabled: {}", form.is_enabled().await?);
        Ok(())
    }

    async fn log_page_errors(&self) {
        let Ok(errors) = self.base.driver().find_all(By::ClassName("error")).await else {
            return;
        };
        if !errors.is_empty() {
            error!("Found error messages on page:");
        }
        for elem in errors {
            if let Ok(text) = elem.text().await {
                error!("Error message: {}", text);
            }
        }
    }

    pub async fn verify_error_message(&self) -> bool {
        let text = match self.base.wait_for_visible(&ERROR_MESSAGE, None).await {
            Ok(elem) => elem.text().await.unwrap_or_default(),
            Err(e) => {
                error!("Error message not displayed: {}", e);
                return false;
            }
        };

        if text.trim() == LOGIN_ERROR_TEXT {
            info!("Error message verified: {}", text);
            true
        } else {
            error!("Unexpected error message: {}", text);
            false
        }
    }

    pub async fn click_register_link(&self) -> E2eResult<()> {
        let link = self.base.wait_for_clickable(&REGISTER_LINK, None).await?;
        link.click().await?;
        info!("Clicked register link");
        Ok(())
    }

    pub async fn verify_registration_page(&self) -> bool {
        match self.base.wait_for_visible(&REGISTRATION_HEADING, None).await {
            Ok(_) => {
                info!("Registration page verified");
                true
            }
            Err(e) => {
                error!("Failed to verify registration page: {}", e);
                false
            }
        }
    }

    pub async fn fill_registration_form(&self, form: &RegistrationForm) -> E2eResult<()> {
        let fields = [
            (&FIRST_NAME, form.first_name.as_str()),
            (&LAST_NAME, form.last_name.as_str()),
            (&EMAIL, form.email.as_str()),
            (&REG_PASSWORD, form.password.as_str()),
            (&CONFIRM_PASSWORD, form.password.as_str()),
        ];
        for (locator, value) in fields {
            self.base.wait_for_visible(locator, None).await?.send_keys(value).await?;
        }
        info!("Filled registration form for {}", form.email);
        Ok(())
    }

    pub async fn accept_terms(&self) -> E2eResult<()> {
        let checkbox = self.base.wait_for_clickable(&TERMS_CHECKBOX, None).await?;
        if !checkbox.is_selected().await? {
            checkbox.click().await?;
        }
        info!("Accepted terms and conditions");
        Ok(())
    }

    pub async fn click_register_button(&self) -> E2eResult<()> {
        let button = self.base.wait_for_clickable(&REGISTER_BUTTON, None).await?;
        button.click().await?;
        info!("Clicked Register Now");
        Ok(())
    }

    /// Select a size radio via JavaScript click, trying each candidate locator
    pub async fn select_pizza_size(&self, size: &str) -> E2eResult<()> {
        info!("Attempting to select {} size pizza", size);

        if let Ok(radios) = self.base.driver().find_all(By::Css("input[name='size']")).await {
            debug!("Found {} size radio buttons", radios.len());
        }

        let mut radio = None;
        for locator in size_locators(size) {
            match self.base.wait_for_present(&locator, Some(FALLBACK_TIMEOUT)).await {
                Ok(elem) => {
                    debug!("Size radio found with {}", locator);
                    radio = Some(elem);
                    break;
                }
                Err(_) => debug!("Size radio not present with {}", locator),
            }
        }

        let Some(radio) = radio else {
            self.take_screenshot("pizza_size_selection_failed").await;
            return Err(E2eError::AssertionFailed(format!("No radio button for size {}", size)));
        };

        self.base.scroll_to(&radio).await;
        self.base.js_click(&radio).await?;

        if radio.is_selected().await? {
            info!("Successfully selected {} size", size);
            Ok(())
        } else {
            self.take_screenshot("pizza_size_selection_failed").await;
            Err(E2eError::AssertionFailed(
                "Radio button click didn't change selection state".to_string(),
            ))
        }
    }

    pub async fn select_flavor(&self, flavor: &str) -> E2eResult<()> {
        let dropdown = self.base.wait_for_visible(&FLAVOR_DROPDOWN, None).await?;
        SelectElement::new(&dropdown)
            .await?
            .select_by_visible_text(flavor)
            .await?;
        info!("Selected flavor: {}", flavor);
        Ok(())
    }

    pub async fn select_sauce(&self, sauce: &str) -> E2eResult<()> {
        let locator = Locator::dynamic(LocatorKind::Id, format!("rad_{}", sauce.to_lowercase()));
        self.base.wait_for_clickable(&locator, None).await?.click().await?;
        info!("Selected sauce: {}", sauce);
        Ok(())
    }

    /// Each topping checkbox has the lower-cased topping name as its id
    pub async fn select_toppings(&self, toppings: &[String]) -> E2eResult<()> {
        for topping in toppings {
            let locator = Locator::dynamic(LocatorKind::Id, topping.to_lowercase());
            self.base.wait_for_clickable(&locator, None).await?.click().await?;
            info!("Selected topping: {}", topping);
        }
        Ok(())
    }

    pub async fn enter_quantity(&self, quantity: &str) -> E2eResult<()> {
        let field = match self.base.probe_visible(&QUANTITY_INPUT, self.default_timeout()).await {
            Ok(field) => field,
            Err(_) => {
                debug!("Quantity input not found by id, trying {}", QUANTITY_INPUT_ALT);
                self.base.wait_for_visible(&QUANTITY_INPUT_ALT, None).await?
            }
        };
        field.clear().await?;
        field.send_keys(quantity).await?;
        info!("Entered quantity: {}", quantity);
        Ok(())
    }

    pub async fn click_add_to_cart(&self) -> E2eResult<()> {
        let button = self.base.wait_for_clickable(&ADD_TO_CART_BUTTON, None).await?;
        button.click().await?;
        info!("Clicked Add to Cart");
        Ok(())
    }

    pub async fn verify_order_confirmation(&self) -> bool {
        let text = match self.base.wait_for_visible(&CONFIRMATION_MESSAGE, None).await {
            Ok(elem) => elem.text().await.unwrap_or_default(),
            Err(e) => {
                error!("Failed to verify order confirmation: {}", e);
                return false;
            }
        };

        if text == ORDER_CONFIRMATION_TEXT {
            info!("Order confirmation message verified successfully");
            true
        } else {
            error!("Unexpected confirmation message: {}", text);
            false
        }
    }

    /// Warning icon and modal text are shown; the modal is closed afterwards
    pub async fn verify_quantity_validation_message(&self) -> bool {
        let checked = async {
            self.base.wait_for_visible(&WARNING_ICON, None).await?;

            let body = self.base.wait_for_visible(&MODAL_BODY, None).await?;
            let text = body.text().await?;
            if !text.contains(QUANTITY_WARNING_TEXT) {
                return Err(E2eError::AssertionFailed(format!(
                    "Unexpected modal text: {}",
                    text
                )));
            }

            let close = self.base.wait_for_clickable(&MODAL_CLOSE_BUTTON, None).await?;
            close.click().await?;
            Ok::<(), E2eError>(())
        }
        .await;

        match checked {
            Ok(()) => {
                info!("Quantity validation message verified and modal closed");
                true
            }
            Err(e) => {
                error!("Failed to verify quantity validation message: {}", e);
                self.take_screenshot("quantity_validation_failed").await;
                false
            }
        }
    }
}

impl<'a> Deref for SamplePage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

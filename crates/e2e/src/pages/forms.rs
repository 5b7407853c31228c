//! The Forms page: basic form controls, non-English controls, file download

use std::ops::Deref;
use std::path::Path;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use tracing::{error, info, warn};

use super::BasePage;
use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, LocatorKind};

pub const YEARS_OF_EXPERIENCE: Locator = Locator::id("exp");
pub const PRIMARY_SKILL_DROPDOWN: Locator = Locator::id("select_tool");
pub const LANGUAGE_MULTISELECT: Locator = Locator::id("select_lang");
pub const NOTES_TEXTAREA: Locator = Locator::id("notes");
pub const UPLOAD_CV: Locator = Locator::id("upload_cv");
pub const UPLOAD_CERTIFICATES: Locator = Locator::id("upload_files");
pub const GERMAN_SWITCH: Locator = Locator::xpath("/html/body/div/div[1]/div[2]/form/div[3]/div[2]/div/label");
pub const GERMAN_FLUENCY_SLIDER: Locator = Locator::id("fluency");
pub const SUBMIT_BUTTON: Locator = Locator::xpath("//button[@type='submit']");
pub const PAGE_HEADING: Locator = Locator::xpath("//h3[text()='Basic Form Controls']");
pub const DOWNLOAD_LINK: Locator = Locator::id("download_file");
pub const NON_ENGLISH_TEXT_FIELD: Locator = Locator::id("नाव");

/// "View Page" button of the Forms card on the homepage
pub const FORMS_CARD_BUTTON: Locator = Locator::xpath("/html/body/div[2]/div[2]/div[3]/div/div[2]/a");

/// Values used by the non-English scenario
pub const NON_ENGLISH_TEXT: &str = "आपला नांव लिहा";
pub const NON_ENGLISH_CHECKBOXES: [&str; 3] = ["मराठी", "ગુજરાતી", "ਪੰਜਾਬੀ"];

/// The file the Download File link serves
pub const DOWNLOAD_FILE_NAME: &str = "sample_text.txt";

/// Which upload control a file goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    Cv,
    Certificates,
}

pub struct FormsPage<'a> {
    base: BasePage<'a>,
}

impl<'a> FormsPage<'a> {
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Open the Forms page directly
    pub async fn navigate(&self) -> E2eResult<()> {
        let url = self.base.config().page_url("forms.html")?;
        match self.base.open(&url).await {
            Ok(()) => {
                info!("Navigated directly to the Forms page.");
                Ok(())
            }
            Err(e) => {
                error!("Failed to navigate to the Forms page: {}", e);
                self.take_screenshot("navigation_error").await;
                Err(e)
            }
        }
    }

    /// Reach the Forms page through its card on the homepage
    pub async fn navigate_from_home(&self) -> E2eResult<()> {
        let button = self.base.wait_for_visible(&FORMS_CARD_BUTTON, None).await?;
        self.base
            .driver()
            .action_chain()
            .move_to_element_center(&button)
            .perform()
            .await?;

        let button = self.base.wait_for_clickable(&FORMS_CARD_BUTTON, None).await?;
        self.base.safe_click(&button).await?;
        info!("Successfully navigated to the Forms page.");
        Ok(())
    }

    pub async fn verify_page_loaded(&self) -> bool {
        match self.base.wait_for_visible(&PAGE_HEADING, None).await {
            Ok(_) => {
                info!("Forms page loaded successfully.");
                true
            }
            Err(e) => {
                self.take_screenshot("forms_page_not_loaded").await;
                error!("Failed to load Forms page: {}", e);
                false
            }
        }
    }

    pub async fn click_download_file(&self) -> E2eResult<()> {
        let clicked = async {
            let link = self.base.wait_for_clickable(&DOWNLOAD_LINK, None).await?;
            self.base.safe_click(&link).await
        }
        .await;

        match clicked {
            Ok(()) => {
                info!("Clicked on the Download File link.");
                Ok(())
            }
            Err(e) => {
                error!("Failed to click the Download File link: {}", e);
                self.take_screenshot("download_file_click_error").await;
                Err(e)
            }
        }
    }

    pub async fn fill_years_of_experience(&self, years: &str) -> E2eResult<()> {
        let input = self.base.wait_for_visible(&YEARS_OF_EXPERIENCE, None).await?;
        input.clear().await?;
        input.send_keys(years).await?;
        info!("Entered years of experience: {}", years);
        Ok(())
    }

    /// Tick each named checkbox (`check_<name>`); already-ticked ones are left alone
    pub async fn select_checkboxes(&self, checkboxes: &[&str]) -> E2eResult<()> {
        for checkbox in checkboxes {
            let locator = Locator::dynamic(LocatorKind::Id, format!("check_{}", checkbox.to_lowercase()));
            let elem = self.base.wait_for_clickable(&locator, None).await?;
            if elem.is_selected().await? {
                info!("Checkbox already selected: {}", checkbox);
            } else {
                elem.click().await?;
                info!("Selected checkbox: {}", checkbox);
            }
        }
        Ok(())
    }

    pub async fn select_radio_button(&self, button: &str) -> E2eResult<()> {
        let locator = Locator::dynamic(LocatorKind::Id, format!("rad_{}", button.to_lowercase()));
        let radio = self.base.wait_for_clickable(&locator, None).await?;
        if !radio.is_selected().await? {
            radio.click().await?;
            info!("Selected radio button: {}", button);
        }
        Ok(())
    }

    pub async fn select_primary_skill(&self, skill: &str) -> E2eResult<()> {
        let dropdown = self.base.wait_for_visible(&PRIMARY_SKILL_DROPDOWN, None).await?;
        SelectElement::new(&dropdown)
            .await?
            .select_by_visible_text(skill)
            .await?;
        info!("Selected primary skill: {}", skill);
        Ok(())
    }

    /// Pick options from the language multi-select by lower-cased value
    pub async fn choose_languages(&self, languages: &[&str]) -> E2eResult<()> {
        let multiselect = self.base.wait_for_visible(&LANGUAGE_MULTISELECT, None).await?;
        for language in languages {
            let option = multiselect
                .find(By::XPath(format!(".//option[@value='{}']", language.to_lowercase())))
                .await?;
            option.click().await?;
            info!("Selected language: {}", language);
        }
        Ok(())
    }

    pub async fn fill_notes(&self, notes: &str) -> E2eResult<()> {
        let textarea = self.base.wait_for_visible(&NOTES_TEXTAREA, None).await?;
        textarea.clear().await?;
        textarea.send_keys(notes).await?;
        info!("Filled in the notes section.");
        Ok(())
    }

    pub async fn upload_file(&self, path: &Path, slot: UploadSlot) -> E2eResult<()> {
        let locator = match slot {
            UploadSlot::Cv => &UPLOAD_CV,
            UploadSlot::Certificates => &UPLOAD_CERTIFICATES,
        };
        let absolute = path.canonicalize()?;
        let field = self.base.wait_for_visible(locator, None).await?;
        field.send_keys(absolute.to_string_lossy().as_ref()).await?;
        info!("Uploaded file: {}", absolute.display());
        Ok(())
    }

    /// Set the "Speaks German?" switch; only clicks when the state differs
    pub async fn toggle_german_switch(&self, on: bool) -> E2eResult<()> {
        let switch = self.base.wait_for_clickable(&GERMAN_SWITCH, None).await?;
        let current = self.german_switch_state(&switch).await;

        if current != on {
            switch.click().await?;
        }
        info!("Set 'Speaks German?' switch to: {}", on);
        Ok(())
    }

    /// The switch is a label; its state lives on the input it points at
    async fn german_switch_state(&self, label: &WebElement) -> bool {
        let target = match label.attr("for").await {
            Ok(Some(id)) if !id.is_empty() => id,
            _ => return label.is_selected().await.unwrap_or(false),
        };

        match self.base.driver().find(By::Id(target.as_str())).await {
            Ok(input) => input.is_selected().await.unwrap_or(false),
            Err(e) => {
                warn!("German switch input '{}' not found: {}", target, e);
                false
            }
        }
    }

    pub async fn set_german_fluency(&self, level: u8) -> E2eResult<()> {
        let slider = self.base.wait_for_visible(&GERMAN_FLUENCY_SLIDER, None).await?;
        self.base
            .driver()
            .execute(
                "arguments[0].value = arguments[1]",
                vec![slider.to_json()?, serde_json::json!(level)],
            )
            .await?;
        info!("Set German fluency level to: {}", level);
        Ok(())
    }

    pub async fn fill_non_english_text_field(&self, text: &str) -> E2eResult<()> {
        let field = self.base.wait_for_visible(&NON_ENGLISH_TEXT_FIELD, None).await?;
        field.clear().await?;
        field.send_keys(text).await?;
        info!("Filled non-English text field with: {}", text);
        Ok(())
    }

    /// Tick the checkboxes whose ids are the given language names
    pub async fn select_non_english_checkboxes(&self, languages: &[&str]) -> E2eResult<()> {
        for language in languages {
            let locator = Locator::dynamic(LocatorKind::Id, *language);
            let checkbox = self.base.wait_for_clickable(&locator, None).await?;
            if !checkbox.is_selected().await? {
                self.base.safe_click(&checkbox).await?;
                info!("Selected checkbox: {}", language);
            }
        }
        Ok(())
    }

    /// The text field holds `expected_text` and every checkbox in `ids` is ticked
    pub async fn verify_non_english_elements(&self, expected_text: &str, ids: &[&str]) -> bool {
        match self.check_non_english_elements(expected_text, ids).await {
            Ok(()) => {
                info!("Non-English elements reflected the changes correctly.");
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    async fn check_non_english_elements(&self, expected_text: &str, ids: &[&str]) -> E2eResult<()> {
        let field = self.base.wait_for_visible(&NON_ENGLISH_TEXT_FIELD, None).await?;
        let entered = field.prop("value").await?.unwrap_or_default();
        if entered != expected_text {
            return Err(E2eError::AssertionFailed(format!(
                "Non-English text field value mismatch: {}",
                entered
            )));
        }

        for id in ids {
            let checkbox = self
                .base
                .wait_for_visible(&Locator::dynamic(LocatorKind::Id, *id), None)
                .await?;
            if !checkbox.is_selected().await? {
                return Err(E2eError::AssertionFailed(format!(
                    "Checkbox {} is not selected.",
                    id
                )));
            }
        }
        Ok(())
    }

    pub async fn submit_form(&self) -> E2eResult<()> {
        let button = self.base.wait_for_clickable(&SUBMIT_BUTTON, None).await?;
        self.base.safe_click(&button).await?;
        info!("Submitted the form.");
        Ok(())
    }
}

impl<'a> Deref for FormsPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

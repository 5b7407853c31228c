//! Homepage of the practice site

use std::ops::Deref;
use tracing::{error, info};

use super::BasePage;
use crate::locator::{Locator, NamedLocator};

/// Candidates tried in order to confirm the homepage rendered
pub const LOCATORS: &[NamedLocator] = &[
    NamedLocator::new("main_heading", Locator::tag("h1")),
    NamedLocator::new("content_area", Locator::id("main")),
    NamedLocator::new("site_content", Locator::class_name("site-content")),
];

pub struct HomePage<'a> {
    base: BasePage<'a>,
}

impl<'a> HomePage<'a> {
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// True if any of the homepage locators resolves to a displayed element
    pub async fn verify_page_loaded(&self) -> bool {
        match self.base.first_visible(LOCATORS, None).await {
            Some((name, _)) => {
                info!("Homepage verified using {} locator", name);
                true
            }
            None => {
                error!("Could not verify homepage using any locators");
                false
            }
        }
    }

    /// Text of the first displayed homepage heading candidate
    pub async fn page_title(&self) -> Option<String> {
        let (_, elem) = self.base.first_visible(LOCATORS, None).await.or_else(|| {
            error!("Could not find page title");
            None
        })?;

        match elem.text().await {
            Ok(text) => {
                info!("Found page title: {}", text);
                Some(text)
            }
            Err(e) => {
                error!("Error getting page title: {}", e);
                None
            }
        }
    }
}

impl<'a> Deref for HomePage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

use super::{ensure_state, PageObject, PageState, Transition};
use crate::error::Result;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const FIRST_NAME_INPUT: Locator = Locator::from_static(By::Id, "first-name");
const LAST_NAME_INPUT: Locator = Locator::from_static(By::Id, "last-name");
const POSTAL_CODE_INPUT: Locator = Locator::from_static(By::Id, "postal-code");
const CONTINUE_BUTTON: Locator = Locator::from_static(By::Id, "continue");
const CANCEL_BUTTON: Locator = Locator::from_static(By::Id, "cancel");
const ERROR_MESSAGE: Locator = Locator::from_static(
    By::Xpath,
    "//div[contains(@class, 'error-message-container')]/h3",
);

/// Customer details for the first checkout step. The storefront, not this
/// client, rejects empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl CheckoutInfo {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

pub struct CheckoutInfoPage {
    ui: Interactor,
}

impl CheckoutInfoPage {
    pub fn new(ui: Interactor) -> Self {
        Self { ui }
    }

    pub async fn enter_first_name(&self, first_name: &str) -> Result<()> {
        self.ui.type_text(&FIRST_NAME_INPUT, first_name).await
    }

    pub async fn enter_last_name(&self, last_name: &str) -> Result<()> {
        self.ui.type_text(&LAST_NAME_INPUT, last_name).await
    }

    pub async fn enter_postal_code(&self, postal_code: &str) -> Result<()> {
        self.ui.type_text(&POSTAL_CODE_INPUT, postal_code).await
    }

    pub async fn fill(&self, info: &CheckoutInfo) -> Result<()> {
        self.enter_first_name(&info.first_name).await?;
        self.enter_last_name(&info.last_name).await?;
        self.enter_postal_code(&info.postal_code).await
    }

    /// Submit the form: Overview when valid, otherwise stays here with an error
    pub async fn continue_checkout(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::ContinueCheckout).await?;
        self.ui.click(&CONTINUE_BUTTON).await
    }

    pub async fn cancel(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::CancelCheckout).await?;
        self.ui.click(&CANCEL_BUTTON).await
    }

    /// Validation error text, or an empty string when no error is shown
    pub async fn error_message(&self) -> Result<String> {
        if self.ui.is_visible(&ERROR_MESSAGE).await {
            return self.ui.read_text(&ERROR_MESSAGE).await;
        }
        Ok(String::new())
    }
}

#[async_trait]
impl PageObject for CheckoutInfoPage {
    const STATE: PageState = PageState::CheckoutInfo;

    fn ui(&self) -> &Interactor {
        &self.ui
    }
}

use super::{ensure_state, PageObject, PageState, Transition};
use crate::error::Result;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use async_trait::async_trait;

const COMPLETE_HEADER: Locator = Locator::from_static(By::ClassName, "complete-header");
const BACK_HOME_BUTTON: Locator = Locator::from_static(By::Id, "back-to-products");

pub struct CheckoutCompletePage {
    ui: Interactor,
}

impl CheckoutCompletePage {
    pub fn new(ui: Interactor) -> Self {
        Self { ui }
    }

    /// e.g. "Thank you for your order!"
    pub async fn header_message(&self) -> Result<String> {
        self.ui.read_text(&COMPLETE_HEADER).await
    }

    /// Back to Inventory with an empty cart
    pub async fn back_home(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::BackHome).await?;
        self.ui.click(&BACK_HOME_BUTTON).await
    }
}

#[async_trait]
impl PageObject for CheckoutCompletePage {
    const STATE: PageState = PageState::CheckoutComplete;

    fn ui(&self) -> &Interactor {
        &self.ui
    }
}

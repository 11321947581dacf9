use super::inventory::{explain_missing_button, remove_button};
use super::{badge_count, ensure_state, PageObject, PageState, Transition};
use crate::error::Result;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use async_trait::async_trait;

const CART_ITEM_NAME: Locator = Locator::from_static(By::ClassName, "inventory_item_name");
const CHECKOUT_BUTTON: Locator = Locator::from_static(By::Id, "checkout");
const CONTINUE_SHOPPING_BUTTON: Locator = Locator::from_static(By::Id, "continue-shopping");

pub struct CartPage {
    ui: Interactor,
}

impl CartPage {
    pub fn new(ui: Interactor) -> Self {
        Self { ui }
    }

    /// Line items in DOM order; an empty cart yields an empty list
    pub async fn item_names(&self) -> Result<Vec<String>> {
        self.ui.read_texts(&CART_ITEM_NAME).await
    }

    pub async fn remove_item(&self, name: &str) -> Result<()> {
        ensure_state(&self.ui, Transition::RemoveFromCart).await?;
        let remove = remove_button(name)?;
        match self.ui.click(&remove).await {
            // no add button on this page, so any listed-but-unclickable item is a mismatch
            Err(e) => Err(explain_missing_button(&self.ui, name, &CART_ITEM_NAME, &remove, e).await),
            ok => ok,
        }
    }

    pub async fn badge_count(&self) -> Result<usize> {
        badge_count(&self.ui).await
    }

    pub async fn proceed_to_checkout(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::ProceedToCheckout).await?;
        self.ui.click(&CHECKOUT_BUTTON).await
    }

    pub async fn continue_shopping(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::ContinueShopping).await?;
        self.ui.click(&CONTINUE_SHOPPING_BUTTON).await
    }
}

#[async_trait]
impl PageObject for CartPage {
    const STATE: PageState = PageState::Cart;

    fn ui(&self) -> &Interactor {
        &self.ui
    }
}

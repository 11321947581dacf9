use super::{ensure_state, PageObject, PageState, Transition};
use crate::error::Result;
use crate::format::parse_money_label;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use async_trait::async_trait;

const ITEM_NAME: Locator = Locator::from_static(By::ClassName, "inventory_item_name");
const FINISH_BUTTON: Locator = Locator::from_static(By::Id, "finish");
const CANCEL_BUTTON: Locator = Locator::from_static(By::Id, "cancel");
const SUBTOTAL_LABEL: Locator = Locator::from_static(By::ClassName, "summary_subtotal_label");
const TAX_LABEL: Locator = Locator::from_static(By::ClassName, "summary_tax_label");
const TOTAL_LABEL: Locator = Locator::from_static(By::ClassName, "summary_total_label");
const PAYMENT_INFO: Locator = Locator::from_static(By::Css, "div[data-test='payment-info-value']");
const SHIPPING_INFO: Locator = Locator::from_static(By::Css, "div[data-test='shipping-info-value']");

pub struct CheckoutOverviewPage {
    ui: Interactor,
}

impl CheckoutOverviewPage {
    pub fn new(ui: Interactor) -> Self {
        Self { ui }
    }

    pub async fn item_names(&self) -> Result<Vec<String>> {
        self.ui.read_texts(&ITEM_NAME).await
    }

    /// "Item total: $X.XX"
    pub async fn subtotal(&self) -> Result<f64> {
        parse_money_label(&self.ui.read_text(&SUBTOTAL_LABEL).await?)
    }

    /// "Tax: $X.XX"
    pub async fn tax(&self) -> Result<f64> {
        parse_money_label(&self.ui.read_text(&TAX_LABEL).await?)
    }

    /// "Total: $X.XX"
    pub async fn total(&self) -> Result<f64> {
        parse_money_label(&self.ui.read_text(&TOTAL_LABEL).await?)
    }

    pub async fn payment_information(&self) -> Result<String> {
        self.ui.read_text(&PAYMENT_INFO).await
    }

    pub async fn shipping_information(&self) -> Result<String> {
        self.ui.read_text(&SHIPPING_INFO).await
    }

    pub async fn finish(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::Finish).await?;
        self.ui.click(&FINISH_BUTTON).await
    }

    pub async fn cancel(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::CancelOverview).await?;
        self.ui.click(&CANCEL_BUTTON).await
    }
}

#[async_trait]
impl PageObject for CheckoutOverviewPage {
    const STATE: PageState = PageState::CheckoutOverview;

    fn ui(&self) -> &Interactor {
        &self.ui
    }
}

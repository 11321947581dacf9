use super::{badge_count, ensure_state, PageObject, PageState, Transition, CART_LINK};
use crate::error::{E2eError, Result};
use crate::format::{parse_price, slugify};
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use crate::wait::TimeoutBudget;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const INVENTORY_ITEM: Locator = Locator::from_static(By::ClassName, "inventory_item");
const ITEM_NAME: Locator = Locator::from_static(By::ClassName, "inventory_item_name");
const ITEM_DESCRIPTION: Locator = Locator::from_static(By::ClassName, "inventory_item_desc");
const ITEM_PRICE: Locator = Locator::from_static(By::ClassName, "inventory_item_price");
const SORT_DROPDOWN: Locator = Locator::from_static(By::ClassName, "product_sort_container");
const ACTIVE_SORT: Locator = Locator::from_static(By::ClassName, "active_option");
const MENU_BUTTON: Locator = Locator::from_static(By::Id, "react-burger-menu-btn");
const LOGOUT_LINK: Locator = Locator::from_static(By::Id, "logout_sidebar_link");

const ADD_BUTTON_PREFIX: &str = "add-to-cart-";
const REMOVE_BUTTON_PREFIX: &str = "remove-";

/// One product card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Orderings offered by the sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// `value` attribute of the dropdown option
    pub fn value(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "az",
            SortOrder::NameDesc => "za",
            SortOrder::PriceAsc => "lohi",
            SortOrder::PriceDesc => "hilo",
        }
    }

    /// Visible option text
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "Name (A to Z)",
            SortOrder::NameDesc => "Name (Z to A)",
            SortOrder::PriceAsc => "Price (low to high)",
            SortOrder::PriceDesc => "Price (high to low)",
        }
    }
}

pub(crate) fn add_button(name: &str) -> Result<Locator> {
    Ok(Locator::id(format!("{}{}", ADD_BUTTON_PREFIX, slugify(name)?)))
}

pub(crate) fn remove_button(name: &str) -> Result<Locator> {
    Ok(Locator::id(format!("{}{}", REMOVE_BUTTON_PREFIX, slugify(name)?)))
}

/// Turn a missing button for an item that *is* listed into a slug mismatch
pub(crate) async fn explain_missing_button(
    ui: &Interactor,
    name: &str,
    listed: &Locator,
    other_button: &Locator,
    err: E2eError,
) -> E2eError {
    if !matches!(err, E2eError::NotClickable { .. }) {
        return err;
    }
    let brief = ui.within(ui.capped(TimeoutBudget::BRIEF));
    let is_listed = brief
        .read_texts(listed)
        .await
        .map(|names| names.iter().any(|n| n == name))
        .unwrap_or(false);
    if is_listed && !brief.is_visible(other_button).await {
        return E2eError::format_error(format!(
            "item {:?} is listed but has no button matching its generated id",
            name
        ));
    }
    err
}

pub struct InventoryPage {
    ui: Interactor,
}

impl InventoryPage {
    pub fn new(ui: Interactor) -> Self {
        Self { ui }
    }

    /// Number of product cards
    pub async fn item_count(&self) -> Result<usize> {
        Ok(self.ui.find_many(&INVENTORY_ITEM).await?.len())
    }

    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.ui.read_texts(&ITEM_NAME).await
    }

    pub async fn product_prices(&self) -> Result<Vec<f64>> {
        self.ui
            .read_texts(&ITEM_PRICE)
            .await?
            .iter()
            .map(|text| parse_price(text))
            .collect()
    }

    pub async fn items(&self) -> Result<Vec<CatalogItem>> {
        let names = self.product_names().await?;
        let descriptions = self.ui.read_texts(&ITEM_DESCRIPTION).await?;
        let prices = self.product_prices().await?;

        if names.len() != descriptions.len() || names.len() != prices.len() {
            return Err(E2eError::format_error(format!(
                "product cards disagree: {} names, {} descriptions, {} prices",
                names.len(),
                descriptions.len(),
                prices.len()
            )));
        }

        Ok(names
            .into_iter()
            .zip(descriptions)
            .zip(prices)
            .map(|((name, description), price)| CatalogItem {
                name,
                description,
                price,
            })
            .collect())
    }

    pub async fn add_item(&self, name: &str) -> Result<()> {
        ensure_state(&self.ui, Transition::AddItem).await?;
        let add = add_button(name)?;
        info!("Adding {:?} to cart", name);
        match self.ui.click(&add).await {
            Err(e) => {
                let remove = remove_button(name)?;
                Err(explain_missing_button(&self.ui, name, &ITEM_NAME, &remove, e).await)
            }
            ok => ok,
        }
    }

    pub async fn remove_item(&self, name: &str) -> Result<()> {
        ensure_state(&self.ui, Transition::RemoveItem).await?;
        let remove = remove_button(name)?;
        info!("Removing {:?} from cart", name);
        match self.ui.click(&remove).await {
            Err(e) => {
                let add = add_button(name)?;
                Err(explain_missing_button(&self.ui, name, &ITEM_NAME, &add, e).await)
            }
            ok => ok,
        }
    }

    /// Items in the cart per the header badge; 0 when no badge is shown
    pub async fn badge_count(&self) -> Result<usize> {
        badge_count(&self.ui).await
    }

    pub async fn go_to_cart(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::GoToCart).await?;
        self.ui.click(&CART_LINK).await
    }

    pub async fn sort_by(&self, order: SortOrder) -> Result<()> {
        self.ui.select_by_value(&SORT_DROPDOWN, order.value()).await
    }

    pub async fn sort_by_label(&self, label: &str) -> Result<()> {
        self.ui.select_by_visible_text(&SORT_DROPDOWN, label).await
    }

    pub async fn active_sort_label(&self) -> Result<String> {
        self.ui.read_text(&ACTIVE_SORT).await
    }

    pub async fn open_menu(&self) -> Result<()> {
        self.ui.click(&MENU_BUTTON).await
    }

    pub async fn logout(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::Logout).await?;
        let brief = self.ui.capped(TimeoutBudget::BRIEF);
        if !self.ui.within(brief).is_visible(&LOGOUT_LINK).await {
            self.open_menu().await?;
        }
        self.ui.click(&LOGOUT_LINK).await
    }
}

#[async_trait]
impl PageObject for InventoryPage {
    const STATE: PageState = PageState::Inventory;

    fn ui(&self) -> &Interactor {
        &self.ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_locators() {
        assert_eq!(
            add_button("Sauce Labs Backpack").unwrap(),
            Locator::id("add-to-cart-sauce-labs-backpack")
        );
        assert_eq!(
            remove_button("Sauce Labs Onesie").unwrap(),
            Locator::id("remove-sauce-labs-onesie")
        );
        assert!(matches!(add_button(""), Err(E2eError::Format(_))));
    }

    #[test]
    fn test_sort_order_contract() {
        assert_eq!(SortOrder::PriceAsc.value(), "lohi");
        assert_eq!(SortOrder::PriceDesc.label(), "Price (high to low)");
        assert_eq!(SortOrder::NameAsc.label(), "Name (A to Z)");
    }
}

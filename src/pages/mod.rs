//! Page objects for the storefront flow and the state machine they form.
//!
//! Each page exposes only the operations legal while it is displayed.
//! Transition operations declare their legal source states and check them
//! with [`ensure_state`] before touching the DOM, so a call made from the
//! wrong page fails with `InvalidState` instead of an opaque timeout.

mod cart;
mod checkout_complete;
mod checkout_info;
mod checkout_overview;
mod inventory;
mod login;

pub use cart::CartPage;
pub use checkout_complete::CheckoutCompletePage;
pub use checkout_info::{CheckoutInfo, CheckoutInfoPage};
pub use checkout_overview::CheckoutOverviewPage;
pub use inventory::{CatalogItem, InventoryPage, SortOrder};
pub use login::LoginPage;

use crate::config::Config;
use crate::error::{E2eError, Result};
use crate::format::parse_badge;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use crate::session::Session;
use crate::wait::{TimeoutBudget, WaitEngine, Waited};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Page header text shared by every page after login
pub(crate) const PAGE_TITLE: Locator = Locator::from_static(By::ClassName, "title");
pub(crate) const CART_BADGE: Locator = Locator::from_static(By::ClassName, "shopping_cart_badge");
pub(crate) const CART_LINK: Locator = Locator::from_static(By::Id, "shopping_cart_container");

/// Reachable UI states of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageState {
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    CheckoutComplete,
}

impl PageState {
    pub const ALL: [PageState; 6] = [
        PageState::Login,
        PageState::Inventory,
        PageState::Cart,
        PageState::CheckoutInfo,
        PageState::CheckoutOverview,
        PageState::CheckoutComplete,
    ];

    /// Exact text of the `.title` header; the login page has none
    pub fn title(&self) -> Option<&'static str> {
        match self {
            PageState::Login => None,
            PageState::Inventory => Some("Products"),
            PageState::Cart => Some("Your Cart"),
            PageState::CheckoutInfo => Some("Checkout: Your Information"),
            PageState::CheckoutOverview => Some("Checkout: Overview"),
            PageState::CheckoutComplete => Some("Checkout: Complete!"),
        }
    }

    /// Last URL path segment; the login page is the site root
    pub fn path_segment(&self) -> &'static str {
        match self {
            PageState::Login => "",
            PageState::Inventory => "inventory.html",
            PageState::Cart => "cart.html",
            PageState::CheckoutInfo => "checkout-step-one.html",
            PageState::CheckoutOverview => "checkout-step-two.html",
            PageState::CheckoutComplete => "checkout-complete.html",
        }
    }

    /// Infer the state from the URL and the `.title` text, title first
    pub fn detect(url: &str, title: Option<&str>) -> Option<PageState> {
        if let Some(title) = title {
            if let Some(state) = Self::ALL.iter().find(|s| s.title() == Some(title)) {
                return Some(*state);
            }
        }
        let segment = path_segment(url);
        Self::ALL
            .iter()
            .find(|s| s.path_segment() == segment)
            .copied()
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Last segment of a URL's path (`""` for the root)
pub fn path_segment(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// User-invoked edges of the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    SubmitLogin,
    AddItem,
    RemoveItem,
    GoToCart,
    Logout,
    RemoveFromCart,
    ProceedToCheckout,
    ContinueShopping,
    ContinueCheckout,
    CancelCheckout,
    Finish,
    CancelOverview,
    BackHome,
}

impl Transition {
    /// States the transition may be invoked from
    pub fn sources(&self) -> &'static [PageState] {
        use PageState::*;
        match self {
            Transition::SubmitLogin => &[Login],
            Transition::AddItem
            | Transition::RemoveItem
            | Transition::GoToCart
            | Transition::Logout => &[Inventory],
            Transition::RemoveFromCart
            | Transition::ProceedToCheckout
            | Transition::ContinueShopping => &[Cart],
            Transition::ContinueCheckout | Transition::CancelCheckout => &[CheckoutInfo],
            Transition::Finish | Transition::CancelOverview => &[CheckoutOverview],
            Transition::BackHome => &[CheckoutComplete],
        }
    }

    /// States the UI may land in afterwards
    pub fn targets(&self) -> &'static [PageState] {
        use PageState::*;
        match self {
            Transition::SubmitLogin => &[Inventory, Login],
            Transition::AddItem | Transition::RemoveItem => &[Inventory],
            Transition::GoToCart => &[Cart],
            Transition::Logout => &[Login],
            Transition::RemoveFromCart => &[Cart],
            Transition::ProceedToCheckout => &[CheckoutInfo],
            Transition::ContinueShopping => &[Inventory],
            Transition::ContinueCheckout => &[CheckoutOverview, CheckoutInfo],
            Transition::CancelCheckout => &[Cart],
            Transition::Finish => &[CheckoutComplete],
            Transition::CancelOverview | Transition::BackHome => &[Inventory],
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The state currently displayed, from a single look at URL and title
pub async fn current_state(ui: &Interactor) -> Result<Option<PageState>> {
    let url = ui.current_url().await?;
    let title = ui
        .within(TimeoutBudget::from_millis(0))
        .read_text(&PAGE_TITLE)
        .await
        .ok();
    Ok(PageState::detect(&url, title.as_deref()))
}

/// Wait briefly for the UI to reach a legal source state of `transition`
pub async fn ensure_state(ui: &Interactor, transition: Transition) -> Result<PageState> {
    let sources = transition.sources();
    let waited = ui
        .engine()
        .poll(ui.capped(TimeoutBudget::PROBE), move || async move {
            let state = current_state(ui).await?;
            Ok::<_, E2eError>(state.filter(|s| sources.contains(s)))
        })
        .await?;

    match waited {
        Waited::Ready(state) => {
            debug!("{} from {}", transition, state);
            Ok(state)
        }
        Waited::TimedOut { .. } => {
            let actual = match current_state(ui).await? {
                Some(state) => state.to_string(),
                None => "an unknown page".to_string(),
            };
            warn!("Rejected {} from {}", transition, actual);
            Err(E2eError::InvalidState {
                transition: transition.to_string(),
                expected: format!("{:?}", sources),
                actual,
            })
        }
    }
}

/// A named UI state and the predicate telling whether it is displayed
#[async_trait]
pub trait PageObject: Sync {
    const STATE: PageState;

    fn ui(&self) -> &Interactor;

    /// Title text and URL segment both match. Never fails.
    async fn is_displayed(&self) -> bool {
        let ui = self.ui();
        let Some(expected) = Self::STATE.title() else {
            return false;
        };
        if !ui.is_visible(&PAGE_TITLE).await {
            return false;
        }
        match ui.within(ui.capped(TimeoutBudget::PROBE)).read_text(&PAGE_TITLE).await {
            Ok(text) if text == expected => {}
            _ => return false,
        }
        match ui.current_url().await {
            Ok(url) => path_segment(&url) == Self::STATE.path_segment(),
            Err(_) => false,
        }
    }

    async fn title_text(&self) -> Result<String> {
        self.ui().read_text(&PAGE_TITLE).await
    }
}

/// Cart badge in the primary header
pub(crate) async fn badge_count(ui: &Interactor) -> Result<usize> {
    let brief = ui.within(ui.capped(TimeoutBudget::BRIEF));
    if !brief.is_visible(&CART_BADGE).await {
        return Ok(0);
    }
    match brief.read_text(&CART_BADGE).await {
        Ok(text) => parse_badge(&text),
        // the badge disappeared between the probe and the read
        Err(e) if e.is_sync_failure() => Ok(0),
        Err(e) => Err(e),
    }
}

/// Page objects bound to one session and one storefront
#[derive(Clone)]
pub struct Storefront {
    ui: Interactor,
    base_url: Url,
}

impl Storefront {
    pub fn new(session: Arc<dyn Session>, config: &Config) -> Self {
        let engine = WaitEngine::new(config.poll_interval);
        Self {
            ui: Interactor::with_engine(session, engine, config.default_timeout),
            base_url: config.base_url.clone(),
        }
    }

    pub fn ui(&self) -> &Interactor {
        &self.ui
    }

    pub async fn current_state(&self) -> Result<Option<PageState>> {
        current_state(&self.ui).await
    }

    pub fn login(&self) -> LoginPage {
        LoginPage::new(self.ui.clone(), self.base_url.clone())
    }

    pub fn inventory(&self) -> InventoryPage {
        InventoryPage::new(self.ui.clone())
    }

    pub fn cart(&self) -> CartPage {
        CartPage::new(self.ui.clone())
    }

    pub fn checkout_info(&self) -> CheckoutInfoPage {
        CheckoutInfoPage::new(self.ui.clone())
    }

    pub fn checkout_overview(&self) -> CheckoutOverviewPage {
        CheckoutOverviewPage::new(self.ui.clone())
    }

    pub fn checkout_complete(&self) -> CheckoutCompletePage {
        CheckoutCompletePage::new(self.ui.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("https://www.saucedemo.com/"), "");
        assert_eq!(path_segment("https://www.saucedemo.com/inventory.html"), "inventory.html");
        assert_eq!(path_segment("https://www.saucedemo.com/cart.html?x=1#top"), "cart.html");
        assert_eq!(path_segment("/checkout-step-two.html"), "checkout-step-two.html");
    }

    #[test]
    fn test_detect_by_title_first() {
        assert_eq!(
            PageState::detect("https://www.saucedemo.com/inventory.html", Some("Your Cart")),
            Some(PageState::Cart)
        );
        assert_eq!(
            PageState::detect("https://www.saucedemo.com/x", Some("Checkout: Complete!")),
            Some(PageState::CheckoutComplete)
        );
    }

    #[test]
    fn test_detect_by_path() {
        assert_eq!(
            PageState::detect("https://www.saucedemo.com/", None),
            Some(PageState::Login)
        );
        assert_eq!(
            PageState::detect("https://www.saucedemo.com/checkout-step-one.html", Some("")),
            Some(PageState::CheckoutInfo)
        );
        assert_eq!(PageState::detect("https://www.saucedemo.com/about.html", None), None);
    }

    #[test]
    fn test_titles_are_exact() {
        assert_eq!(PageState::Inventory.title(), Some("Products"));
        assert_eq!(PageState::CheckoutOverview.title(), Some("Checkout: Overview"));
        assert_eq!(PageState::Login.title(), None);
    }

    #[test]
    fn test_every_state_is_a_source_or_target() {
        let all = [
            Transition::SubmitLogin,
            Transition::AddItem,
            Transition::RemoveItem,
            Transition::GoToCart,
            Transition::Logout,
            Transition::RemoveFromCart,
            Transition::ProceedToCheckout,
            Transition::ContinueShopping,
            Transition::ContinueCheckout,
            Transition::CancelCheckout,
            Transition::Finish,
            Transition::CancelOverview,
            Transition::BackHome,
        ];
        for state in PageState::ALL {
            assert!(all.iter().any(|t| t.sources().contains(&state)), "{} has no exit", state);
            assert!(all.iter().any(|t| t.targets().contains(&state)), "{} unreachable", state);
        }
    }

    #[test]
    fn test_checkout_transitions() {
        assert_eq!(Transition::Finish.sources(), &[PageState::CheckoutOverview]);
        assert_eq!(Transition::BackHome.targets(), &[PageState::Inventory]);
        assert_eq!(Transition::CancelCheckout.targets(), &[PageState::Cart]);
    }
}

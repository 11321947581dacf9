//! The storefront regression suite as runnable scenarios.
//!
//! Each scenario drives a fresh session through the page objects and fails
//! with [`E2eError::Assertion`] when the storefront misbehaves. Scenarios
//! that touch the cart leave it empty again so they can share a browser
//! profile.

use crate::config::Config;
use crate::error::{E2eError, Result};
use crate::pages::{CheckoutInfo, PageObject, PageState, Storefront};
use crate::session::Session;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub const BACKPACK: &str = "Sauce Labs Backpack";
pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
pub const ONESIE: &str = "Sauce Labs Onesie";

pub const ORDER_COMPLETE_MESSAGE: &str = "Thank you for your order!";
pub const LOCKED_OUT_MESSAGE: &str = "Sorry, this user has been locked out.";

/// Credentials the storefront must reject, with the error it must show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLogin {
    pub case: &'static str,
    /// `None` means the configured standard user
    pub username: Option<&'static str>,
    pub password: &'static str,
    pub expected_error: &'static str,
}

pub const INVALID_LOGINS: [InvalidLogin; 4] = [
    InvalidLogin {
        case: "wrong-user",
        username: Some("wronguser"),
        password: "secretsauce",
        expected_error: "Username and password do not match",
    },
    InvalidLogin {
        case: "wrong-password",
        username: None,
        password: "wrongpassword",
        expected_error: "Username and password do not match",
    },
    InvalidLogin {
        case: "empty-user",
        username: Some(""),
        password: "secretsauce",
        expected_error: "Username is required",
    },
    InvalidLogin {
        case: "empty-password",
        username: None,
        password: "",
        expected_error: "Password is required",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    SuccessfulLogin,
    LockedOutLogin,
    InvalidLogin(InvalidLogin),
    CartAddRemove,
    CheckoutValidation,
    Purchase,
}

impl Scenario {
    pub fn all() -> Vec<Scenario> {
        let mut all = vec![Scenario::SuccessfulLogin, Scenario::LockedOutLogin];
        all.extend(INVALID_LOGINS.iter().copied().map(Scenario::InvalidLogin));
        all.extend([
            Scenario::CartAddRemove,
            Scenario::CheckoutValidation,
            Scenario::Purchase,
        ]);
        all
    }

    /// Family name shared by parametrized cases
    pub fn family(&self) -> &'static str {
        match self {
            Scenario::SuccessfulLogin => "successful-login",
            Scenario::LockedOutLogin => "locked-out-login",
            Scenario::InvalidLogin(_) => "invalid-login",
            Scenario::CartAddRemove => "cart-add-remove",
            Scenario::CheckoutValidation => "checkout-validation",
            Scenario::Purchase => "purchase",
        }
    }

    pub fn name(&self) -> String {
        match self {
            Scenario::InvalidLogin(login) => format!("{}[{}]", self.family(), login.case),
            _ => self.family().to_string(),
        }
    }

    /// Scenarios selected by `name`: a family name selects every case
    pub fn matching(name: &str) -> Vec<Scenario> {
        Self::all()
            .into_iter()
            .filter(|s| s.family() == name || s.name() == name)
            .collect()
    }

    pub async fn run(&self, session: Arc<dyn Session>, config: &Config) -> Result<()> {
        let shop = Storefront::new(session, config);
        info!("Running scenario {}", self);
        match self {
            Scenario::SuccessfulLogin => successful_login(&shop, config).await,
            Scenario::LockedOutLogin => locked_out_login(&shop, config).await,
            Scenario::InvalidLogin(login) => invalid_login(&shop, config, login).await,
            Scenario::CartAddRemove => cart_add_remove(&shop, config).await,
            Scenario::CheckoutValidation => checkout_validation(&shop, config).await,
            Scenario::Purchase => purchase(&shop, config).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message()))
    }
}

fn check_eq<T: PartialEq + fmt::Debug>(actual: T, expected: T, what: &str) -> Result<()> {
    check(actual == expected, || {
        format!("{}: expected {:?}, got {:?}", what, expected, actual)
    })
}

async fn login_as_standard(shop: &Storefront, config: &Config) -> Result<()> {
    let creds = &config.standard;
    shop.login().login(&creds.username, &creds.password).await?;
    check(shop.inventory().is_displayed().await, || {
        format!("login as {} did not reach the inventory page", creds.username)
    })
}

/// Login failed visibly: an error containing `expected` and no redirect
async fn expect_rejected_login(shop: &Storefront, expected: &str) -> Result<()> {
    let message = shop.login().error_message().await?;
    let message = message.ok_or_else(|| E2eError::assertion("no login error message displayed"))?;
    check(message.contains(expected), || {
        format!("login error {:?} does not contain {:?}", message, expected)
    })?;
    let url = shop.ui().current_url().await?;
    check(!url.contains(PageState::Inventory.path_segment()), || {
        format!("rejected login still navigated to {}", url)
    })
}

async fn successful_login(shop: &Storefront, config: &Config) -> Result<()> {
    login_as_standard(shop, config).await?;
    let count = shop.inventory().item_count().await?;
    check(count > 0, || "no products listed after login".to_string())
}

async fn locked_out_login(shop: &Storefront, config: &Config) -> Result<()> {
    let creds = &config.locked_out;
    shop.login().login(&creds.username, &creds.password).await?;
    expect_rejected_login(shop, LOCKED_OUT_MESSAGE).await
}

async fn invalid_login(shop: &Storefront, config: &Config, case: &InvalidLogin) -> Result<()> {
    let username = case.username.unwrap_or(&config.standard.username);
    shop.login().login(username, case.password).await?;
    expect_rejected_login(shop, case.expected_error).await
}

async fn cart_add_remove(shop: &Storefront, config: &Config) -> Result<()> {
    login_as_standard(shop, config).await?;
    let inventory = shop.inventory();

    for name in [BACKPACK, BIKE_LIGHT, ONESIE] {
        inventory.add_item(name).await?;
    }
    check_eq(inventory.badge_count().await?, 3, "badge after three adds")?;

    inventory.remove_item(BIKE_LIGHT).await?;
    check_eq(inventory.badge_count().await?, 2, "badge after removing one")?;

    inventory.go_to_cart().await?;
    let cart = shop.cart();
    check(cart.is_displayed().await, || "cart page not displayed".to_string())?;
    check_eq(cart.item_names().await?, vec![BACKPACK.to_string(), ONESIE.to_string()], "cart items")?;

    cart.remove_item(BACKPACK).await?;
    check_eq(cart.badge_count().await?, 1, "badge after removing from cart")?;
    check_eq(cart.item_names().await?, vec![ONESIE.to_string()], "cart items")?;

    cart.remove_item(ONESIE).await?;
    check_eq(cart.badge_count().await?, 0, "badge with an empty cart")?;

    cart.continue_shopping().await?;
    check(inventory.is_displayed().await, || "continue shopping did not return to inventory".to_string())
}

async fn checkout_validation(shop: &Storefront, config: &Config) -> Result<()> {
    login_as_standard(shop, config).await?;
    let inventory = shop.inventory();
    inventory.add_item(BACKPACK).await?;
    inventory.go_to_cart().await?;
    shop.cart().proceed_to_checkout().await?;

    let form = shop.checkout_info();
    let cases = [
        (CheckoutInfo::new("", "User", "12345"), "First Name is required"),
        (CheckoutInfo::new("Test", "", "12345"), "Last Name is required"),
        (CheckoutInfo::new("Test", "User", ""), "Postal Code is required"),
    ];
    for (info, expected) in &cases {
        form.fill(info).await?;
        form.continue_checkout().await?;
        check(form.is_displayed().await, || {
            format!("checkout advanced with {:?}", info)
        })?;
        let error = form.error_message().await?;
        check(error.contains(expected), || {
            format!("checkout error {:?} does not contain {:?}", error, expected)
        })?;
    }

    form.fill(&CheckoutInfo::new("Test", "User", "12345")).await?;
    form.continue_checkout().await?;
    let overview = shop.checkout_overview();
    check(overview.is_displayed().await, || "valid details did not reach the overview".to_string())?;

    overview.cancel().await?;
    inventory.remove_item(BACKPACK).await?;
    check_eq(inventory.badge_count().await?, 0, "badge after cleanup")
}

/// Login, buy the backpack, and return to an empty inventory
async fn purchase(shop: &Storefront, config: &Config) -> Result<()> {
    login_as_standard(shop, config).await?;
    let inventory = shop.inventory();

    inventory.add_item(BACKPACK).await?;
    check_eq(inventory.badge_count().await?, 1, "badge after adding the backpack")?;

    inventory.go_to_cart().await?;
    let cart = shop.cart();
    check_eq(cart.item_names().await?, vec![BACKPACK.to_string()], "cart items")?;
    cart.proceed_to_checkout().await?;

    let form = shop.checkout_info();
    form.fill(&CheckoutInfo::new("Test", "User", "12345")).await?;
    form.continue_checkout().await?;

    let overview = shop.checkout_overview();
    check(overview.is_displayed().await, || "checkout overview not displayed".to_string())?;
    let items = overview.item_names().await?;
    check(items.iter().any(|n| n == BACKPACK), || {
        format!("overview lists {:?} without the backpack", items)
    })?;
    let (subtotal, tax, total) = (overview.subtotal().await?, overview.tax().await?, overview.total().await?);
    check((subtotal + tax - total).abs() < 0.005, || {
        format!("total {} is not subtotal {} plus tax {}", total, subtotal, tax)
    })?;
    overview.finish().await?;

    let complete = shop.checkout_complete();
    let header = complete.header_message().await?;
    check(header.contains(ORDER_COMPLETE_MESSAGE), || {
        format!("completion header {:?}", header)
    })?;
    complete.back_home().await?;

    check(inventory.is_displayed().await, || "back home did not return to inventory".to_string())?;
    check_eq(inventory.badge_count().await?, 0, "badge after the order")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names() {
        let names: Vec<String> = Scenario::all().iter().map(Scenario::name).collect();
        assert_eq!(
            names,
            vec![
                "successful-login",
                "locked-out-login",
                "invalid-login[wrong-user]",
                "invalid-login[wrong-password]",
                "invalid-login[empty-user]",
                "invalid-login[empty-password]",
                "cart-add-remove",
                "checkout-validation",
                "purchase",
            ]
        );
    }

    #[test]
    fn test_matching_by_family_and_case() {
        assert_eq!(Scenario::matching("invalid-login").len(), 4);
        assert_eq!(
            Scenario::matching("invalid-login[empty-user]"),
            vec![Scenario::InvalidLogin(INVALID_LOGINS[2])]
        );
        assert_eq!(Scenario::matching("purchase"), vec![Scenario::Purchase]);
        assert!(Scenario::matching("refund").is_empty());
    }

    #[test]
    fn test_check_eq_message() {
        let err = check_eq(2, 3, "badge").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: badge: expected 3, got 2");
    }
}

//! In-memory storefront implementing [`Session`].
//!
//! Renders the six pages of the demo shop as flat element lists, applies the
//! same validation rules and error texts, and invalidates handles whenever
//! the rendered structure changes. Used to exercise the wait engine and the
//! page objects without a browser.

use crate::error::{E2eError, Result};
use crate::locator::{By, Locator};
use crate::pages::{path_segment, PageState, SortOrder};
use crate::session::{ElementHandle, Session};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

const ACCEPTED_USERS: [&str; 6] = [
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];
const ACCEPTED_PASSWORD: &str = "secret_sauce";
const LOCKED_OUT_USER: &str = "locked_out_user";
const CHECKOUT_ERROR_XPATH: &str = "//div[contains(@class, 'error-message-container')]/h3";

/// PNG signature only
const FAKE_PNG: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// A product as the mock renders it
#[derive(Debug, Clone, PartialEq)]
pub struct MockProduct {
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    /// Suffix of the add/remove button ids
    pub id_slug: String,
}

impl MockProduct {
    pub fn new(name: &str, description: &str, price_cents: u64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            price_cents,
            id_slug: name.to_lowercase().replace(' ', "-"),
        }
    }

    /// Render the buttons under an id that does not follow the name
    pub fn with_id_slug(mut self, slug: &str) -> Self {
        self.id_slug = slug.to_string();
        self
    }
}

pub fn default_catalog() -> Vec<MockProduct> {
    vec![
        MockProduct::new("Sauce Labs Backpack", "carry.allTheThings() with the sleek, streamlined Sly Pack.", 2999),
        MockProduct::new("Sauce Labs Bike Light", "A red light isn't the desired state in testing but it sure helps when riding your bike at night.", 999),
        MockProduct::new("Sauce Labs Bolt T-Shirt", "Get your testing superhero on with the Sauce Labs bolt T-shirt.", 1599),
        MockProduct::new("Sauce Labs Fleece Jacket", "It's not every day that you come across a midweight quarter-zip fleece jacket.", 4999),
        MockProduct::new("Sauce Labs Onesie", "Rib snap infant onesie for the junior automation engineer in development.", 799),
        MockProduct::new("Test.allTheThings() T-Shirt (Red)", "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard.", 1599),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Login,
    Add(usize),
    Remove(usize),
    OpenCart,
    Checkout,
    ContinueShopping,
    ContinueCheckout,
    CancelCheckout,
    Finish,
    CancelOverview,
    BackHome,
    OpenMenu,
    Logout,
}

#[derive(Debug, Clone)]
struct MockElement {
    tag: &'static str,
    id: Option<String>,
    classes: Vec<&'static str>,
    data_test: Option<&'static str>,
    xpath: Option<&'static str>,
    text: String,
    visible: bool,
    options: Vec<(&'static str, &'static str)>,
    action: Action,
}

impl MockElement {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            data_test: None,
            xpath: None,
            text: String::new(),
            visible: true,
            options: Vec::new(),
            action: Action::None,
        }
    }

    fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn data_test(mut self, value: &'static str) -> Self {
        self.data_test = Some(value);
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    fn attr(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => (!self.classes.is_empty()).then(|| self.classes.join(" ")),
            "data-test" => self.data_test.map(str::to_string),
            _ => None,
        }
    }

    fn matches(&self, locator: &Locator) -> bool {
        let value = locator.value.as_ref();
        match locator.strategy {
            By::Id => self.id.as_deref() == Some(value),
            By::ClassName => self.classes.contains(&value),
            By::Css => self.matches_css(value),
            By::Xpath => self.xpath == Some(value),
            By::Name => self.attr("name").as_deref() == Some(value),
            By::TagName => self.tag == value,
            By::LinkText => self.tag == "a" && self.text == value,
        }
    }

    /// `#id`, `.class`, `tag`, `[attr='v']` and `tag[attr='v']`
    fn matches_css(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.id.as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.classes.contains(&class);
        }
        let (tag, attr) = match selector.split_once('[') {
            Some((tag, rest)) => (tag, rest.strip_suffix(']')),
            None => (selector, None),
        };
        if !tag.is_empty() && tag != self.tag {
            return false;
        }
        match attr.and_then(|a| a.split_once('=')) {
            Some((name, wanted)) => {
                let wanted = wanted.trim_matches(|c| c == '\'' || c == '"');
                self.attr(name).as_deref() == Some(wanted)
            }
            None => attr.is_none(),
        }
    }
}

struct MockState {
    page: Option<PageState>,
    user: Option<String>,
    cart: Vec<usize>,
    sort: SortOrder,
    menu_open: bool,
    login_error: Option<String>,
    checkout_error: Option<String>,
    fields: HashMap<String, String>,
    disabled: HashSet<String>,
    generation: u64,
    rendered_at: Instant,
    closed: bool,
}

impl MockState {
    fn bump(&mut self) {
        self.generation += 1;
    }

    fn go(&mut self, page: PageState) {
        debug!("Mock storefront -> {}", page);
        self.page = Some(page);
        self.menu_open = false;
        self.rendered_at = Instant::now();
        self.bump();
    }

    fn field(&self, id: &str) -> &str {
        self.fields.get(id).map(String::as_str).unwrap_or_default()
    }
}

/// In-memory storefront session
pub struct MockStorefront {
    base_url: Url,
    catalog: Vec<MockProduct>,
    render_delay: Duration,
    state: Mutex<MockState>,
}

impl MockStorefront {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            catalog: default_catalog(),
            render_delay: Duration::ZERO,
            state: Mutex::new(MockState {
                page: None,
                user: None,
                cart: Vec::new(),
                sort: SortOrder::NameAsc,
                menu_open: false,
                login_error: None,
                checkout_error: None,
                fields: HashMap::new(),
                disabled: HashSet::new(),
                generation: 0,
                rendered_at: Instant::now(),
                closed: false,
            }),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<MockProduct>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Pages render nothing until `delay` after each page change
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Render the element with this id disabled
    pub async fn disable(&self, id: &str) {
        self.state.lock().await.disabled.insert(id.to_string());
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    pub async fn page(&self) -> Option<PageState> {
        self.state.lock().await.page
    }

    /// Names in the cart, in the order they were added
    pub async fn cart_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .cart
            .iter()
            .map(|&i| self.catalog[i].name.clone())
            .collect()
    }

    fn url_for(&self, page: PageState) -> Result<Url> {
        Ok(self.base_url.join(page.path_segment())?)
    }

    fn sorted_catalog(&self, sort: SortOrder) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.catalog.len()).collect();
        match sort {
            SortOrder::NameAsc => order.sort_by(|&a, &b| self.catalog[a].name.cmp(&self.catalog[b].name)),
            SortOrder::NameDesc => order.sort_by(|&a, &b| self.catalog[b].name.cmp(&self.catalog[a].name)),
            SortOrder::PriceAsc => order.sort_by_key(|&i| self.catalog[i].price_cents),
            SortOrder::PriceDesc => order.sort_by_key(|&i| std::cmp::Reverse(self.catalog[i].price_cents)),
        }
        order
    }

    fn render(&self, state: &MockState) -> Vec<MockElement> {
        let Some(page) = state.page else {
            return Vec::new();
        };
        if state.rendered_at.elapsed() < self.render_delay {
            return Vec::new();
        }

        let mut out = Vec::new();
        if page != PageState::Login {
            self.render_header(state, page, &mut out);
        }

        match page {
            PageState::Login => {
                out.push(MockElement::new("input").id("user-name"));
                out.push(MockElement::new("input").id("password"));
                out.push(MockElement::new("input").id("login-button").action(Action::Login));
                if let Some(error) = &state.login_error {
                    out.push(MockElement::new("h3").data_test("error").text(error.clone()));
                }
            }
            PageState::Inventory => {
                let mut select = MockElement::new("select").class("product_sort_container");
                select.options = [SortOrder::NameAsc, SortOrder::NameDesc, SortOrder::PriceAsc, SortOrder::PriceDesc]
                    .iter()
                    .map(|o| (o.value(), o.label()))
                    .collect();
                out.push(select);
                out.push(MockElement::new("span").class("active_option").text(state.sort.label()));

                for i in self.sorted_catalog(state.sort) {
                    let product = &self.catalog[i];
                    out.push(MockElement::new("div").class("inventory_item"));
                    out.push(MockElement::new("div").class("inventory_item_name").text(product.name.clone()));
                    out.push(MockElement::new("div").class("inventory_item_desc").text(product.description.clone()));
                    out.push(MockElement::new("div").class("inventory_item_price").text(dollars(product.price_cents)));
                    out.push(if state.cart.contains(&i) {
                        MockElement::new("button")
                            .id(format!("remove-{}", product.id_slug))
                            .text("Remove")
                            .action(Action::Remove(i))
                    } else {
                        MockElement::new("button")
                            .id(format!("add-to-cart-{}", product.id_slug))
                            .text("Add to cart")
                            .action(Action::Add(i))
                    });
                }
            }
            PageState::Cart => {
                for &i in &state.cart {
                    let product = &self.catalog[i];
                    out.push(MockElement::new("div").class("cart_item"));
                    out.push(MockElement::new("div").class("inventory_item_name").text(product.name.clone()));
                    out.push(
                        MockElement::new("button")
                            .id(format!("remove-{}", product.id_slug))
                            .text("Remove")
                            .action(Action::Remove(i)),
                    );
                }
                out.push(MockElement::new("button").id("continue-shopping").action(Action::ContinueShopping));
                out.push(MockElement::new("button").id("checkout").action(Action::Checkout));
            }
            PageState::CheckoutInfo => {
                out.push(MockElement::new("input").id("first-name"));
                out.push(MockElement::new("input").id("last-name"));
                out.push(MockElement::new("input").id("postal-code"));
                if let Some(error) = &state.checkout_error {
                    out.push(MockElement::new("div").class("error-message-container").class("error"));
                    let mut banner = MockElement::new("h3").data_test("error").text(error.clone());
                    banner.xpath = Some(CHECKOUT_ERROR_XPATH);
                    out.push(banner);
                }
                out.push(MockElement::new("button").id("cancel").action(Action::CancelCheckout));
                out.push(MockElement::new("input").id("continue").action(Action::ContinueCheckout));
            }
            PageState::CheckoutOverview => {
                let subtotal: u64 = state.cart.iter().map(|&i| self.catalog[i].price_cents).sum();
                let tax = (subtotal * 8 + 50) / 100;
                for &i in &state.cart {
                    out.push(MockElement::new("div").class("cart_item"));
                    out.push(MockElement::new("div").class("inventory_item_name").text(self.catalog[i].name.clone()));
                }
                out.push(MockElement::new("div").class("summary_info_label").text("Payment Information:"));
                out.push(MockElement::new("div").class("summary_value_label").data_test("payment-info-value").text("SauceCard #31337"));
                out.push(MockElement::new("div").class("summary_info_label").text("Shipping Information:"));
                out.push(MockElement::new("div").class("summary_value_label").data_test("shipping-info-value").text("Free Pony Express Delivery!"));
                out.push(MockElement::new("div").class("summary_subtotal_label").text(format!("Item total: {}", dollars(subtotal))));
                out.push(MockElement::new("div").class("summary_tax_label").text(format!("Tax: {}", dollars(tax))));
                out.push(MockElement::new("div").class("summary_total_label").text(format!("Total: {}", dollars(subtotal + tax))));
                out.push(MockElement::new("button").id("cancel").action(Action::CancelOverview));
                out.push(MockElement::new("button").id("finish").action(Action::Finish));
            }
            PageState::CheckoutComplete => {
                out.push(MockElement::new("h2").class("complete-header").text("Thank you for your order!"));
                out.push(MockElement::new("button").id("back-to-products").action(Action::BackHome));
            }
        }
        out
    }

    fn render_header(&self, state: &MockState, page: PageState, out: &mut Vec<MockElement>) {
        out.push(MockElement::new("button").id("react-burger-menu-btn").action(Action::OpenMenu));
        let mut logout = MockElement::new("a")
            .id("logout_sidebar_link")
            .text("Logout")
            .action(Action::Logout);
        logout.visible = state.menu_open;
        out.push(logout);
        out.push(
            MockElement::new("div")
                .id("shopping_cart_container")
                .class("shopping_cart_container")
                .action(Action::OpenCart),
        );
        if !state.cart.is_empty() {
            out.push(MockElement::new("span").class("shopping_cart_badge").text(state.cart.len().to_string()));
        }
        if let Some(title) = page.title() {
            out.push(MockElement::new("span").class("title").text(title));
        }
    }

    /// Resolve a handle against the current render
    fn resolve(&self, state: &MockState, handle: &ElementHandle) -> Result<MockElement> {
        if state.closed {
            return Err(E2eError::cdp_connection("session closed"));
        }
        let stale = || E2eError::stale_element(format!("handle {}", handle.id));
        let (generation, index) = handle.id.split_once(':').ok_or_else(stale)?;
        if generation.parse::<u64>().ok() != Some(state.generation) {
            return Err(stale());
        }
        let index: usize = index.parse().map_err(|_| stale())?;
        self.render(state).into_iter().nth(index).ok_or_else(stale)
    }

    fn apply(&self, state: &mut MockState, action: Action) -> Result<()> {
        match action {
            Action::None => return Ok(()),
            Action::Login => self.submit_login(state),
            Action::Add(i) => {
                if !state.cart.contains(&i) {
                    state.cart.push(i);
                }
            }
            Action::Remove(i) => state.cart.retain(|&c| c != i),
            Action::OpenCart => state.go(PageState::Cart),
            Action::Checkout => {
                state.checkout_error = None;
                for id in ["first-name", "last-name", "postal-code"] {
                    state.fields.remove(id);
                }
                state.go(PageState::CheckoutInfo);
            }
            Action::ContinueShopping | Action::CancelOverview | Action::BackHome => {
                state.go(PageState::Inventory)
            }
            Action::ContinueCheckout => {
                let missing = [
                    ("first-name", "Error: First Name is required"),
                    ("last-name", "Error: Last Name is required"),
                    ("postal-code", "Error: Postal Code is required"),
                ]
                .into_iter()
                .find(|(id, _)| state.field(id).is_empty());
                match missing {
                    Some((_, message)) => state.checkout_error = Some(message.to_string()),
                    None => {
                        state.checkout_error = None;
                        state.go(PageState::CheckoutOverview);
                    }
                }
            }
            Action::CancelCheckout => state.go(PageState::Cart),
            Action::Finish => {
                state.cart.clear();
                state.go(PageState::CheckoutComplete);
            }
            Action::OpenMenu => state.menu_open = true,
            Action::Logout => {
                state.user = None;
                state.go(PageState::Login);
            }
        }
        state.bump();
        Ok(())
    }

    fn submit_login(&self, state: &mut MockState) {
        let username = state.field("user-name").to_string();
        let password = state.field("password").to_string();

        let error = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if !ACCEPTED_USERS.contains(&username.as_str()) || password != ACCEPTED_PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if username == LOCKED_OUT_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else {
            None
        };

        match error {
            Some(message) => state.login_error = Some(message.to_string()),
            None => {
                state.login_error = None;
                state.fields.clear();
                state.user = Some(username);
                state.go(PageState::Inventory);
            }
        }
    }
}

fn dollars(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[async_trait]
impl Session for MockStorefront {
    async fn navigate(&self, url: &str) -> Result<()> {
        let url = Url::parse(url)?;
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(E2eError::cdp_connection("session closed"));
        }
        let segment = path_segment(url.as_str());
        let target = PageState::ALL
            .into_iter()
            .find(|p| p.path_segment() == segment)
            .unwrap_or(PageState::Login);

        if target != PageState::Login && state.user.is_none() {
            state.login_error = Some(format!(
                "Epic sadface: You can only access '/{}' when you are logged in.",
                segment
            ));
            state.go(PageState::Login);
        } else {
            if target == PageState::Login {
                state.login_error = None;
                state.fields.clear();
            }
            state.go(target);
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.state.lock().await;
        match state.page {
            Some(page) => Ok(self.url_for(page)?.to_string()),
            None => Ok("about:blank".to_string()),
        }
    }

    async fn title(&self) -> Result<String> {
        Ok("Swag Labs".to_string())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let state = self.state.lock().await;
        if state.closed {
            return Err(E2eError::cdp_connection("session closed"));
        }
        let generation = state.generation;
        Ok(self
            .render(&state)
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(locator))
            .map(|(i, _)| ElementHandle::new(format!("{}:{}", generation, i)))
            .collect())
    }

    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(self.resolve(&state, handle)?.visible)
    }

    async fn is_enabled(&self, handle: &ElementHandle) -> Result<bool> {
        let state = self.state.lock().await;
        let element = self.resolve(&state, handle)?;
        Ok(element
            .id
            .as_ref()
            .map_or(true, |id| !state.disabled.contains(id)))
    }

    async fn text(&self, handle: &ElementHandle) -> Result<String> {
        let state = self.state.lock().await;
        let element = self.resolve(&state, handle)?;
        if !element.visible {
            return Ok(String::new());
        }
        Ok(element.text)
    }

    async fn attribute(&self, handle: &ElementHandle, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        let element = self.resolve(&state, handle)?;
        if name == "value" && element.tag == "input" {
            let id = element.id.unwrap_or_default();
            return Ok(Some(state.field(&id).to_string()));
        }
        if name == "value" && element.tag == "select" {
            return Ok(Some(state.sort.value().to_string()));
        }
        Ok(element.attr(name))
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        let element = self.resolve(&state, handle)?;
        if !element.visible {
            return Err(E2eError::invalid_operation(format!(
                "element {} is not interactable",
                handle.id
            )));
        }
        self.apply(&mut state, element.action)
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        let id = input_id(self.resolve(&state, handle)?)?;
        state.fields.insert(id, String::new());
        Ok(())
    }

    async fn send_keys(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let id = input_id(self.resolve(&state, handle)?)?;
        state.fields.entry(id).or_default().push_str(text);
        Ok(())
    }

    async fn select_by_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        let value = {
            let state = self.state.lock().await;
            let element = self.resolve(&state, handle)?;
            element
                .options
                .iter()
                .find(|(_, label)| *label == text)
                .map(|(value, _)| *value)
                .ok_or_else(|| {
                    E2eError::invalid_operation(format!("no option with visible text {:?}", text))
                })?
        };
        self.select_by_value(handle, value).await
    }

    async fn select_by_value(&self, handle: &ElementHandle, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let element = self.resolve(&state, handle)?;
        if element.tag != "select" {
            return Err(E2eError::invalid_operation("element is not a select"));
        }
        let order = [SortOrder::NameAsc, SortOrder::NameDesc, SortOrder::PriceAsc, SortOrder::PriceDesc]
            .into_iter()
            .find(|o| o.value() == value)
            .ok_or_else(|| E2eError::invalid_operation(format!("no option with value {:?}", value)))?;
        state.sort = order;
        state.bump();
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(FAKE_PNG.to_vec())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.bump();
        Ok(())
    }
}

fn input_id(element: MockElement) -> Result<String> {
    match (element.tag, element.id) {
        ("input", Some(id)) => Ok(id),
        _ => Err(E2eError::invalid_operation("element does not accept text")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> MockStorefront {
        MockStorefront::new(Url::parse("https://shop.test/").unwrap())
    }

    #[test]
    fn test_css_subset() {
        let banner = MockElement::new("h3").data_test("error");
        assert!(banner.matches(&Locator::css("h3[data-test='error']")));
        assert!(banner.matches(&Locator::css("[data-test=\"error\"]")));
        assert!(!banner.matches(&Locator::css("div[data-test='error']")));

        let link = MockElement::new("div").id("shopping_cart_container").class("shopping_cart_container");
        assert!(link.matches(&Locator::css("#shopping_cart_container")));
        assert!(link.matches(&Locator::css(".shopping_cart_container")));
        assert!(link.matches(&Locator::css("div")));
    }

    #[test]
    fn test_dollars() {
        assert_eq!(dollars(2999), "$29.99");
        assert_eq!(dollars(240), "$2.40");
        assert_eq!(dollars(5), "$0.05");
    }

    #[tokio::test]
    async fn test_handles_go_stale_on_rerender() {
        let shop = shop();
        shop.navigate("https://shop.test/").await.unwrap();

        let button = shop.query(&Locator::id("login-button")).await.unwrap();
        assert_eq!(button.len(), 1);
        assert!(shop.is_visible(&button[0]).await.unwrap());

        shop.navigate("https://shop.test/").await.unwrap();
        assert!(matches!(
            shop.is_visible(&button[0]).await,
            Err(E2eError::StaleElement(_))
        ));
    }

    #[tokio::test]
    async fn test_guarded_pages_redirect_to_login() {
        let shop = shop();
        shop.navigate("https://shop.test/inventory.html").await.unwrap();
        assert_eq!(shop.page().await, Some(PageState::Login));
        assert_eq!(shop.current_url().await.unwrap(), "https://shop.test/");
    }

    #[tokio::test]
    async fn test_closed_session_rejects_queries() {
        let shop = shop();
        shop.close().await.unwrap();
        assert!(shop.is_closed().await);
        assert!(shop.query(&Locator::id("user-name")).await.is_err());
    }
}

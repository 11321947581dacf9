use super::{ensure_state, path_segment, PageObject, PageState, Transition};
use crate::error::Result;
use crate::interaction::Interactor;
use crate::locator::{By, Locator};
use async_trait::async_trait;
use tracing::info;
use url::Url;

const USERNAME_INPUT: Locator = Locator::from_static(By::Id, "user-name");
const PASSWORD_INPUT: Locator = Locator::from_static(By::Id, "password");
const LOGIN_BUTTON: Locator = Locator::from_static(By::Id, "login-button");
const ERROR_MESSAGE: Locator = Locator::from_static(By::Css, "h3[data-test='error']");

pub struct LoginPage {
    ui: Interactor,
    base_url: Url,
}

impl LoginPage {
    pub fn new(ui: Interactor, base_url: Url) -> Self {
        Self { ui, base_url }
    }

    pub async fn open(&self) -> Result<()> {
        self.ui.navigate(self.base_url.as_str()).await
    }

    pub async fn enter_username(&self, username: &str) -> Result<()> {
        self.ui.type_text(&USERNAME_INPUT, username).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.ui.type_text(&PASSWORD_INPUT, password).await
    }

    pub async fn submit(&self) -> Result<()> {
        ensure_state(&self.ui, Transition::SubmitLogin).await?;
        self.ui.click(&LOGIN_BUTTON).await
    }

    /// Open the login page and submit the credentials.
    ///
    /// Lands on Inventory on success; stays on Login with an error banner
    /// otherwise.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info!("Logging in as {:?}", username);
        self.open().await?;
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.submit().await
    }

    /// Text of the error banner, if one is shown
    pub async fn error_message(&self) -> Result<Option<String>> {
        if self.ui.is_visible(&ERROR_MESSAGE).await {
            return self.ui.read_text(&ERROR_MESSAGE).await.map(Some);
        }
        Ok(None)
    }
}

#[async_trait]
impl PageObject for LoginPage {
    const STATE: PageState = PageState::Login;

    fn ui(&self) -> &Interactor {
        &self.ui
    }

    async fn is_displayed(&self) -> bool {
        if !self.ui.is_visible(&LOGIN_BUTTON).await {
            return false;
        }
        match self.ui.current_url().await {
            Ok(url) => path_segment(&url) == Self::STATE.path_segment(),
            Err(_) => false,
        }
    }
}

use crate::error::{E2eError, Result};
use crate::locator::Locator;
use crate::session::{ElementHandle, Session};
use crate::wait::{TimeoutBudget, WaitEngine, Waited};
use std::sync::Arc;
use tracing::{debug, warn};

/// Safe high-level element operations.
///
/// Every operation synchronizes through the [`WaitEngine`] before touching
/// the DOM. Operations use the default budget (or the probe budget for
/// [`Interactor::is_visible`]) unless overridden with [`Interactor::within`].
#[derive(Clone)]
pub struct Interactor {
    session: Arc<dyn Session>,
    engine: WaitEngine,
    default_budget: TimeoutBudget,
    budget: Option<TimeoutBudget>,
}

impl Interactor {
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self::with_engine(session, WaitEngine::default(), TimeoutBudget::DEFAULT)
    }

    pub fn with_engine(
        session: Arc<dyn Session>,
        engine: WaitEngine,
        default_budget: TimeoutBudget,
    ) -> Self {
        Self {
            session,
            engine,
            default_budget,
            budget: None,
        }
    }

    /// A copy whose next operations use `budget` instead of their defaults
    pub fn within(&self, budget: TimeoutBudget) -> Self {
        Self {
            budget: Some(budget),
            ..self.clone()
        }
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    pub fn engine(&self) -> &WaitEngine {
        &self.engine
    }

    /// `budget`, but never longer than this interactor's default budget
    pub fn capped(&self, budget: TimeoutBudget) -> TimeoutBudget {
        budget.min(self.default_budget)
    }

    fn budget_or(&self, fallback: TimeoutBudget) -> TimeoutBudget {
        self.budget.unwrap_or(fallback)
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.session.navigate(url).await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.session.current_url().await
    }

    pub async fn page_title(&self) -> Result<String> {
        self.session.title().await
    }

    /// The first match, once visible. Fails with `ElementNotFound`.
    pub async fn find_one(&self, locator: &Locator) -> Result<ElementHandle> {
        let budget = self.budget_or(self.default_budget);
        match self.engine.visible(self.session(), locator, budget).await? {
            Waited::Ready(handle) => Ok(handle),
            Waited::TimedOut { .. } => Err(E2eError::ElementNotFound {
                locator: locator.clone(),
                timeout: budget.duration(),
            }),
        }
    }

    /// All matches in DOM order, or an empty list when none became visible
    pub async fn find_many(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let budget = self.budget_or(self.default_budget);
        let handles = self.engine.all_visible(self.session(), locator, budget).await?;
        if handles.is_empty() {
            warn!("No visible elements for {} within {:?}", locator, budget.duration());
        }
        Ok(handles)
    }

    /// Wait until clickable, then click. Fails with `NotClickable`.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let budget = self.budget_or(self.default_budget);
        match self.engine.clickable(self.session(), locator, budget).await? {
            Waited::Ready(handle) => {
                debug!("Clicking {}", locator);
                self.session.click(&handle).await
            }
            Waited::TimedOut { .. } => Err(E2eError::NotClickable {
                locator: locator.clone(),
                timeout: budget.duration(),
            }),
        }
    }

    /// Replace the element's content with `text`
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let handle = self.find_one(locator).await?;
        debug!("Typing {} chars into {}", text.chars().count(), locator);
        self.session.clear(&handle).await?;
        if !text.is_empty() {
            self.session.send_keys(&handle, text).await?;
        }
        Ok(())
    }

    pub async fn read_text(&self, locator: &Locator) -> Result<String> {
        let handle = self.find_one(locator).await?;
        self.session.text(&handle).await
    }

    /// Rendered text of every visible match, in DOM order
    pub async fn read_texts(&self, locator: &Locator) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        for handle in self.find_many(locator).await? {
            texts.push(self.session.text(&handle).await?);
        }
        Ok(texts)
    }

    pub async fn read_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let handle = self.find_one(locator).await?;
        self.session.attribute(&handle, name).await
    }

    /// Whether the element becomes visible within the probe budget (capped at
    /// the default budget).
    ///
    /// Never fails: absence, timeouts and driver errors all read as `false`.
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        let budget = self.budget_or(self.capped(TimeoutBudget::PROBE));
        match self.engine.visible(self.session(), locator, budget).await {
            Ok(waited) => waited.is_ready(),
            Err(e) => {
                debug!("Visibility probe for {} failed: {}", locator, e);
                false
            }
        }
    }

    pub async fn select_by_visible_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let handle = self.find_one(locator).await?;
        debug!("Selecting {:?} by text in {}", text, locator);
        self.session.select_by_text(&handle, text).await
    }

    pub async fn select_by_value(&self, locator: &Locator, value: &str) -> Result<()> {
        let handle = self.find_one(locator).await?;
        debug!("Selecting {:?} by value in {}", value, locator);
        self.session.select_by_value(&handle, value).await
    }
}

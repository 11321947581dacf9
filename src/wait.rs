//! Condition polling against the live DOM.
//!
//! Every synchronized operation goes through [`WaitEngine::poll`]: evaluate
//! the condition, and if it does not hold yet, sleep until the next poll or
//! the deadline, whichever comes first. Nothing here busy-spins.

use crate::error::{E2eError, Result};
use crate::locator::Locator;
use crate::session::{ElementHandle, Session};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, trace};

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum wait for one synchronized operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeoutBudget(Duration);

impl TimeoutBudget {
    /// Budget for required elements
    pub const DEFAULT: Self = Self(Duration::from_secs(10));
    /// Budget for probing optional elements such as error banners
    pub const PROBE: Self = Self(Duration::from_secs(2));
    /// Budget for probes where absence is the common case (cart badge)
    pub const BRIEF: Self = Self(Duration::from_secs(1));

    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub const fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for TimeoutBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Duration> for TimeoutBudget {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

/// Predicate over the remote DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// First match is rendered with a nonzero box and not hidden by style
    Visible(Locator),
    /// At least one match, and every match visible
    AllVisible(Locator),
    /// First match visible and enabled
    Clickable(Locator),
}

impl WaitCondition {
    pub fn locator(&self) -> &Locator {
        match self {
            Self::Visible(l) | Self::AllVisible(l) | Self::Clickable(l) => l,
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible(l) => write!(f, "visible({})", l),
            Self::AllVisible(l) => write!(f, "all-visible({})", l),
            Self::Clickable(l) => write!(f, "clickable({})", l),
        }
    }
}

/// Outcome of a wait: the condition held, or the budget ran out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waited<T> {
    Ready(T),
    TimedOut { waited: Duration },
}

impl<T> Waited<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Waited<U> {
        match self {
            Self::Ready(value) => Waited::Ready(f(value)),
            Self::TimedOut { waited } => Waited::TimedOut { waited },
        }
    }
}

/// Handles produced by a satisfied [`WaitCondition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    One(ElementHandle),
    Many(Vec<ElementHandle>),
}

#[derive(Debug, Clone, Copy)]
pub struct WaitEngine {
    poll_interval: Duration,
}

impl Default for WaitEngine {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl WaitEngine {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Evaluate `probe` until it yields a value or `budget` elapses.
    ///
    /// The probe is always evaluated at least once and once more at the
    /// deadline. `StaleElement` from a probe means the DOM re-rendered under
    /// it and counts as "not yet"; any other error ends the wait.
    pub async fn poll<T, F, Fut>(&self, budget: TimeoutBudget, mut probe: F) -> Result<Waited<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let start = Instant::now();
        let budget = budget.duration();

        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(Waited::Ready(value)),
                Ok(None) => {}
                Err(E2eError::StaleElement(handle)) => trace!("Stale {} while polling", handle),
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= budget {
                return Ok(Waited::TimedOut { waited: elapsed });
            }
            sleep(self.poll_interval.min(budget - elapsed)).await;
        }
    }

    /// Wait for `condition` on `session`
    pub async fn until(
        &self,
        session: &dyn Session,
        condition: &WaitCondition,
        budget: TimeoutBudget,
    ) -> Result<Waited<Found>> {
        debug!("Waiting for {} (budget {:?})", condition, budget.duration());

        let waited = match condition {
            WaitCondition::Visible(locator) => self
                .poll(budget, || probe_visible(session, locator))
                .await?
                .map(Found::One),
            WaitCondition::AllVisible(locator) => self
                .poll(budget, || probe_all_visible(session, locator))
                .await?
                .map(Found::Many),
            WaitCondition::Clickable(locator) => self
                .poll(budget, || probe_clickable(session, locator))
                .await?
                .map(Found::One),
        };

        if let Waited::TimedOut { waited } = &waited {
            debug!("{} not satisfied after {:?}", condition, waited);
        }
        Ok(waited)
    }

    pub async fn visible(
        &self,
        session: &dyn Session,
        locator: &Locator,
        budget: TimeoutBudget,
    ) -> Result<Waited<ElementHandle>> {
        self.poll(budget, || probe_visible(session, locator)).await
    }

    /// Every match visible. Timing out degrades to an empty list, which
    /// callers must read as "nothing found".
    pub async fn all_visible(
        &self,
        session: &dyn Session,
        locator: &Locator,
        budget: TimeoutBudget,
    ) -> Result<Vec<ElementHandle>> {
        Ok(self
            .poll(budget, || probe_all_visible(session, locator))
            .await?
            .ready()
            .unwrap_or_default())
    }

    pub async fn clickable(
        &self,
        session: &dyn Session,
        locator: &Locator,
        budget: TimeoutBudget,
    ) -> Result<Waited<ElementHandle>> {
        self.poll(budget, || probe_clickable(session, locator)).await
    }
}

async fn probe_visible(session: &dyn Session, locator: &Locator) -> Result<Option<ElementHandle>> {
    let Some(first) = session.query(locator).await?.into_iter().next() else {
        return Ok(None);
    };
    Ok(session.is_visible(&first).await?.then_some(first))
}

async fn probe_all_visible(
    session: &dyn Session,
    locator: &Locator,
) -> Result<Option<Vec<ElementHandle>>> {
    let handles = session.query(locator).await?;
    if handles.is_empty() {
        return Ok(None);
    }
    for handle in &handles {
        if !session.is_visible(handle).await? {
            return Ok(None);
        }
    }
    Ok(Some(handles))
}

async fn probe_clickable(session: &dyn Session, locator: &Locator) -> Result<Option<ElementHandle>> {
    let Some(first) = session.query(locator).await?.into_iter().next() else {
        return Ok(None);
    };
    if session.is_visible(&first).await? && session.is_enabled(&first).await? {
        Ok(Some(first))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn engine() -> WaitEngine {
        WaitEngine::new(Duration::from_millis(10))
    }

    #[test]
    fn test_budget_constants() {
        assert_eq!(TimeoutBudget::default().duration(), Duration::from_secs(10));
        assert_eq!(TimeoutBudget::PROBE.duration(), Duration::from_secs(2));
        assert_eq!(TimeoutBudget::BRIEF.duration(), Duration::from_secs(1));
        assert!(TimeoutBudget::from_millis(500) < TimeoutBudget::BRIEF);
    }

    #[tokio::test]
    async fn test_poll_returns_once_probe_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let waited = engine()
            .poll(TimeoutBudget::from_secs(2), move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n >= 3).then_some(n)) }
            })
            .await
            .unwrap();

        assert_eq!(waited, Waited::Ready(3));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_times_out_after_budget() {
        let budget = TimeoutBudget::from_millis(150);
        let start = Instant::now();

        let waited: Waited<()> = engine()
            .poll(budget, || async { Ok(None) })
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(matches!(waited, Waited::TimedOut { waited } if waited >= budget.duration()));
        assert!(elapsed >= budget.duration());
        assert!(elapsed < budget.duration() + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_poll_treats_stale_as_not_yet() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let waited = engine()
            .poll(TimeoutBudget::from_secs(1), move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(E2eError::stale_element("0"))
                    } else {
                        Ok(Some("fresh"))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(waited.ready(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_poll_propagates_driver_errors() {
        let result: Result<Waited<()>> = engine()
            .poll(TimeoutBudget::from_secs(1), || async {
                Err(E2eError::cdp_protocol("target closed"))
            })
            .await;

        assert!(matches!(result, Err(E2eError::CdpProtocol(_))));
    }

    #[tokio::test]
    async fn test_zero_budget_still_probes_once() {
        let waited = engine()
            .poll(TimeoutBudget::from_millis(0), || async { Ok(Some(1)) })
            .await
            .unwrap();
        assert!(waited.is_ready());
    }

    #[test]
    fn test_condition_display() {
        let condition = WaitCondition::Clickable(Locator::id("finish"));
        assert_eq!(condition.to_string(), "clickable(id=finish)");
        assert_eq!(condition.locator(), &Locator::id("finish"));
    }
}

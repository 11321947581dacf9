use crate::browser::ChromeSession;
use crate::config::Config;
use crate::error::Result;
use crate::scenarios::Scenario;
use crate::session::{with_session, Session};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Opens a fresh session for each scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn Session>>;
}

/// Opens a new tab in a Chrome started with `--remote-debugging-port`
pub struct ChromeEndpoint {
    pub host: String,
    pub port: u16,
}

impl ChromeEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl SessionFactory for ChromeEndpoint {
    async fn open(&self) -> Result<Arc<dyn Session>> {
        let session = ChromeSession::open(&self.host, self.port).await?;
        Ok(Arc::new(session))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub run_id: Uuid,
    pub passed: bool,
    pub duration: Duration,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

pub struct Runner<F> {
    factory: F,
    config: Config,
}

impl<F: SessionFactory> Runner<F> {
    pub fn new(factory: F, config: Config) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run scenarios one after another; a failure never stops the rest
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.run(*scenario).await);
        }
        let failed = reports.iter().filter(|r| !r.passed).count();
        info!("{} scenarios run, {} failed", reports.len(), failed);

        if let Err(e) = self.write_report(&reports).await {
            warn!("Could not write run report: {}", e);
        }
        reports
    }

    /// Write `reports` as JSON into the artifacts directory, if configured
    pub async fn write_report(&self, reports: &[ScenarioReport]) -> Result<Option<PathBuf>> {
        let Some(dir) = self.config.artifacts_dir.as_ref() else {
            return Ok(None);
        };
        let path = dir.join(format!("report-{}.json", Uuid::new_v4()));
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, serde_json::to_vec_pretty(reports)?).await?;
        info!("Wrote run report to {}", path.display());
        Ok(Some(path))
    }

    pub async fn run(&self, scenario: Scenario) -> ScenarioReport {
        let run_id = Uuid::new_v4();
        let name = scenario.name();
        let span = info_span!("scenario", name = %name, run_id = %run_id);

        async move {
            let started = Instant::now();
            let (result, screenshot) = match self.factory.open().await {
                Ok(session) => self.run_in_session(session, scenario, run_id).await,
                Err(e) => (Err(e), None),
            };
            let duration = started.elapsed();

            match &result {
                Ok(()) => info!("Passed in {:?}", duration),
                Err(e) => error!("Failed after {:?}: {}", duration, e),
            }

            ScenarioReport {
                name,
                run_id,
                passed: result.is_ok(),
                duration,
                error: result.err().map(|e| e.to_string()),
                screenshot,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_in_session(
        &self,
        session: Arc<dyn Session>,
        scenario: Scenario,
        run_id: Uuid,
    ) -> (Result<()>, Option<PathBuf>) {
        let config = &self.config;
        let outcome = with_session(session, |session| async move {
            let result = scenario.run(Arc::clone(&session), config).await;
            let screenshot = match &result {
                Ok(()) => None,
                Err(_) => self.capture(session.as_ref(), scenario, run_id).await,
            };
            Ok((result, screenshot))
        })
        .await;

        match outcome {
            Ok(pair) => pair,
            Err(e) => (Err(e), None),
        }
    }

    /// Screenshot the failing page into the artifacts directory, if configured
    async fn capture(&self, session: &dyn Session, scenario: Scenario, run_id: Uuid) -> Option<PathBuf> {
        let dir = self.config.artifacts_dir.as_ref()?;
        let path = dir.join(format!("{}-{}.png", artifact_stem(&scenario.name()), run_id));

        let written: Result<()> = async {
            let png = session.screenshot().await?;
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, png).await?;
            Ok(())
        }
        .await;

        match written {
            Ok(()) => {
                info!("Saved failure screenshot to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not save failure screenshot: {}", e);
                None
            }
        }
    }
}

/// File-name-safe form of a scenario name
fn artifact_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_stem() {
        assert_eq!(artifact_stem("purchase"), "purchase");
        assert_eq!(artifact_stem("invalid-login[empty-user]"), "invalid-login_empty-user_");
    }
}

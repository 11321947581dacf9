use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use storefront_e2e::config::{
    parse_base_url, Config, Credentials, DEFAULT_BASE_URL, DEFAULT_LOCKED_OUT_USER,
    DEFAULT_PASSWORD, DEFAULT_STANDARD_USER, ENV_BASE_URL, ENV_LOCKED_OUT_USER, ENV_PASSWORD,
    ENV_STANDARD_USER,
};
use storefront_e2e::runner::{ChromeEndpoint, Runner};
use storefront_e2e::scenarios::Scenario;
use storefront_e2e::wait::TimeoutBudget;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// End-to-end checks for the demo storefront, driven through Chrome
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario or scenario family to run (repeatable); all when omitted
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// Storefront root URL
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = ENV_STANDARD_USER, default_value = DEFAULT_STANDARD_USER)]
    standard_user: String,

    #[arg(long, env = ENV_LOCKED_OUT_USER, default_value = DEFAULT_LOCKED_OUT_USER)]
    locked_out_user: String,

    #[arg(long, env = ENV_PASSWORD, default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    password: String,

    /// Default wait budget in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Where failure screenshots and run reports are written
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Chrome DevTools host
    #[arg(long, default_value = "localhost")]
    chrome_host: String,

    /// Chrome DevTools port
    #[arg(long, default_value_t = 9222)]
    chrome_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> storefront_e2e::Result<Config> {
        let mut config = Config::new(parse_base_url(&self.base_url)?);
        config.standard = Credentials::new(&self.standard_user, &self.password);
        config.locked_out = Credentials::new(&self.locked_out_user, &self.password);
        config.default_timeout = TimeoutBudget::new(Duration::from_secs(self.timeout_secs));
        config.artifacts_dir = self.artifacts_dir.clone();
        Ok(config)
    }

    fn selected(&self) -> Result<Vec<Scenario>, String> {
        if self.scenarios.is_empty() {
            return Ok(Scenario::all());
        }
        let mut selected = Vec::new();
        for name in &self.scenarios {
            let matching = Scenario::matching(name);
            if matching.is_empty() {
                return Err(format!("unknown scenario {:?}", name));
            }
            for scenario in matching {
                if !selected.contains(&scenario) {
                    selected.push(scenario);
                }
            }
        }
        Ok(selected)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    let config = args.config()?;
    let scenarios = args.selected()?;

    info!("Storefront: {}", config.base_url);
    info!("Chrome: {}:{}", args.chrome_host, args.chrome_port);
    if config.standard.username == DEFAULT_STANDARD_USER && config.standard.password == DEFAULT_PASSWORD {
        info!("Using default storefront credentials");
    }

    let runner = Runner::new(ChromeEndpoint::new(&args.chrome_host, args.chrome_port), config);
    let reports = runner.run_all(&scenarios).await;

    for report in &reports {
        let status = if report.passed { "PASS" } else { "FAIL" };
        println!("{} {} ({:.2?})", status, report.name, report.duration);
        if let Some(e) = &report.error {
            println!("     {}", e);
        }
        if let Some(path) = &report.screenshot {
            println!("     screenshot: {}", path.display());
        }
    }

    if reports.iter().any(|r| !r.passed) {
        error!("Some scenarios failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "storefront-e2e",
            "--chrome-host", "127.0.0.1",
            "--chrome-port", "9223",
            "--log-level", "debug",
            "--scenario", "purchase",
            "--scenario", "invalid-login",
            "--base-url", "http://localhost:8080",
            "--timeout-secs", "3",
        ]);

        assert_eq!(args.chrome_host, "127.0.0.1");
        assert_eq!(args.chrome_port, 9223);
        assert_eq!(args.log_level, "debug");
        assert_eq!(args.selected().unwrap().len(), 5);

        let config = args.config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.default_timeout, TimeoutBudget::from_secs(3));
    }

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["storefront-e2e"]);

        assert_eq!(args.chrome_host, "localhost");
        assert_eq!(args.chrome_port, 9222);
        assert_eq!(args.log_level, "info");
        assert_eq!(args.selected().unwrap(), Scenario::all());
        assert!(args.artifacts_dir.is_none());
    }

    #[test]
    fn test_unknown_scenario() {
        let args = Args::parse_from(["storefront-e2e", "--scenario", "refund"]);
        assert!(args.selected().is_err());
    }
}

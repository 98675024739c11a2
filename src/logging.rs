use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::config::AppConfig;

const SERVICE: &str = "coinbasket";

/// Where log lines go besides stdout.
#[derive(Debug, Clone, PartialEq)]
pub struct LokiTarget {
    pub url: Url,
    /// Stream labels; every line carries them
    pub labels: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub filter: String,
    pub loki: Option<LokiTarget>,
}

impl LoggingConfig {
    /// Reads `RUST_LOG` and `LOKI_URL`. Shipping to Loki is on whenever a URL is set.
    pub fn from_env(app: &AppConfig) -> anyhow::Result<Self> {
        let filter = std::env::var("RUST_LOG").ok();
        let loki_url = std::env::var("LOKI_URL").ok();
        Self::new(filter.as_deref(), loki_url.as_deref(), app)
    }

    pub fn new(filter: Option<&str>, loki_url: Option<&str>, app: &AppConfig) -> anyhow::Result<Self> {
        let loki = match loki_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => Some(LokiTarget {
                url: Url::parse(raw).with_context(|| format!("invalid LOKI_URL '{}'", raw))?,
                labels: vec![
                    ("service".to_string(), SERVICE.to_string()),
                    ("provider".to_string(), app.provider.as_str().to_string()),
                    ("benchmark".to_string(), app.benchmark_asset.clone()),
                ],
            }),
            None => None,
        };

        Ok(Self {
            filter: filter
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .unwrap_or("info")
                .to_string(),
            loki,
        })
    }
}

pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter '{}'", config.filter))?;

    match config.loki {
        #[cfg(feature = "loki")]
        Some(target) => init_with_loki(filter, target),
        #[cfg(not(feature = "loki"))]
        Some(target) => {
            init_console_only(filter)?;
            tracing::warn!("LOKI_URL={} ignored, built without the loki feature", target.url);
            Ok(())
        }
        None => init_console_only(filter),
    }
}

fn init_console_only(filter: EnvFilter) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("a global subscriber is already installed")?;

    tracing::info!("📊 Console logging initialized");
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(filter: EnvFilter, target: LokiTarget) -> anyhow::Result<()> {
    let builder = target
        .labels
        .iter()
        .try_fold(tracing_loki::builder(), |b, (key, value)| b.label(key, value))?;
    let (loki_layer, task) = builder.build_url(target.url.clone())?;

    // Ships batches until the process exits
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()
        .context("a global subscriber is already installed")?;

    tracing::info!("✅ Logging to console and Loki at {}", target.url);
    Ok(())
}

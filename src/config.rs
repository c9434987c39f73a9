use anyhow::Context;

const DEFAULT_FETCH_BATCH_SIZE: std::num::NonZeroUsize = std::num::NonZeroUsize::new(10).unwrap();

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) hn_api_base_url: String,
    pub(crate) fetch_batch_size: std::num::NonZeroUsize,
    pub(crate) bind_address: String,
    pub(crate) upstream_timeout: std::time::Duration,
    pub(crate) retry: crate::retry::RetryPolicy,
    pub(crate) log_to_console: bool,
}

impl Config {
    /// Reads `.env` if there is one, then the process environment.
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("Failed to load .env file"),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let hn_api_base_url = lookup("HN_API_BASE_URL")
            .unwrap_or_else(|| crate::hn_api::DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(&hn_api_base_url)
            .with_context(|| format!("HN_API_BASE_URL is not a valid url: {hn_api_base_url}"))?;

        let defaults = crate::retry::RetryPolicy::default();
        let retry = crate::retry::RetryPolicy {
            median_first_delay: std::time::Duration::from_millis(parse_or(
                &lookup,
                "RETRY_MEDIAN_FIRST_DELAY_MS",
                defaults.median_first_delay.as_millis() as u64,
            )?),
            max_delay: std::time::Duration::from_millis(parse_or(
                &lookup,
                "RETRY_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
            max_attempts: parse_or(&lookup, "RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
        };
        anyhow::ensure!(retry.max_attempts >= 1, "RETRY_MAX_ATTEMPTS must be at least 1");

        Ok(Self {
            hn_api_base_url,
            fetch_batch_size: parse_or(
                &lookup,
                "STORY_FETCH_BATCH_SIZE",
                DEFAULT_FETCH_BATCH_SIZE,
            )?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            upstream_timeout: std::time::Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                30,
            )?),
            retry,
            log_to_console: parse_or(&lookup, "LOG_TO_CONSOLE", false)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} has invalid value {value:?}")),
        None => Ok(default),
    }
}

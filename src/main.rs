use std::sync::Arc;

use tracing_subscriber::util::SubscriberInitExt;

pub(crate) mod best_stories;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod hn_api;
pub(crate) mod resolver;
mod retry;
pub(crate) mod server;
pub(crate) mod story;
#[cfg(test)]
mod test_support;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "false")]
    #[arg(help = "Log to console")]
    log_to_console: bool,

    #[arg(short, long)]
    #[arg(help = "Number of stories fetched concurrently, overrides STORY_FETCH_BATCH_SIZE")]
    batch_size: Option<std::num::NonZeroUsize>,

    #[arg(long)]
    #[arg(help = "Address to listen on, overrides BIND_ADDRESS")]
    bind: Option<String>,
}

async fn run(config: config::Config) -> anyhow::Result<()> {
    let api: Arc<dyn hn_api::HnApi> = Arc::new(hn_api::HnClient::new(
        &config.hn_api_base_url,
        config.upstream_timeout,
        config.retry.clone(),
    )?);

    let cache = Arc::new(cache::StoryCache::new());
    let resolver = resolver::StoryResolver::new(api.clone(), cache, config.fetch_batch_size);
    let state = server::AppState {
        best_stories: Arc::new(best_stories::BestStories::new(api, resolver)),
    };

    server::run_server(&config.bind_address, state).await
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;

    use clap::Parser;
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily("./log", "hn_best_stories.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer();
    let file_layer = file_layer
        .with_writer(non_blocking)
        .json()
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    let pretty_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stdout)
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    let registry = tracing_subscriber::registry().with(file_layer);

    let mut config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet.
            registry.with(pretty_layer).init();
            tracing::error!(error =? e, "Invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    if config.log_to_console || args.log_to_console {
        registry.with(pretty_layer).init();
    } else {
        registry.init();
    };

    if let Some(batch_size) = args.batch_size {
        config.fetch_batch_size = batch_size;
    }
    if let Some(bind) = args.bind.clone() {
        config.bind_address = bind;
    }

    tracing::info!(
        config =? config,
        args =? args,
        "Starting HN best stories service"
    );

    match run(config).await {
        Ok(_) => {
            tracing::info!("HN best stories service stopped");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error =? e, "HN best stories service failed");
            std::process::ExitCode::FAILURE
        }
    }
}

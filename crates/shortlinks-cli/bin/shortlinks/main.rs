mod cli;

use crate::cli::{Command, CLI};
use anyhow::Context;
use clap::Parser;
use shortlinks_cache::RedisLinkCache;
use shortlinks_cli::FileLengthListener;
use shortlinks_core::{LinkCache, ShortId};
use shortlinks_manager::{
    LengthListener, LinkManager, ManagerSettings, NoopLengthListener, TokioTaskSink,
};
use shortlinks_storage::SqliteBackend;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    shortlinks_telemetry::init(config.log_format.into())?;

    let file_listener = config.length_file.as_ref().map(FileLengthListener::new);
    let short_id_length = match &file_listener {
        Some(listener) => listener.load().await?.unwrap_or(config.short_id_length),
        None => config.short_id_length,
    };
    let listener: Arc<dyn LengthListener> = match file_listener {
        Some(listener) => Arc::new(listener),
        None => Arc::new(NoopLengthListener),
    };

    let mut caches: Vec<Arc<dyn LinkCache>> = Vec::new();
    if let Some(redis_url) = &config.redis_url {
        let mut cache = RedisLinkCache::connect(redis_url, config.redis_prefix.as_str())
            .await
            .context("failed to connect to redis")?;
        if let Some(ttl) = config.redis_ttl_secs {
            cache = cache.with_ttl(Duration::from_secs(ttl));
        }
        caches.push(Arc::new(cache));
    }

    info!(
        database_url = %config.database_url,
        short_id_length,
        caches = caches.len(),
        "starting shortlinks"
    );

    let backend = SqliteBackend::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    let sink = TokioTaskSink::new();
    let settings = ManagerSettings::builder()
        .short_id_length(short_id_length)
        .rounds(config.rounds)
        .batch_size(config.batch_size)
        .update_last_access_on_get(!config.no_touch)
        .caches(caches)
        .listener(listener)
        .task_sink(Arc::new(sink.clone()))
        .build();
    let manager = LinkManager::with_random_ids(backend, settings).await?;

    let outcome = run(&manager, config.command, config.base_url.as_deref()).await;
    sink.drain().await;
    outcome
}

async fn run(
    manager: &LinkManager<SqliteBackend>,
    command: Command,
    base_url: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        Command::Create { target_url } => {
            let short_id = manager.create_short_link(target_url).await?;
            match base_url {
                Some(base_url) => println!("{}", short_id.to_url(base_url)),
                None => println!("{short_id}"),
            }
        }
        Command::Resolve { short_id } => {
            let short_id = ShortId::new(short_id)?;
            let target_url = manager
                .get_target_url(&short_id)
                .await?
                .with_context(|| format!("short id not found: {short_id}"))?;
            println!("{target_url}");
        }
        Command::Touch { short_id } => {
            let short_id = ShortId::new(short_id)?;
            manager.update_short_link_last_access_time(&short_id).await?;
        }
        Command::Clean { max_age_days } => {
            manager.clean_unused_links(max_age_days).await?;
            info!(max_age_days, "removed unused links");
        }
    }

    Ok(())
}

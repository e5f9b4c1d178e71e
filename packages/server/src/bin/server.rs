//! Real-time group chat relay server.
//!
//! Persists every message to a Redis list and relays it to all connected
//! WebSocket sessions. New sessions replay the list before live traffic.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin hiroba-server -- --store memory
//! ```

use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use hiroba_server::{
    config::{HubConfig, RetryPolicy},
    domain::{LogError, MAX_CHANNEL_CAPACITY, MessageLog},
    infrastructure::repository::{InMemoryMessageLog, RedisMessageLog, redis::DEFAULT_LOG_KEY},
    ui::Server,
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

/// Where messages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Redis list (durable across restarts)
    Redis,
    /// Process memory (lost on exit)
    Memory,
}

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time group chat relay backed by Redis", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8000")]
    port: u16,

    /// Message store backend
    #[arg(long, value_enum, default_value_t = StoreKind::Redis)]
    store: StoreKind,

    /// Redis connection URL
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379/")]
    redis_url: String,

    /// Redis list key holding the message log
    #[arg(long, default_value = DEFAULT_LOG_KEY)]
    log_key: String,

    /// Messages that may wait for the dispatcher before senders block
    #[arg(long, default_value = "1", value_parser = parse_capacity)]
    pipeline_capacity: usize,

    /// Live messages buffered per session before it is disconnected as too slow
    #[arg(long, default_value = "256", value_parser = parse_capacity)]
    outbox_capacity: usize,

    /// Timeout for a single write to a client, in milliseconds
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Retries after a failed append to the message log
    #[arg(long, default_value = "2")]
    persist_retries: u32,

    /// Backoff before the first persist retry, in milliseconds
    #[arg(long, default_value = "50")]
    persist_backoff_ms: u64,
}

/// Buffer capacities must lie in `1..=MAX_CHANNEL_CAPACITY`
fn parse_capacity(value: &str) -> Result<usize, String> {
    let capacity: usize = value.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_CHANNEL_CAPACITY).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(format!("must be between 1 and {}", MAX_CHANNEL_CAPACITY))
    }
}

impl Args {
    fn hub_config(&self) -> HubConfig {
        HubConfig {
            pipeline_capacity: self.pipeline_capacity,
            outbox_capacity: self.outbox_capacity,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            persist_retry: RetryPolicy {
                retries: self.persist_retries,
                backoff: Duration::from_millis(self.persist_backoff_ms),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("hiroba_server", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. MessageLog
    // 2. Server (hub, usecases and handlers)

    // 1. Create MessageLog
    let message_log: Arc<dyn MessageLog> = match args.store {
        StoreKind::Redis => match connect_redis(&args.redis_url, &args.log_key).await {
            Ok(log) => Arc::new(log),
            Err(e) => {
                tracing::error!("Failed to connect to Redis at {}: {}", args.redis_url, e);
                std::process::exit(1);
            }
        },
        StoreKind::Memory => {
            tracing::warn!("Using in-memory message store, history is lost on exit");
            Arc::new(InMemoryMessageLog::new())
        }
    };

    // 2. Create and run the server
    let server = Server::new(message_log, Arc::new(SystemClock), args.hub_config());
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn connect_redis(url: &str, key: &str) -> Result<RedisMessageLog, LogError> {
    let log = RedisMessageLog::connect(url, key).await?;
    let pong = log.ping().await?;
    tracing::info!("Connected to Redis at {} ({}), log key '{}'", url, pong, log.key());
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hub_config() {
        // テスト項目: フラグ未指定時の設定が HubConfig の既定値と一致する
        // given (前提条件):
        let args = Args::try_parse_from(["hiroba-server"]).unwrap();

        // when (操作):
        let config = args.hub_config();

        // then (期待する結果):
        assert_eq!(config, HubConfig::default());
        assert_eq!(args.store, StoreKind::Redis);
    }

    #[test]
    fn test_capacity_out_of_range_is_rejected() {
        // テスト項目: 範囲外のバッファ容量は起動時に拒否される
        // given (前提条件):
        let too_large = (MAX_CHANNEL_CAPACITY + 1).to_string();

        // when (操作):
        let zero = Args::try_parse_from(["hiroba-server", "--pipeline-capacity", "0"]);
        let huge =
            Args::try_parse_from(["hiroba-server", "--outbox-capacity", too_large.as_str()]);
        let max_value = MAX_CHANNEL_CAPACITY.to_string();
        let max =
            Args::try_parse_from(["hiroba-server", "--outbox-capacity", max_value.as_str()]);

        // then (期待する結果):
        assert!(zero.is_err());
        assert!(huge.is_err());
        assert_eq!(max.unwrap().outbox_capacity, MAX_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_max_retries_is_accepted() {
        // テスト項目: リトライ回数の上限値 u32::MAX を指定できる
        // given (前提条件):
        let retries = u32::MAX.to_string();

        // when (操作):
        let args =
            Args::try_parse_from(["hiroba-server", "--persist-retries", retries.as_str()]).unwrap();

        // then (期待する結果):
        assert_eq!(args.hub_config().persist_retry.retries, u32::MAX);
    }
}

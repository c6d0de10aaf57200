mod config_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::{Context, bail},
    clap::{Parser, Subcommand},
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    config_commands::ConfigAction,
    tgrelay_config::{Severity, TgRelayConfig, loader::TOKEN_ENV},
    tgrelay_relay::RelayStore,
};

#[derive(Parser)]
#[command(
    name = "tgrelay",
    version,
    about = "tgrelay: copy Telegram channel posts into one destination channel"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the discovered one.
    #[arg(long, global = true, env = "TGRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bot token (overrides config value).
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Serve Prometheus metrics on this address.
    #[cfg(feature = "prometheus")]
    #[arg(long, global = true, env = "TGRELAY_METRICS_LISTEN")]
    metrics_listen: Option<std::net::SocketAddr>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay bot (default when no subcommand is provided).
    Run,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the config file, then apply env and command-line overrides.
fn resolve_config(
    path: Option<&std::path::Path>,
    token: Option<String>,
) -> anyhow::Result<TgRelayConfig> {
    let mut config = tgrelay_config::load_or_default(path).context("failed to load config")?;
    tgrelay_config::apply_env_overrides(&mut config);
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        config.telegram.token = Secret::new(token);
    }
    Ok(config)
}

/// Resolve the config and refuse to start on any value error.
fn startup_config(
    path: Option<&std::path::Path>,
    token: Option<String>,
) -> anyhow::Result<TgRelayConfig> {
    let config = resolve_config(path, token)?;
    if !config.telegram.has_token() {
        bail!("no bot token configured; set {TOKEN_ENV}, pass --token or set telegram.token");
    }

    let result = tgrelay_config::check_config(&config);
    let mut errors = Vec::new();
    for d in &result.diagnostics {
        match d.severity {
            Severity::Error => errors.push(format!("{}: {}", d.path, d.message)),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
            Severity::Info => {},
        }
    }
    if !errors.is_empty() {
        bail!("invalid configuration: {}", errors.join("; "));
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = startup_config(cli.config.as_deref(), cli.token)?;

    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to start prometheus exporter")?;
        info!(%addr, "prometheus metrics listening");
    }

    // Relay configuration lives in memory and starts empty on every run.
    let store = Arc::new(RelayStore::new());
    let cancel = CancellationToken::new();
    let bot = tgrelay_telegram::start_polling(
        &config.telegram,
        store,
        config.relay.send_timeout(),
        cancel.clone(),
    )
    .await
    .context("failed to start telegram bot")?;

    info!(username = ?bot.username, "relay running, press Ctrl-C to stop");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutdown requested");
        },
        () = cancel.cancelled() => {
            warn!("telegram polling stopped on its own");
        },
    }

    bot.shutdown().await;
    info!("tgrelay stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tgrelay starting");

    match cli.command.take() {
        None | Some(Commands::Run) => run(cli).await,
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
    }
}

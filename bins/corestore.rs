use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};
use uuid::Uuid;

use service::dump::{dump, render};
use service::restore::strategy::Strategy;
use service::restore::{load_records, restore, InputSource};
use service::runtime::open_store;

/// Back up and restore core store configuration entries.
#[derive(Parser, Debug)]
#[command(name = "corestore", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, env = "CONFIG_PATH", default_value = "config.toml")]
    config: String,

    /// Store backend, overrides `[store].backend` and CORESTORE_BACKEND
    #[arg(long, global = true, value_parser = ["file", "database"])]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON array of records into the store
    Restore {
        /// Input file; stdin when omitted or `-`
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// replace, merge or keep (defaults to `[restore].default_strategy`)
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Export every entry as a JSON array sorted by key
    Dump {
        /// Output file; stdout when omitted or `-`
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = match configs::AppConfig::load_with_backend(&cli.config, cli.backend.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            // logging is not configured yet
            common::utils::logging::init_logging_default("info");
            error!(event = "config_invalid", path = %cli.config, error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(&cfg.logging.format, &cfg.logging.level);

    let run_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(event = "panic", %run_id, pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(event = "start", %run_id, pid, version, backend = %cfg.store.backend, "corestore starting");

    rt.block_on(async move {
        let mut stdout = tokio::io::stdout();
        tokio::select! {
            res = run(cli.command, &cfg, &mut stdout) => finish(res, run_id),
            _ = tokio::signal::ctrl_c() => {
                info!(event = "shutdown_signal", %run_id, pid, "received Ctrl+C, aborting");
                ExitCode::FAILURE
            }
        }
    })
}

/// Log the outcome of a command and map it to the process exit code.
fn finish(res: anyhow::Result<()>, run_id: Uuid) -> ExitCode {
    match res {
        Ok(()) => {
            info!(event = "stop", %run_id, "corestore finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(event = "run_failed", %run_id, error = %format!("{e:#}"), "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run<W: AsyncWrite + Unpin>(command: Command, cfg: &configs::AppConfig, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Restore { file, strategy } => {
            let strategy: Strategy = strategy
                .as_deref()
                .unwrap_or(&cfg.restore.default_strategy)
                .parse()?;
            let source = InputSource::from_arg(file);
            // strategy and input are checked before the store is opened
            let records = load_records(&source)
                .await
                .with_context(|| format!("reading {}", source.describe()))?;
            let store = open_store(cfg).await?;
            let report = restore(store, &records, strategy.as_str()).await?;
            emit(out, &report.summary()).await?;
        }
        Command::Dump { file, pretty } => {
            let store = open_store(cfg).await?;
            let records = dump(store.as_ref()).await?;
            let body = render(&records, pretty)?;
            match file.filter(|p| p.as_os_str() != "-") {
                Some(path) => {
                    tokio::fs::write(&path, format!("{body}\n"))
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(event = "dump_written", path = %path.display(), entries = records.len(), "dump saved");
                }
                None => emit(out, &body).await?,
            }
        }
    }
    Ok(())
}

/// Write `text` and a newline. A reader that went away early (`| head`) ends
/// the output quietly.
async fn emit<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> anyhow::Result<()> {
    let res: io::Result<()> = async {
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await
    }
    .await;
    match res {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!(event = "output_closed", "reader closed the output early");
            Ok(())
        }
        res => res.context("writing output"),
    }
}

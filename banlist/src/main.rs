use anyhow::{bail, Context, Result};
use banlist::{BanMatcher, Banlist, BanlistConfig, BanlistHandle, RequestInfo};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Answer ban list queries for lines read from stdin
#[derive(Parser)]
#[command(name = "banlist", about = "Live, file-backed ban list")]
struct Args {
    /// YAML config file
    #[arg(long, conflicts_with = "banfile")]
    config: Option<PathBuf>,

    /// Banfile path (one identifier per line); created if missing
    #[arg(long)]
    banfile: Option<PathBuf>,

    /// Treat input lines as identifiers instead of `host:port` addresses
    #[arg(long)]
    raw: bool,
}

fn load_config(args: &Args) -> Result<BanlistConfig> {
    match (&args.config, &args.banfile) {
        (Some(path), _) => BanlistConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        (None, Some(banfile)) => Ok(BanlistConfig::new(banfile.clone())),
        (None, None) => bail!("either --config or --banfile is required"),
    }
}

#[cfg(unix)]
fn spawn_reload_on_sighup(handle: BanlistHandle, cancel: CancellationToken) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("installing SIGHUP handler")?;
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!("SIGHUP received, reloading banfile");
                    if let Err(e) = handle.reload().await {
                        error!("Reload after SIGHUP failed: {}", e);
                    }
                }
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_reload_on_sighup(_handle: BanlistHandle, _cancel: CancellationToken) -> Result<()> {
    Ok(())
}

async fn answer(matcher: &BanMatcher, handle: &BanlistHandle, raw: bool, line: &str) -> Result<bool> {
    if raw {
        Ok(handle.is_banned(line).await?)
    } else {
        Ok(matcher.matches(&RequestInfo::new(line)).await)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = load_config(&args)?;

    let shutdown = CancellationToken::new();
    let mut banlist = Banlist::new(config.clone(), &shutdown);
    banlist.start().await.context("loading initial ban list")?;

    let handle = banlist.handle();
    let matcher = BanMatcher::from_config(handle.clone(), &config);
    spawn_reload_on_sighup(handle.clone(), shutdown.clone())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.is_empty() {
                    continue;
                }
                let verdict = match answer(&matcher, &handle, args.raw, &line).await {
                    Ok(true) => "banned",
                    Ok(false) => "allowed",
                    Err(e) => {
                        error!("Query for {:?} failed: {}", line, e);
                        "error"
                    }
                };
                stdout.write_all(format!("{}\t{}\n", line, verdict).as_bytes()).await?;
                stdout.flush().await?;
            }
        }
    }

    shutdown.cancel();
    banlist.stop().await;
    Ok(())
}

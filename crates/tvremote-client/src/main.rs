//! tvremote console client entry point.
//!
//! Loads the config file, starts a [`RemoteSession`] against the HTTP
//! gateway, prints state changes as they happen, and reads commands from
//! stdin until `quit` or Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! tvremote [OPTIONS]
//!
//! Options:
//!   -c, --config <PATH>      Config file [default: platform config dir]
//!       --gateway <URL>      Gateway base URL, overrides the config file
//!       --log-level <LEVEL>  Log filter when RUST_LOG is unset
//!       --write-config       Save the effective config and exit
//! ```
//!
//! | Variable           | Overrides       |
//! |--------------------|-----------------|
//! | `TVREMOTE_GATEWAY` | `--gateway`     |
//! | `TVREMOTE_LOG`     | `--log-level`   |
//! | `RUST_LOG`         | everything else |
//!
//! Logs go to stderr so they do not interleave with command output.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tvremote_client::application::event_stream::DeviceEventHandler;
use tvremote_client::application::key_dispatch::InputFeedback;
use tvremote_client::application::notice::NoticeKind;
use tvremote_client::application::pairing::PairingPhase;
use tvremote_client::infrastructure::console::{ConsoleCommand, HELP};
use tvremote_client::infrastructure::feedback::{BellFeedback, NoFeedback};
use tvremote_client::infrastructure::gateway::{HttpGateway, HttpGatewayConfig};
use tvremote_client::infrastructure::storage::config::{self, ClientConfig, ConfigError};
use tvremote_client::RemoteSession;
use tvremote_core::{DeviceEvent, DeviceEventKind};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Console remote control for a TV behind a tvremote gateway.
#[derive(Debug, Parser)]
#[command(name = "tvremote", about = "Console remote control for a TV gateway", version)]
struct Cli {
    /// Config file to load instead of the platform default.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Gateway base URL, e.g. `http://192.168.1.20:7503/`.
    #[arg(long, env = "TVREMOTE_GATEWAY")]
    gateway: Option<String>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long, env = "TVREMOTE_LOG")]
    log_level: Option<String>,

    /// Write the effective config (file plus overrides) back to disk and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    fn load_config(&self) -> anyhow::Result<ClientConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => match config::load_config() {
                Err(ConfigError::NoPlatformConfigDir) => ClientConfig::default(),
                other => other.context("loading config")?,
            },
        };
        if let Some(url) = &self.gateway {
            cfg.gateway.url = url.clone();
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
        Ok(cfg)
    }

    /// Saves `cfg` to `--config`, or to the platform path.  Returns where it went.
    fn write_config(&self, cfg: &ClientConfig) -> anyhow::Result<PathBuf> {
        let path = match &self.config {
            Some(path) => {
                config::save_config_to(cfg, path)?;
                path.clone()
            }
            None => {
                config::save_config(cfg)?;
                config::config_file_path()?
            }
        };
        Ok(path)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Prints device events the user should know about.
struct PrintEvents;

impl DeviceEventHandler for PrintEvents {
    fn handle(&self, event: &DeviceEvent) {
        match &event.kind {
            DeviceEventKind::ImeShow => {
                let text = event.data_str("text").unwrap_or_default();
                println!("TV keyboard open (field: {text:?}); use `type <text>`");
            }
            DeviceEventKind::ImeHide => println!("TV keyboard closed"),
            DeviceEventKind::Other(kind) => println!("TV event: {kind}"),
        }
    }
}

fn spawn_printers(session: &RemoteSession) {
    let mut state = session.subscribe_state();
    tokio::spawn(async move {
        let mut was_connected = state.borrow_and_update().connected;
        while state.changed().await.is_ok() {
            let snapshot = state.borrow_and_update().clone();
            if snapshot.connected != was_connected {
                if snapshot.connected {
                    println!("connected to {} ({} apps)", snapshot.device_name, snapshot.apps.len());
                } else {
                    println!("disconnected");
                }
                was_connected = snapshot.connected;
            }
        }
    });

    let mut pairing = session.subscribe_pairing();
    tokio::spawn(async move {
        let mut shown = false;
        while pairing.changed().await.is_ok() {
            let open = pairing.borrow_and_update().attempt.is_some();
            if open && !shown {
                println!("the TV shows a pairing code: enter it with `pair <code>`");
            } else if !open && shown {
                println!("pairing prompt closed");
            }
            shown = open;
        }
    });

    let mut notices = session.subscribe_notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(notice) => match notice.kind {
                    NoticeKind::Info => println!("{}", notice.message),
                    NoticeKind::Error => println!("error: {}", notice.message),
                },
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}

fn print_status(session: &RemoteSession) {
    let state = session.snapshot();
    if state.connected {
        println!("connected to {}", state.device_name);
    } else {
        println!("not connected");
    }
    match session.pairing_phase() {
        PairingPhase::Idle => {}
        PairingPhase::CodeEntry { code } => println!("waiting for pairing code (typed: {code:?})"),
        PairingPhase::Submitting { code } => println!("submitting pairing code {code:?}"),
    }
    if session.is_muted() {
        println!("muted");
    }
}

fn print_apps(session: &RemoteSession) {
    let state = session.snapshot();
    if state.apps.is_empty() {
        println!("no apps reported");
    }
    for app in &state.apps {
        println!("{:<24} {}", app.name, app.id);
    }
}

// ── Command dispatch ──────────────────────────────────────────────────────────

/// Runs one console line.  Action failures are printed by the notice printer.
async fn dispatch(session: &RemoteSession, line: &str) -> ControlFlow<()> {
    let command = match ConsoleCommand::parse(line) {
        Ok(command) => command,
        Err(err) => {
            println!("{err}");
            return ControlFlow::Continue(());
        }
    };

    // Failures already reach the user through the notice printer.
    let _ = match command {
        ConsoleCommand::Connect => session.connect().await,
        ConsoleCommand::Key(key) => session.send_key(&key).await,
        ConsoleCommand::App(id) => {
            if let Some(app) = session.snapshot().app(&id) {
                println!("launching {}", app.name);
            }
            session.launch_app(&id).await
        }
        ConsoleCommand::Type(text) => session.edit_text(&text).await,
        ConsoleCommand::Send(text) => session.submit_text(&text, false).await,
        ConsoleCommand::Enter(text) => session.submit_text(&text, true).await,
        ConsoleCommand::Code(code) => session.set_pairing_code(&code),
        ConsoleCommand::Pair(code) => session.submit_pairing_code(&code).await,
        ConsoleCommand::Cancel => {
            session.cancel_pairing();
            Ok(())
        }
        ConsoleCommand::Status => {
            print_status(session);
            Ok(())
        }
        ConsoleCommand::Apps => {
            print_apps(session);
            Ok(())
        }
        ConsoleCommand::Foreground => {
            session.set_foreground(true);
            Ok(())
        }
        ConsoleCommand::Background => {
            session.set_foreground(false);
            Ok(())
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ConsoleCommand::Quit => return ControlFlow::Break(()),
    };
    ControlFlow::Continue(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;
    if cli.write_config {
        let path = cli.write_config(&cfg).context("writing config")?;
        println!("config written to {}", path.display());
        return Ok(());
    }

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let gateway = HttpGateway::new(&HttpGatewayConfig {
        base_url: cfg.gateway.url.clone(),
        request_timeout: cfg.request_timeout(),
        long_poll_timeout: cfg.long_poll_timeout(),
    })
    .with_context(|| format!("creating gateway client for {}", cfg.gateway.url))?;
    info!(gateway = %gateway.base_url(), "tvremote starting");

    let feedback: Arc<dyn InputFeedback> = if cfg.input.feedback_bell {
        Arc::new(BellFeedback)
    } else {
        Arc::new(NoFeedback)
    };
    let session = RemoteSession::new(Arc::new(gateway), cfg.to_session_config(), feedback);
    info!(session = %session.id(), "session created");
    session.register_event_handler(Arc::new(PrintEvents));
    spawn_printers(&session);
    session.start();

    println!("tvremote ready; type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        if dispatch(&session, &line).await.is_break() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("failed to listen for Ctrl+C: {e}");
                }
                info!("received Ctrl+C");
                break;
            }
        }
    }

    session.shutdown();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_arguments_uses_no_overrides() {
        // Arrange / Act
        let cli = Cli::parse_from(["tvremote"]);

        // Assert
        assert!(cli.config.is_none());
        assert!(!cli.write_config);
    }

    #[test]
    fn test_cli_overrides_apply_to_loaded_config() {
        // Arrange
        let cli = Cli::parse_from([
            "tvremote",
            "--config",
            "/nonexistent/tvremote/config.toml",
            "--gateway",
            "http://10.0.0.5:7503/",
            "--log-level",
            "debug",
        ]);

        // Act
        let cfg = cli.load_config().expect("defaults for a missing file");

        // Assert
        assert_eq!(cfg.gateway.url, "http://10.0.0.5:7503/");
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn test_write_config_saves_overrides_to_given_path() {
        // Arrange
        let path = std::env::temp_dir()
            .join(format!("tvremote_cli_{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let cli = Cli::parse_from([
            "tvremote",
            "--config",
            path.to_str().unwrap(),
            "--gateway",
            "http://10.0.0.9:7503/",
            "--write-config",
        ]);
        let cfg = cli.load_config().unwrap();

        // Act
        let written = cli.write_config(&cfg).unwrap();

        // Assert
        assert_eq!(written, path);
        assert_eq!(config::load_config_from(&path).unwrap().gateway.url, "http://10.0.0.9:7503/");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}

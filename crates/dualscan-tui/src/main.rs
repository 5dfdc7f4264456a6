//! dualscan - a terminal explorer for two chains served by one indexing registry.

mod action;
mod app;
mod config;
mod event;
mod log_buffer;
mod report;
mod theme;
mod tui;
mod ui;

use action::Action;
use app::App;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use dualscan_core::{AppConfig, Command, Explorer};
use dualscan_registry::{
    PollScheduler, Registry, RegistryClient, RegistryConfig, execute, registry_task,
};
use event::{Event, EventHandler};
use log_buffer::{LogBuffer, LogBufferLayer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use theme::Theme;
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui::Tui;

/// Browse the latest blocks and transactions of two chains side by side.
#[derive(Parser, Debug)]
#[command(name = "dualscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Registry base URL, including the API prefix
    #[arg(long = "api-url")]
    api_url: Option<String>,

    /// Milliseconds between live refreshes
    #[arg(long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Timeout for each registry request, in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Start with the live feed paused
    #[arg(long)]
    paused: bool,

    /// Read and write preferences at this path instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist the effective settings (including overrides) before starting
    #[arg(long = "save-config")]
    save_config: bool,

    /// Fetch stats and the first page once, print them, and exit.
    /// Suitable for scripts and cron jobs.
    #[arg(long)]
    once: bool,

    /// Log to stderr instead of the in-app log pane
    #[arg(long = "log-stderr")]
    log_stderr: bool,
}

impl Args {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            api_url: self.api_url.clone(),
            poll_interval_ms: self.interval_ms,
            request_timeout_ms: self.timeout_ms,
            start_paused: self.paused,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    let log_buffer = LogBuffer::new();

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("dualscan=info".parse()?)
        .add_directive("dualscan_core=info".parse()?)
        .add_directive("dualscan_registry=info".parse()?);

    if args.once || args.log_stderr {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        // Raw mode owns the terminal, so logs go to the in-app pane.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(LogBufferLayer::new(log_buffer.clone()))
            .init();
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::get_config_path()?,
    };
    let app_config = args
        .overrides()
        .apply(config::load_config_or_default(&config_path));
    app_config.validate()?;

    if args.save_config {
        config::save_config_to(&app_config, &config_path)?;
        tracing::info!("Saved settings to {}", config_path.display());
    }

    let registry_config = RegistryConfig::new(
        &app_config.api_base_url,
        Duration::from_millis(app_config.request_timeout_ms),
        app_config.profiles().map(|_, profile| profile.slug),
    )?;
    let registry: Arc<dyn Registry> = Arc::new(RegistryClient::new(registry_config)?);

    if args.once {
        return run_once(registry, &app_config).await;
    }
    run_tui(registry, app_config, log_buffer).await
}

/// Forward engine commands to the registry worker.
async fn dispatch(command_tx: &mpsc::Sender<Command>, commands: Vec<Command>) {
    for command in commands {
        if command_tx.send(command).await.is_err() {
            tracing::warn!("Registry worker is gone, dropping command");
            break;
        }
    }
}

async fn run_tui(
    registry: Arc<dyn Registry>,
    app_config: AppConfig,
    log_buffer: LogBuffer,
) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::channel::<Action>(100);
    let (command_tx, command_rx) = mpsc::channel::<Command>(100);

    let theme = Theme::detect();
    let explorer = Explorer::new(app_config.page_sizes(), app_config.start_paused);
    let mut app = App::new(
        explorer,
        app_config.profiles(),
        app_config.api_base_url.clone(),
        log_buffer,
        theme,
    );

    let worker = tokio::spawn(registry_task(registry, command_rx, action_tx.clone()));
    let scheduler = PollScheduler::spawn(
        Duration::from_millis(app_config.poll_interval_ms),
        action_tx,
        || Action::Poll,
    );

    let mut tui = Tui::new()?;
    tui.enter()?;

    let mut events = EventHandler::new(100);

    dispatch(&command_tx, app.start()).await;

    let result = loop {
        if let Err(e) = tui.draw(|frame| ui::render(frame, &mut app)) {
            break Err(e);
        }

        tokio::select! {
            event = events.next() => {
                match event {
                    Ok(Event::Tick) => app.tick(),
                    Ok(Event::Key(key)) => {
                        if let Some(action) = app.handle_key(key) {
                            let commands = app.handle_action(action);
                            dispatch(&command_tx, commands).await;
                        }
                    }
                    // Ratatui picks up the new size on the next draw.
                    Ok(Event::Resize) => {}
                    Err(e) => break Err(e),
                }
            }
            Some(action) = action_rx.recv() => {
                let commands = app.handle_action(action);
                dispatch(&command_tx, commands).await;
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    scheduler.stop().await;
    drop(command_tx);
    if let Err(e) = worker.await {
        tracing::warn!("Registry worker failed: {}", e);
    }

    tui.exit()?;
    result
}

/// Headless mode: one stats fetch and one first page, printed as text.
async fn run_once(registry: Arc<dyn Registry>, app_config: &AppConfig) -> Result<()> {
    let mut explorer = Explorer::new(app_config.page_sizes(), false);
    for command in explorer.start() {
        for outcome in execute(registry.as_ref(), command).await {
            explorer.apply(outcome);
        }
    }

    let snapshot = explorer.snapshot();
    print!(
        "{}",
        report::render_report(&snapshot, &app_config.profiles(), chrono::Utc::now())
    );

    match snapshot.list_error {
        Some(failure) => Err(eyre!("Registry unavailable: {}", failure)),
        None => Ok(()),
    }
}

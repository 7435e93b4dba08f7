use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEventKind;
use pkgmenu::app::{App, StatusKind};
use pkgmenu::command::CommandTable;
use pkgmenu::config::{self, Config};
use pkgmenu::event::{Event, EventHandler};
use pkgmenu::system::executor::Executor;
use pkgmenu::system::startup::check_manager;
use pkgmenu::{logging, ui};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(
    name = "pkgmenu",
    version,
    about = "Arrow-key menu for listing, upgrading, downgrading, uninstalling and searching packages"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Why the event loop stopped.
enum Exit {
    Quit,
    Interrupted,
}

/// Restores the terminal when dropped, including on early `?` returns.
struct TerminalGuard {
    terminal: ratatui::DefaultTerminal,
}

impl TerminalGuard {
    fn acquire() -> Result<Self> {
        let terminal = ratatui::try_init()?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            ratatui::restore();
            original_hook(panic_info);
        }));

        Ok(TerminalGuard { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let loaded = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    let log_file = logging::log_path();
    if let Err(err) = logging::init_file_logging(
        &log_file,
        logging::resolve_level(&config.general.log_level),
    ) {
        eprintln!("warning: logging to {} disabled: {err}", log_file.display());
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");
    if let Some(err) = &config_error {
        tracing::warn!(error = %err, "config ignored, using defaults");
    }

    let commands = CommandTable::from_config(&config.manager, &config.commands)
        .inspect_err(|err| tracing::error!(error = %err, "invalid command table"))?;
    tracing::debug!(program = commands.program(), "command table ready");

    println!("Checking {}...", config.manager.program);
    let banner = check_manager(&config.manager, STARTUP_TIMEOUT)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "package manager unavailable"))?;
    tracing::info!(banner = %banner, "package manager ready");

    let mut app = App::new(&config, commands, banner);
    if let Some(err) = config_error {
        app.set_status(format!("Config ignored: {err}"), StatusKind::Error);
    }
    let executor = Executor::with_timeout_secs(config.general.command_timeout_secs);
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms.max(10));

    let mut guard = TerminalGuard::acquire()?;
    let exit = run(&mut guard.terminal, &mut app, executor, tick_rate).await;
    drop(guard);

    match exit? {
        Exit::Quit => {
            tracing::info!("quit");
            println!("Exiting the package manager.");
        }
        Exit::Interrupted => {
            tracing::info!("interrupted");
            println!("Program interrupted. Exiting gracefully.");
        }
    }
    Ok(())
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    executor: Executor,
    tick_rate: Duration,
) -> Result<Exit> {
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, app))?;

    while app.running {
        if let Some(job) = app.take_job() {
            terminal.draw(|frame| ui::draw(frame, app))?;

            let outcome = tokio::select! {
                outcome = executor.run(&job.invocation) => Ok(outcome),
                stop = events.interrupted() => Err(stop),
            };
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(Event::Failed(reason)) => {
                    tracing::error!(command = %job.invocation, %reason, "input lost while running");
                    return Err(eyre!("terminal input failed: {reason}"));
                }
                Err(_) => {
                    tracing::warn!(command = %job.invocation, "interrupted while running");
                    return Ok(Exit::Interrupted);
                }
            };

            // Keys typed while the command ran are not meant for the result screen.
            events.discard_pending();
            app.complete(job, outcome);
            terminal.draw(|frame| ui::draw(frame, app))?;
            continue;
        }

        let Some(event) = events.next().await else {
            break;
        };
        if event.is_interrupt() {
            return Ok(Exit::Interrupted);
        }
        let mut should_draw = false;
        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    should_draw = true;
                }
            }
            Event::Tick => {
                should_draw = app.status_message.is_some();
                app.on_tick();
            }
            Event::Resize => should_draw = true,
            Event::Failed(reason) => return Err(eyre!("terminal input failed: {reason}")),
            Event::Interrupt => {}
        }
        if should_draw && app.running {
            terminal.draw(|frame| ui::draw(frame, app))?;
        }
    }

    Ok(Exit::Quit)
}

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bus_notify::api::{HttpBackend, NotificationBackend, generate_push_token};
use bus_notify::command::{Command, HELP};
use bus_notify::config::loader;
use bus_notify::config::types::AppConfig;
use bus_notify::engine::{Engine, EngineHandle, EngineSettings, Event, SyncEngine};
use bus_notify::platform::TerminalNotifier;
use bus_notify::render::Renderer;
use bus_notify::types::{Badge, NotificationId};

#[derive(Parser)]
#[command(name = "bus-notify", version, about = "Bus tracker notifications in the terminal")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep notifications in sync, print updates and accept commands on stdin (default).
    Watch,
    /// Print one page of notifications.
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Print the unread count.
    Count,
    /// Mark one notification as read.
    Read {
        /// Notification id.
        id: String,
    },
    /// Mark every notification as read.
    ReadAll,
    /// Register a placeholder web push token with the server.
    RegisterPush,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let config = loader::load_config(cli.config.as_deref())?;
    let backend = HttpBackend::new(&config.server)?;

    tracing::info!("bus-notify starting against {}", backend.base_url());

    let rt = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&rt, &config, backend),
        Commands::List { page } => {
            let notifications = rt.block_on(backend.fetch_page(page))?;
            let mut renderer = Renderer::new(&config.defaults);
            let lines = renderer.apply(&Event::ListReplaced {
                page,
                notifications,
            });
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Count => {
            let count = rt.block_on(backend.fetch_unread_count())?;
            let mut renderer = Renderer::new(&config.defaults);
            for line in renderer.apply(&Event::BadgeUpdated {
                badge: Badge::from_count(count),
            }) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Read { id } => {
            let id = NotificationId::from(id);
            rt.block_on(backend.mark_read(&id))
                .with_context(|| format!("marking notification {id} as read"))?;
            println!("✓ Marked notification {id} as read");
            Ok(())
        }
        Commands::ReadAll => {
            rt.block_on(backend.mark_all_read())
                .context("marking all notifications as read")?;
            println!("✓ Marked all notifications as read");
            Ok(())
        }
        Commands::RegisterPush => {
            let token = generate_push_token();
            rt.block_on(backend.register_push_token(&token))
                .context("registering push token")?;
            println!("✓ Registered push token {token}");
            Ok(())
        }
    }
}

/// Run the sync engine, print every event and take commands from stdin until
/// Ctrl-C or `q`.
fn watch(rt: &tokio::runtime::Runtime, config: &AppConfig, backend: HttpBackend) -> Result<()> {
    let (event_tx, event_rx) = std::sync::mpsc::channel::<Event>();

    // The engine runs on its own OS thread with its own Tokio runtime.
    let engine_handle = SyncEngine::new(
        backend,
        TerminalNotifier::new(&config.push),
        EngineSettings::from(&config.sync),
        event_tx,
    )
    .start();
    // Show the badge now rather than after the first poll period.
    engine_handle.update_unread_count();

    let mut renderer = Renderer::new(&config.defaults);
    let printer = std::thread::Builder::new()
        .name("notify-render".to_owned())
        .spawn(move || {
            // Ends when the engine drops its event sender on shutdown.
            for event in event_rx {
                for line in renderer.apply(&event) {
                    println!("{line}");
                }
            }
        })
        .context("spawning render thread")?;

    let (quit_tx, mut quit_rx) = tokio::sync::oneshot::channel::<()>();
    let input_handle = engine_handle.clone();
    // Not joined: it may be parked on a read when we exit.
    std::thread::Builder::new()
        .name("notify-input".to_owned())
        .spawn(move || read_commands(&input_handle, quit_tx))
        .context("spawning input thread")?;
    println!("Type h for commands.");

    rt.block_on(async {
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("waiting for Ctrl-C"),
            // A closed stdin drops the sender; keep running until Ctrl-C then.
            Ok(()) = &mut quit_rx => Ok(()),
        }
    })?;
    tracing::info!("bus-notify: stopping, disconnecting");
    engine_handle.disconnect();
    drop(engine_handle);

    let _ = printer.join();
    Ok(())
}

fn read_commands(engine: &EngineHandle, quit_tx: tokio::sync::oneshot::Sender<()>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => {
                let _ = quit_tx.send(());
                return;
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(command) => {
                tracing::debug!("input: {command:?}");
                command.dispatch(engine);
            }
            Err(e) => eprintln!("{e}"),
        }
    }
    tracing::debug!("input: stdin closed");
}

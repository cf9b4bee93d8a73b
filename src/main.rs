//! Terminal dashboard for a 7 Days to Die server (default binary).
//!
//! Connects to the telnet console, polls it on a fixed interval and renders a
//! framebuffer-based dashboard. `--once` prints a single snapshot as JSON.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sdtd_monitor::adapter::{probe, ConfigError, Monitor, MonitorConfig, USAGE};
use sdtd_monitor::input::{handle_key_event, should_quit};
use sdtd_monitor::term::{DashboardView, FrameBuffer, TerminalRenderer, Viewport};
use sdtd_monitor::App;

/// Input poll timeout between frames.
const FRAME_MS: u64 = 50;

fn init_logging(path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match path {
        // Stdout belongs to the dashboard, so diagnostics go to a file or nowhere.
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = match MonitorConfig::from_env().apply_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{USAGE}");
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    init_logging(config.log_path.as_deref())?;
    info!(?config, "starting");

    if config.once {
        let report = probe(&config)?;
        for failure in &report.failures {
            eprintln!("{}: {}", failure.command, failure.error);
        }
        println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
        return Ok(());
    }

    let mut monitor = Monitor::start(&config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let mut app = App::new(monitor.host(), monitor.port());
    let result = run(&mut term, &mut monitor, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    monitor.shutdown();
    if let Err(e) = &result {
        error!(error = %e, "dashboard loop failed");
    }
    result
}

fn run(term: &mut TerminalRenderer, monitor: &mut Monitor, app: &mut App) -> Result<()> {
    let view = DashboardView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let frame_timeout = Duration::from_millis(FRAME_MS);

    loop {
        while let Some(ev) = monitor.try_recv() {
            app.apply_event(ev);
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&app.frame(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(frame_timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(action) = handle_key_event(key, app.focus()) {
                    if let Some(command) = app.apply_action(action) {
                        monitor.submit(&command);
                    }
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}

// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

mod api;
mod app;
mod events;
mod model;
mod settings;
mod telemetry;
mod ui;

use api::{ApiClient, HttpApiClient};
use app::{App, View};
use model::{fallback_machines, FleetData};
use settings::Settings;
use telemetry::Telemetry;

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Diagnostic TUI for monitoring mining equipment vitals and failure predictions")]
struct Args {
    /// Backend base URL (overrides config file and VITALWATCH_API_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fleet refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Write tracing output to this file (the terminal belongs to the TUI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export current fleet state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.api_url = url;
    }
    if let Some(refresh) = args.refresh {
        settings.refresh_secs = refresh;
    }
    if let Some(path) = args.log_file {
        settings.log_file = Some(path);
    }

    if let Some(path) = &settings.log_file {
        init_tracing(path)?;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let client = Arc::new(HttpApiClient::new(settings.api_url.clone())?);

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&runtime, client, &export_path);
    }

    let mut telemetry = Telemetry::new(runtime.handle().clone(), client, fallback_machines());
    telemetry.start_polling(Duration::from_secs(settings.refresh_secs.max(1)));

    run_tui(telemetry)
}

/// Run the TUI over the given telemetry view-model.
fn run_tui(telemetry: Telemetry) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and issue the first fetch cycle
    let mut app = App::new(telemetry);
    app.refresh();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with fleet health
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Fleet => ui::fleet::render(frame, app, chunks[2]),
                View::Vitals => ui::vitals::render(frame, app, chunks[2]),
                View::Predictions => ui::predictions::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Apply completed fetch outcomes and surface notices
        app.tick();
    }

    Ok(())
}

/// Export current fleet state to a JSON file (non-interactive mode).
///
/// Degrades the same way the dashboard does: any failure or empty collection
/// exports the fallback set tagged non-live.
fn export_to_file(
    runtime: &tokio::runtime::Runtime,
    client: Arc<HttpApiClient>,
    export_path: &Path,
) -> Result<()> {
    use std::io::Write;

    let (machines, live) = match runtime.block_on(client.machines()) {
        Ok(machines) if !machines.is_empty() => (machines, true),
        Ok(_) => {
            eprintln!("warning: backend returned no machines, exporting fallback set");
            (fallback_machines(), false)
        }
        Err(e) => {
            eprintln!("warning: {e}, exporting fallback set");
            (fallback_machines(), false)
        }
    };
    let fleet = FleetData::from_machines(machines, live);

    let mut export = serde_json::Map::new();

    let mut summary = serde_json::Map::new();
    summary.insert("total_machines".to_string(), serde_json::json!(fleet.total()));
    summary.insert("online".to_string(), serde_json::json!(fleet.online_count()));
    summary.insert("critical".to_string(), serde_json::json!(fleet.critical_count()));
    summary.insert(
        "avg_efficiency".to_string(),
        serde_json::json!(fleet.avg_efficiency()),
    );
    summary.insert("live".to_string(), serde_json::json!(fleet.live));
    export.insert("summary".to_string(), serde_json::Value::Object(summary));

    let machines: Vec<serde_json::Value> = fleet
        .machines
        .iter()
        .map(|m| {
            serde_json::json!({
                "id": m.id,
                "name": m.name,
                "type": m.machine_type.label(),
                "status": m.status.label(),
                "health": m.health_status.symbol(),
                "temperature": m.vitals.temperature,
                "pressure": m.vitals.pressure,
                "vibration": m.vitals.vibration,
                "risk_level": m.risk_level(),
                "risk_bucket": m.risk_bucket().label()
            })
        })
        .collect();
    export.insert("machines".to_string(), serde_json::Value::Array(machines));

    let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
    let mut file = std::fs::File::create(export_path)?;
    file.write_all(json.as_bytes())?;

    println!("Exported fleet state to: {}", export_path.display());
    Ok(())
}

/// Route tracing output to a file so it never corrupts the alternate screen.
fn init_tracing(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

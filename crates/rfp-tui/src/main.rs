use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

mod api;
mod app;
mod bulk;
mod config;
mod logging;
mod tree;
mod ui;

use api::ApiClient;
use app::{App, AppEvent};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::from_env()?;

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--api-url" => {
                if i + 1 < args.len() {
                    config.api_url = args[i + 1].trim_end_matches('/').to_string();
                    i += 2;
                } else {
                    eprintln!("Error: --api-url requires a URL argument");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: rfp-tui [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --api-url <URL>  Backend base URL (default: $RFP_API_URL or http://localhost:8000)");
                println!("  --help, -h       Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    logging::init(&config)?;
    let api = ApiClient::new(&config.api_url, config.request_timeout)?;
    tracing::info!(api_url = %api.base_url(), "Starting rfp-tui");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let app = App::new(Box::new(api));
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Exited with error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<()> {
    // Create event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Terminal input is blocking, so read it off the async workers. The
    // thread exits once the receiver is gone.
    let tx_input = tx.clone();
    tokio::task::spawn_blocking(move || {
        while !tx_input.is_closed() {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let app_event = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                _ => continue,
            };
            if tx_input.blocking_send(app_event).is_err() {
                break;
            }
        }
    });

    // Fetch the tree once the first frame is up
    tx.send(AppEvent::Reload).await?;

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if let Some(event) = rx.recv().await {
            match event {
                AppEvent::Key(key) => {
                    if app.handle_key(key).await? {
                        return Ok(());
                    }
                }
                AppEvent::Resize => {}
                AppEvent::Reload => {
                    app.load().await;
                }
            }
        }
    }
}

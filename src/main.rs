mod config;
mod controller;
mod error;
mod logging;
mod model;
mod storage;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Config;
use controller::AppController;
use model::{AppModel, CatalogFetcher, RentedCatalog, TmdbClient};
use storage::{FileStore, KeyValueStore};
use view::AppView;

/// Upper bound on how long shutdown waits for the last snapshot write
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== CineRent Starting ===");

    let config = Config::from_env().context("Could not load configuration")?;
    tracing::debug!(
        api_base = %config.api_base,
        data_dir = %config.data_dir.display(),
        trailer_site = %config.trailer_site,
        "Configuration loaded"
    );

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
    let rentals = RentedCatalog::hydrate(store).await;
    tracing::info!(count = rentals.len(), "Rented movies restored");

    let client = TmdbClient::new(&config).context("Could not create HTTP client")?;
    let fetcher = CatalogFetcher::new(Arc::new(client), config.trailer_site.clone());

    let model = Arc::new(AppModel::new(rentals.clone(), fetcher));
    let controller = AppController::new(model.clone());
    controller.watch_persistence();

    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.load_popular().await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    match tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, rentals.flush()).await {
        Ok(Ok(())) => tracing::debug!("Rentals flushed"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Final rentals write failed");
            eprintln!("Warning: rentals could not be saved: {}", e);
        }
        Err(_) => tracing::warn!("Timed out waiting for the final rentals write"),
    }

    tracing::info!("CineRent shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        model.auto_clear_old_notices().await;

        let ui_state = model.get_ui_state().await;
        let content_state = model.get_content_state().await;
        let should_quit = model.should_quit().await;

        terminal.draw(|f| {
            AppView::render(f, &ui_state, &content_state);
        })?;

        if should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}

//! Palco Board - terminal kanban for creator campaign workflows
//!
//! Run: cargo run -p palco-board

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use palco_board::app::App;
use palco_board::{BoardConfig, BoardStore, ui};
use palco_client::{MarketplaceApi, NetworkHttpClient, RestMarketplace};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Route tracing into the TUI log pane instead of stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(env_filter)
        .init();
    tui_logger::init_logger(log::LevelFilter::Info).ok();
    tui_logger::set_default_level(log::LevelFilter::Info);

    let config = BoardConfig::from_env();
    let transport = NetworkHttpClient::new(&config.client_config())?;
    let api: Arc<dyn MarketplaceApi> = Arc::new(RestMarketplace::new(transport));
    let store = Arc::new(BoardStore::new(api, config.company_id));

    // First load happens in the background; the UI shows progress meanwhile.
    {
        let store = store.clone();
        tokio::spawn(async move { store.revalidate().await });
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    tracing::info!("quadro pronto: setas navegam, 'g' arrasta, Enter abre detalhes, 'q' sai");

    let result = run_app(&mut terminal, &mut app, config.tick_ms).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_ms: u64,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(tick_ms))? {
            match event::read()? {
                Event::Key(key)
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                {
                    app.handle_key(key);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

use clap::Parser;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::error::Error;
use std::io::{self, Stdout};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use pokemon_search_tui::config::Config;
use pokemon_search_tui::logging::init_logging;
use pokemon_search_tui::sprites::SpriteCache;
use pokemon_search_tui::ui::{draw_ui, App, AppAction};
use pokemon_search_tui::utils::format_name;
use pokemon_search_tui::{PokeApiClient, SearchController, SearchState};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let config = Config::parse();
    init_logging(&config);
    tracing::info!(base_url = %config.base_url, "starting");

    let http = reqwest::Client::new();
    let controller = SearchController::new(PokeApiClient::with_client(
        http.clone(),
        &config.base_url,
    ));

    // Headless mode: one lookup, printed, then exit non-zero unless found.
    if let Some(name) = &config.lookup {
        if let Some(handle) = controller.submit(name) {
            handle.await?;
        }
        let state = controller.state();
        print_state(&state);
        return Ok(match state {
            SearchState::Success(_) => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        });
    }

    let mut app = App::new(
        config.query.clone(),
        SpriteCache::new(http),
        Duration::from_millis(config.cycle_ms),
    );
    let mut updates = controller.subscribe();

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &controller, &mut updates);

    // Restore terminal
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    result.map(|()| ExitCode::SUCCESS)
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    controller: &SearchController<PokeApiClient>,
    updates: &mut watch::Receiver<SearchState>,
) -> Result<(), Box<dyn Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Pick up a newly resolved record so its sprites start downloading.
        if updates.has_changed().unwrap_or(false) {
            let latest = updates.borrow_and_update().clone();
            if let SearchState::Success(record) = &latest {
                app.show_record(record);
            }
        }

        let state = controller.state();
        draw_ui(terminal, app, &state)?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.on_key(key) {
                        AppAction::Quit => break,
                        AppAction::Submit(name) => {
                            // The handle is dropped; the task keeps running.
                            let _ = controller.submit(&name);
                        }
                        AppAction::None => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(Instant::now());
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn print_state(state: &SearchState) {
    match state {
        SearchState::Success(record) => {
            println!("{}", format_name(&record.name));
            println!("Abilities: {}", record.abilities.join(", "));
            println!("Types: {}", record.types.join(", "));
            match record.primary_image() {
                Some(url) => println!("Image: {url}"),
                None => println!("Image: none"),
            }
        }
        SearchState::Failure { message, .. } => eprintln!("{message}"),
        SearchState::Idle | SearchState::Loading => eprintln!("no result"),
    }
}

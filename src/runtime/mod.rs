use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::player::Event;
use crate::playlist::PlaylistStore;

mod event_loop;
mod settings;
mod startup;

/// Bound on queued player events; position ticks beyond it are dropped.
const EVENT_CAPACITY: usize = 256;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    startup::init_logging(&settings);
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting flacterm");

    let (tx, rx) = mpsc::sync_channel::<Event>(EVENT_CAPACITY);
    let mut player = startup::build_player(&settings, tx)?;
    player.controller.queue_mut().set_on_change(|queue| {
        debug!(len = queue.len(), current = ?queue.current_index(), "queue changed");
    });

    let mut playlists = PlaylistStore::open(&settings.playlist_dir());
    playlists.set_on_change(|store| {
        debug!(path = %store.path().display(), playlists = store.names().len(), "playlists saved");
    });
    let mut app = App::new(playlists, &settings.ui);

    if let Some(query) = env::args().nth(1).map(|q| q.trim().to_string()) {
        if !query.is_empty() {
            app.start_search(&query);
            player.controller.jobs().search(&query, app.kind);
        }
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut player.controller,
        &rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.controller.stop();
    info!("bye");
    run_result
}

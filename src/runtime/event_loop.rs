use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::{App, InputMode};
use crate::audio::MediaBackend;
use crate::config;
use crate::player::{Event, Notice, PlaybackController, PlayerState};
use crate::ui;

const TICK: Duration = Duration::from_millis(50);

/// Main terminal event loop: drains player events, redraws and handles one
/// key per tick. Returns `Ok(())` when shutdown is requested.
pub fn run<B: MediaBackend + 'static>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
    events: &Receiver<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        drain_events(app, controller, events);

        app.prune_notices(Instant::now());
        terminal.draw(|f| {
            let view = controller.snapshot();
            ui::draw(
                f,
                app,
                &view,
                controller.queue(),
                controller.is_resolving(),
                settings,
            )
        })?;

        if event::poll(TICK)? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, controller) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply everything the sampler and the fetch jobs posted since last tick.
fn drain_events<B: MediaBackend + 'static>(
    app: &mut App,
    controller: &mut PlaybackController<B>,
    events: &Receiver<Event>,
) {
    while let Ok(event) = events.try_recv() {
        match event {
            Event::SearchFinished {
                query,
                kind,
                results,
            } => {
                if !app.finish_search(&query, kind, results) {
                    debug!(%query, "stale search results discarded");
                }
            }
            Event::DetailFetched { track_id, detail } => match detail {
                Ok(Some(detail)) => app.merge_detail(&track_id, detail),
                Ok(None) => debug!(%track_id, "no detail record"),
                // The popup already shows what the search returned.
                Err(e) => warn!(%track_id, error = %e, "track detail fetch failed"),
            },
            other => controller.handle_event(other),
        }
    }

    if let Some(change) = controller.take_line_change() {
        if let Some(current) = change.current {
            app.lyric_anchor = current;
        }
    }
    if !controller.lyrics_visible() {
        app.lyric_anchor = 0;
    }
    for notice in controller.take_notices() {
        app.notify(notice);
    }
}

/// Handle one key press. Returns `true` to quit.
fn handle_key_event<B: MediaBackend + 'static>(
    key: KeyEvent,
    app: &mut App,
    controller: &mut PlaybackController<B>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if app.input_mode != InputMode::Normal {
        handle_input_key(key, app, controller);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,

        KeyCode::Char('/') => app.begin_input(InputMode::Search),
        KeyCode::Char('n') | KeyCode::Right => {
            app.next_page();
        }
        KeyCode::Char('p') | KeyCode::Left => {
            app.prev_page();
        }
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),

        KeyCode::Enter => play_selected(app, controller),
        KeyCode::Char(' ') => {
            if controller.state() == PlayerState::Idle && !controller.is_resolving() {
                play_selected(app, controller);
            } else {
                controller.toggle_pause();
            }
        }
        KeyCode::Esc => {
            if controller.state() != PlayerState::Idle || controller.is_resolving() {
                controller.stop();
                app.notify(Notice::info("Playback stopped"));
            }
        }
        KeyCode::Char('h') => controller.seek_by(1.0),
        KeyCode::Char('g') => controller.seek_by(-1.0),

        KeyCode::Char('l') => controller.toggle_lyrics(),
        KeyCode::Char('r') => controller.toggle_repeat(),
        KeyCode::Char('s') => {
            if let Some(id) = app.toggle_info() {
                controller.jobs().fetch_detail(&id);
            }
        }
        KeyCode::Char('v') => app.toggle_keybinds(),

        KeyCode::Char('a') => match app.selected_track().cloned() {
            Some(track) => {
                let title = track.title_or_unknown().to_string();
                controller.queue_mut().add(track);
                app.notify(Notice::info(format!("Added '{title}' to queue")));
            }
            None => app.notify(Notice::info("No track selected")),
        },
        KeyCode::Char('y') => remove_queue_current(app, controller),
        KeyCode::Char('z') => controller.next(),
        KeyCode::Char('x') => controller.previous(),
        KeyCode::Char('c') => {
            controller.queue_mut().clear();
            app.notify(Notice::info("Queue cleared"));
        }
        KeyCode::Char('t') => app.toggle_queue(),
        KeyCode::Char('.') => app.queue_select_next(controller.queue().len()),
        KeyCode::Char(',') => app.queue_select_prev(controller.queue().len()),
        KeyCode::Char('{') => move_queue_selection(app, controller, false),
        KeyCode::Char('}') => move_queue_selection(app, controller, true),
        KeyCode::Char('o') => match app.queue_row(controller.queue().len()) {
            Some(index) => controller.play_queue_index(index),
            None => app.notify(Notice::info("Queue is empty")),
        },

        KeyCode::Char('m') => app.toggle_playlists(),
        KeyCode::Char('J') => app.playlist_next(),
        KeyCode::Char('K') => app.playlist_prev(),
        KeyCode::Char(']') => app.playlist_track_next(),
        KeyCode::Char('[') => app.playlist_track_prev(),
        KeyCode::Char('w') => app.add_selected_to_playlist(),
        KeyCode::Char('W') => app.remove_selected_from_playlist(),
        KeyCode::Char('X') => app.remove_selected_playlist_track(),
        KeyCode::Char('C') => app.clear_selected_playlist(),
        KeyCode::Char('N') => app.begin_input(InputMode::NewPlaylist),
        KeyCode::Char('R') => {
            if app.selected_playlist().is_some() {
                app.begin_input(InputMode::RenamePlaylist);
            } else {
                app.notify(Notice::info("No playlist selected"));
            }
        }
        KeyCode::Char('D') => app.delete_selected_playlist(),
        KeyCode::Char('L') => {
            if let Some(tracks) = app.selected_playlist_tracks() {
                let count = tracks.len();
                controller.queue_mut().extend(tracks);
                app.notify(Notice::info(format!("Added {count} tracks to queue")));
                if controller.state() == PlayerState::Idle && !controller.is_resolving() {
                    controller.play_queue_current();
                }
            }
        }

        _ => {}
    }

    false
}

fn handle_input_key<B: MediaBackend + 'static>(
    key: KeyEvent,
    app: &mut App,
    controller: &mut PlaybackController<B>,
) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => app.pop_input(),
        KeyCode::Enter => {
            let (mode, text) = app.take_input();
            match mode {
                InputMode::Search => {
                    if text.is_empty() {
                        return;
                    }
                    controller.stop();
                    app.start_search(&text);
                    controller.jobs().search(&text, app.kind);
                }
                InputMode::NewPlaylist => app.create_playlist(&text),
                InputMode::RenamePlaylist => app.rename_selected_playlist(&text),
                InputMode::Normal => {}
            }
        }
        KeyCode::Char(c) if !c.is_control() => app.push_input(c),
        _ => {}
    }
}

fn play_selected<B: MediaBackend + 'static>(app: &mut App, controller: &mut PlaybackController<B>) {
    match app.selected_track().cloned() {
        Some(track) => controller.play(track),
        None => app.notify(Notice::info("No track selected")),
    }
}

fn remove_queue_current<B: MediaBackend + 'static>(
    app: &mut App,
    controller: &mut PlaybackController<B>,
) {
    let queue = controller.queue_mut();
    let Some(index) = queue.current_index() else {
        app.notify(Notice::info("Queue is empty"));
        return;
    };
    let title = queue
        .current()
        .map(|t| t.title_or_unknown().to_string())
        .unwrap_or_default();
    if queue.remove(index) {
        app.notify(Notice::info(format!("Removed '{title}' from queue")));
    }
}

/// Shift the highlighted queue entry one row; the highlight follows it.
fn move_queue_selection<B: MediaBackend + 'static>(
    app: &mut App,
    controller: &mut PlaybackController<B>,
    down: bool,
) {
    let len = controller.queue().len();
    let Some(row) = app.queue_row(len) else {
        app.notify(Notice::info("Queue is empty"));
        return;
    };
    let target = if down { row + 1 } else { row.wrapping_sub(1) };
    if controller.queue_mut().move_track(row, target) {
        if down {
            app.queue_select_next(len);
        } else {
            app.queue_select_prev(len);
        }
    }
}

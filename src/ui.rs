//! UI rendering helpers for the terminal user interface.
//!
//! Everything here is a pure function of the app model and a player
//! snapshot; nothing in this module mutates state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Padding, Paragraph, Row, Table,
        TableState, Wrap,
    },
};

use crate::app::{App, InputMode, progress_line};
use crate::catalog::{Track, format_mss, info_rows, now_playing_line};
use crate::config::Settings;
use crate::player::{LyricsStatus, NoticeLevel, PlayerView};
use crate::queue::QueueStore;

const KEYBINDS: &[(&str, &str)] = &[
    ("/", "new search"),
    ("n/p", "next/previous page"),
    ("j/k", "move selection"),
    ("enter", "play selected"),
    ("space", "play/pause"),
    ("esc", "stop"),
    ("l", "lyrics"),
    ("r", "repeat"),
    ("s", "track info"),
    ("v", "this help"),
    ("a", "add to queue"),
    ("y", "remove from queue"),
    ("z/x", "next/previous in queue"),
    ("c", "clear queue"),
    ("t", "queue panel"),
    (",/.", "move queue selection"),
    ("{/}", "move queued track up/down"),
    ("o", "play queue selection"),
    ("m", "playlists panel"),
    ("J/K", "move playlist selection"),
    ("[/]", "move playlist track selection"),
    ("w/W", "add to/take out of playlist"),
    ("X", "remove playlist track"),
    ("C", "clear playlist"),
    ("N/R/D", "new/rename/delete playlist"),
    ("L", "load playlist into queue"),
    ("q", "quit"),
];

/// Keybinding help lines, with the seek step filled in.
fn keybinds_lines(seek_seconds: u64) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("h/g", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  forward/rewind {seek_seconds}s")),
    ])];
    lines.extend(KEYBINDS.iter().map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("{key:<5}"), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {what}")),
        ])
    }));
    lines
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    player: &PlayerView,
    queue: &QueueStore,
    resolving: bool,
    settings: &Settings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], settings);
    draw_now_playing(frame, player, resolving, chunks[1]);

    let side_panels = usize::from(app.show_queue)
        + usize::from(app.show_playlists)
        + usize::from(player.lyrics_visible);
    let main = if side_panels == 0 {
        draw_results(frame, app, player, chunks[2]);
        chunks[2]
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        draw_results(frame, app, player, columns[0]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, side_panels as u32); side_panels])
            .split(columns[1]);
        let mut slots = rows.iter().copied();
        if app.show_queue {
            if let Some(area) = slots.next() {
                draw_queue(frame, app, queue, area);
            }
        }
        if app.show_playlists {
            if let Some(area) = slots.next() {
                draw_playlists(frame, app, area);
            }
        }
        if player.lyrics_visible {
            if let Some(area) = slots.next() {
                draw_lyrics(frame, app, player, area);
            }
        }
        columns[0]
    };

    if app.show_info {
        draw_info(frame, app, main);
    }
    if app.show_keybinds {
        let area = centered_rect_sized(46, KEYBINDS.len() as u16 + 3, chunks[2]);
        frame.render_widget(Clear, area);
        let help = Paragraph::new(keybinds_lines(settings.playback.seek_seconds)).block(
            Block::bordered()
                .padding(left_pad())
                .title(" keybindings (v closes) "),
        );
        frame.render_widget(help, area);
    }

    draw_bottom(frame, app, chunks[3]);

    let progress = progress_line(
        player.position,
        player.duration,
        player.state,
        chunks[4].width,
    );
    frame.render_widget(
        Paragraph::new(progress).alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, settings: &Settings) {
    let mut text = settings.ui.header_text.clone();
    if !app.query.is_empty() {
        text.push_str(&format!(" • search: '{}'", app.query));
    }
    let header = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" flacterm ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, area);
}

fn draw_now_playing(frame: &mut Frame, player: &PlayerView, resolving: bool, area: Rect) {
    let text = match player.current {
        Some(track) => {
            let mut line = format!("Now Playing: {}", now_playing_line(track));
            if player.repeat {
                line.push_str(" [Repeat ON]");
            }
            line
        }
        None if resolving => "Loading stream...".to_string(),
        None => "Not Playing".to_string(),
    };
    let repeat = if player.repeat { "on" } else { "off" };
    let widget = Paragraph::new(text).block(
        Block::bordered()
            .padding(left_pad())
            .title(format!(" {} • repeat {} ", player.state.label(), repeat)),
    );
    frame.render_widget(widget, area);
}

fn draw_results(frame: &mut Frame, app: &App, player: &PlayerView, area: Rect) {
    let offset = app.page_start();
    let playing_id = player.current.map(|t| t.id.as_str());

    let rows: Vec<Row> = app
        .page_items()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if Some(track.id.as_str()) == playing_id {
                "▶"
            } else {
                ""
            };
            Row::new(vec![
                Cell::from(format!("{}{}", marker, offset + i + 1)),
                Cell::from(track.title_or_unknown().to_string()),
                Cell::from(track.artist_or_unknown().to_string()),
                Cell::from(track.album_or_unknown().to_string()),
                Cell::from(format_mss(track.duration)),
            ])
        })
        .collect();

    let title = if app.searching {
        " results • searching... ".to_string()
    } else if app.results.is_empty() {
        " results • press / to search ".to_string()
    } else {
        format!(
            " results • page {}/{} • {} tracks ",
            app.page() + 1,
            app.total_pages(),
            app.results.len()
        )
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec!["#", "Title", "Artist", "Album", "Time"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");

    let mut state = TableState::default();
    if !app.page_items().is_empty() {
        state.select(Some(app.selected_row()));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_queue(frame: &mut Frame, app: &App, queue: &QueueStore, area: Rect) {
    let items: Vec<ListItem> = if queue.is_empty() {
        vec![ListItem::new("Queue is empty").italic()]
    } else {
        queue
            .tracks()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let item = ListItem::new(format!("{}. {}", i + 1, now_playing_line(t)));
                if Some(i) == queue.current_index() {
                    item.bold()
                } else {
                    item
                }
            })
            .collect()
    };
    let list = List::new(items)
        .block(Block::bordered().title(format!(" queue ({}) ", queue.len())))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(app.queue_row(queue.len()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlists(frame: &mut Frame, app: &App, area: Rect) {
    let names = app.playlists.names();
    let selected = app.selected_playlist();
    let items: Vec<ListItem> = if names.is_empty() {
        vec![ListItem::new("No playlists (N creates one)").italic()]
    } else {
        names
            .iter()
            .map(|name| ListItem::new(format!("{} ({})", name, app.playlists.count(name))))
            .collect()
    };
    let list = List::new(items)
        .block(Block::bordered().title(" playlists "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let tracks = selected
        .as_deref()
        .and_then(|name| app.playlists.get(name))
        .unwrap_or_default();
    let track_items: Vec<ListItem> = if tracks.is_empty() {
        vec![ListItem::new("No tracks").italic()]
    } else {
        tracks
            .iter()
            .enumerate()
            .map(|(i, t)| ListItem::new(format!("{}. {}", i + 1, now_playing_line(t))))
            .collect()
    };
    let track_list = List::new(track_items)
        .block(Block::bordered().title(format!(
            " {} ",
            selected.as_deref().unwrap_or("tracks")
        )))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut state = ListState::default();
    if !names.is_empty() {
        state.select(Some(app.playlist_selected_row()));
    }
    frame.render_stateful_widget(list, halves[0], &mut state);

    let mut track_state = ListState::default();
    if !tracks.is_empty() {
        track_state.select(Some(app.playlist_track_row()));
    }
    frame.render_stateful_widget(track_list, halves[1], &mut track_state);
}

fn draw_lyrics(frame: &mut Frame, app: &App, player: &PlayerView, area: Rect) {
    let block = Block::bordered().padding(left_pad()).title(" lyrics ");
    let placeholder = match player.lyrics_status {
        LyricsStatus::Loading => Some("Loading lyrics..."),
        LyricsStatus::NotFound => Some("No synced lyrics found"),
        LyricsStatus::Failed => Some("Lyrics unavailable"),
        LyricsStatus::Idle => Some(""),
        LyricsStatus::Loaded => None,
    };
    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(text).italic().block(block), area);
        return;
    }

    let lines = player.lyrics.lines();
    let active = player.lyrics.active_index();
    let height = usize::from(area.height.saturating_sub(2)).max(1);
    let start = app
        .lyric_anchor
        .saturating_sub(height / 2)
        .min(lines.len().saturating_sub(height));

    let rendered: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, line)| {
            if Some(i) == active {
                Line::from(line.text.as_str()).bold().fg(Color::Green)
            } else {
                Line::from(line.text.as_str()).dim()
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(rendered)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_info(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(60, 13, area);
    frame.render_widget(Clear, popup);

    let (title, body) = match app.selected_track() {
        Some(track) => (format!(" {} (s closes) ", track.title_or_unknown()), info_text(track)),
        None => (" track info ".to_string(), vec![Line::from("No track selected")]),
    };
    let widget = Paragraph::new(body)
        .block(Block::bordered().padding(left_pad()).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, popup);
}

fn info_text(track: &Track) -> Vec<Line<'static>> {
    info_rows(track)
        .into_iter()
        .map(|(property, value)| {
            Line::from(vec![
                Span::styled(format!("{property:<13}"), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(value),
            ])
        })
        .collect()
}

fn draw_bottom(frame: &mut Frame, app: &App, area: Rect) {
    if app.input_mode != InputMode::Normal {
        let input = Paragraph::new(format!("{}▏", app.input)).block(
            Block::bordered()
                .padding(left_pad())
                .title(format!(" {} (enter submits, esc cancels) ", app.input_mode.prompt())),
        );
        frame.render_widget(input, area);
        return;
    }

    let line = match app.notices().last() {
        Some(notice) => {
            let style = match notice.level {
                NoticeLevel::Info => Style::default(),
                NoticeLevel::Warn => Style::default().fg(Color::Yellow),
                NoticeLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(notice.text.clone(), style)
        }
        None => Line::from("[v] keybindings • [q] quit").dim(),
    };
    let widget = Paragraph::new(line).block(Block::bordered().padding(left_pad()));
    frame.render_widget(widget, area);
}

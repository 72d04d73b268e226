use crate::controller::SearchState;
use crate::cycler::ImageCycler;
use crate::models::PokemonRecord;
use crate::sprites::SpriteCache;
use crate::utils::{format_name, prefers_dark_text, type_colour};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Submit(String),
    Quit,
}

/// Presentation state. The search state itself lives in the controller and
/// is passed in for every frame.
pub struct App {
    pub query: String,
    pub search_mode: bool,
    pub show_help: bool,
    pub cycler: ImageCycler,
    pub sprites: SpriteCache,
}

impl App {
    pub fn new(query: String, sprites: SpriteCache, cycle_period: Duration) -> Self {
        Self {
            query,
            search_mode: true,
            show_help: false,
            cycler: ImageCycler::new(cycle_period),
            sprites,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return AppAction::Quit;
        }

        if self.search_mode {
            match key.code {
                KeyCode::Enter => {
                    self.search_mode = false;
                    return AppAction::Submit(self.query.clone());
                }
                KeyCode::Esc => self.search_mode = false,
                KeyCode::Backspace => {
                    self.query.pop();
                }
                KeyCode::Char(c) => self.query.push(c),
                _ => {}
            }
            return AppAction::None;
        }

        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('/') => self.search_mode = true,
            KeyCode::Enter | KeyCode::Char('r') => return AppAction::Submit(self.query.clone()),
            KeyCode::Char('c') => self.cycler.toggle(),
            KeyCode::F(1) | KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Esc => self.show_help = false,
            _ => {}
        }
        AppAction::None
    }

    /// Called when a new record becomes the current result.
    pub fn show_record(&mut self, record: &PokemonRecord) {
        self.cycler.reset();
        self.sprites.retain(&record.image_urls);
        for url in &record.image_urls {
            self.sprites.request(url);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.cycler.tick(now);
    }
}

pub fn draw_ui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &App,
    state: &SearchState,
) -> io::Result<()> {
    terminal.draw(|f| draw_frame(f, app, state)).map(|_| ())
}

fn draw_frame<B: Backend>(f: &mut Frame<B>, app: &App, state: &SearchState) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    let input = if app.search_mode {
        Spans::from(vec![
            Span::raw(app.query.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else {
        Spans::from(Span::styled(
            app.query.clone(),
            Style::default().fg(Color::Gray),
        ))
    };
    let search_style = if app.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(vec![input]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title("Search Pokemon"),
    );
    f.render_widget(search, chunks[0]);

    draw_body(f, chunks[1], app, state);

    let hint = if app.search_mode {
        "Enter search  Esc stop typing"
    } else {
        "/ edit  Enter/r search  c cycle images  h help  q quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        chunks[2],
    );

    if app.show_help {
        let popup = centered_rect(60, 50, size);
        let help_lines = vec![
            Spans::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::raw("")),
            Spans::from(Span::raw("/          Edit the search text")),
            Spans::from(Span::raw("Enter      Search (ends editing)")),
            Spans::from(Span::raw("Esc        Stop editing / close help")),
            Spans::from(Span::raw("r          Search again")),
            Spans::from(Span::raw("c          Toggle image cycling")),
            Spans::from(Span::raw("h / F1     Toggle this help")),
            Spans::from(Span::raw("q          Quit")),
        ];
        let help = Paragraph::new(help_lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, popup);
        f.render_widget(help, popup);
    }
}

fn draw_body<B: Backend>(f: &mut Frame<B>, area: Rect, app: &App, state: &SearchState) {
    match state {
        SearchState::Idle => {
            let p = Paragraph::new(Span::styled(
                "Please Search for a Pokemon",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Pokémon"));
            f.render_widget(p, area);
        }
        SearchState::Loading => {
            let p = Paragraph::new(Span::styled(
                "Fetching Pokemon...",
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Pokémon"));
            f.render_widget(p, area);
        }
        SearchState::Failure { message, .. } => {
            let p = Paragraph::new(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title("Error"),
            );
            f.render_widget(p, area);
        }
        SearchState::Success(record) => draw_record(f, area, app, record),
    }
}

fn draw_record<B: Backend>(f: &mut Frame<B>, area: Rect, app: &App, record: &PokemonRecord) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(10)])
        .split(area);

    let sprite_rect = chunks[0];
    let title = if app.cycler.is_enabled() && record.image_urls.len() > 1 {
        format!(
            "Sprite {}/{}",
            app.cycler.index() % record.image_urls.len() + 1,
            record.image_urls.len()
        )
    } else {
        "Sprite".to_string()
    };
    let sprite_block = Block::default().borders(Borders::ALL).title(title);

    let sprite_para = match app.cycler.current(&record.image_urls) {
        None => Paragraph::new("(no artwork)"),
        Some(url) => {
            let w = sprite_rect.width.saturating_sub(2).clamp(1, 64) as u32;
            let h = sprite_rect.height.saturating_sub(2).clamp(1, 64) as u32;
            match app.sprites.pixels(url, w, h) {
                Some(rows) => {
                    let lines: Vec<Spans> = rows
                        .iter()
                        .map(|row| {
                            Spans::from(
                                row.iter()
                                    .map(|cell| match cell {
                                        Some((r, g, b)) => Span::styled(
                                            " ",
                                            Style::default().bg(Color::Rgb(*r, *g, *b)),
                                        ),
                                        None => Span::raw(" "),
                                    })
                                    .collect::<Vec<_>>(),
                            )
                        })
                        .collect();
                    Paragraph::new(lines)
                }
                None if app.sprites.is_pending(url) => Paragraph::new("(loading sprite)"),
                None => Paragraph::new("(no sprite)"),
            }
        }
    };
    f.render_widget(sprite_para.block(sprite_block), sprite_rect);

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut info_lines: Vec<Spans> = vec![
        Spans::from(Span::styled(format_name(&record.name), heading)),
        Spans::from(Span::raw("")),
        Spans::from(Span::styled("Abilities", heading)),
    ];
    if record.abilities.is_empty() {
        info_lines.push(Spans::from(Span::raw("  none listed")));
    }
    for ability in &record.abilities {
        info_lines.push(Spans::from(Span::raw(format!("  {}", format_name(ability)))));
    }
    info_lines.push(Spans::from(Span::raw("")));
    info_lines.push(Spans::from(Span::styled("Types", heading)));

    let mut type_spans: Vec<Span> = vec![Span::raw("  ")];
    for (i, t) in record.types.iter().enumerate() {
        let (r, g, b) = type_colour(t);
        let fg = if prefers_dark_text((r, g, b)) {
            Color::Black
        } else {
            Color::White
        };
        type_spans.push(Span::styled(
            format!(" {} ", format_name(t)),
            Style::default().fg(fg).bg(Color::Rgb(r, g, b)),
        ));
        if i + 1 < record.types.len() {
            type_spans.push(Span::raw(" "));
        }
    }
    info_lines.push(Spans::from(type_spans));

    let info = Paragraph::new(info_lines)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: false });
    f.render_widget(info, chunks[1]);
}

// helper to compute a centered rect for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_w = r.width.saturating_mul(percent_x) / 100;
    let popup_h = r.height.saturating_mul(percent_y) / 100;
    let popup_x = r.x + (r.width.saturating_sub(popup_w) / 2);
    let popup_y = r.y + (r.height.saturating_sub(popup_h) / 2);
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

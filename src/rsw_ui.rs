// Terminal UI: rendering and event handling. This layer owns the event
// loop, forwards discrete actions (reveal, flag, restart, difficulty
// change) to the game engine and derives every glyph and color it draws
// from the engine's CellView values.

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::rngs::ThreadRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::rsw_color;
use crate::rsw_game::{CellView, Difficulty, GameSession, Status};

// Runtime UI state, grouped so it can be reset wholesale on a new game
struct UiState {
    cursor: (usize, usize),                // keyboard/mouse cursor (row, col)
    left_press: Option<(usize, usize)>,    // cell where the left button went down
    right_press: Option<(usize, usize)>,   // cell where the right button went down
    hit_cell: Option<(usize, usize)>,      // the mine that ended the game, from RevealResult
    showing_difficulty: bool,
    startup: bool, // difficulty dialog shown at startup; cancelling it exits
    showing_help: bool,
    showing_result: bool, // win/loss dialog
    difficulty_hover: usize,
}

impl UiState {
    fn new() -> Self {
        UiState {
            cursor: (0, 0),
            left_press: None,
            right_press: None,
            hit_cell: None,
            showing_difficulty: false,
            startup: false,
            showing_help: false,
            showing_result: false,
            difficulty_hover: 0,
        }
    }

    fn reset_after_new_game(&mut self) {
        self.startup = false;
        self.cursor = (0, 0);
        self.left_press = None;
        self.right_press = None;
        self.hit_cell = None;
        self.showing_difficulty = false;
        self.showing_help = false;
        self.showing_result = false;
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), Box<dyn Error>> {
    let mut rng = rand::thread_rng();
    let mut difficulty = Difficulty::Easy;
    // The session behind the startup dialog is replaced as soon as the
    // player picks a difficulty.
    let mut session = GameSession::from_difficulty(difficulty, &mut rng);

    let mut ui = UiState::new();
    ui.showing_difficulty = true;
    ui.startup = true;
    ui.difficulty_hover = 0;

    let menu_items = [
        ("F1", "Help"),
        ("F2", "New"),
        ("F5", "Difficulty"),
        ("Esc", "Exit"),
    ];
    let mut board_rect: Option<Rect> = None;
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| {
            let size = f.size();
            let min_twidth = (session.cols() * 2 + 5).max(60) as u16;
            let min_theight = (session.rows() + 8).max(16) as u16;
            // If the terminal is too small, render a centered warning and skip normal UI
            if size.width < min_twidth || size.height < min_theight {
                let warn_lines = vec![
                    Spans::from(Span::raw("Terminal size too small.")),
                    Spans::from(Span::raw(format!(
                        "Minimum required: {} x {}",
                        min_twidth, min_theight
                    ))),
                ];
                let warn = Paragraph::new(Text::from(warn_lines))
                    .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
                    .alignment(Alignment::Center);
                f.render_widget(Clear, size);
                let w = 40u16.min(size.width.saturating_sub(2));
                let h = 5u16.min(size.height.saturating_sub(2));
                f.render_widget(warn, center_rect(w, h, size));
                board_rect = None;
                return;
            }

            // layout: top menu row, center board, bottom status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(0)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Min(6),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(size);

            // menu row
            let mut spans_vec: Vec<Span> = vec![Span::raw(" ")];
            for (i, (key, rest)) in menu_items.iter().take(3).enumerate() {
                if i > 0 {
                    spans_vec.push(Span::raw("   "));
                }
                spans_vec.push(Span::styled(
                    key.to_string(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ));
                spans_vec.push(Span::raw(format!(": {}", rest)));
            }
            let menu = Paragraph::new(Spans::from(spans_vec))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(menu, chunks[0]);

            // status row: flag counter and terminal message left, Esc: Exit right
            let left_text = match session.status_message() {
                Some(message) => format!(" ⚑ {}   {} ", session.flags_remaining(), message),
                None => format!(" ⚑ {} ", session.flags_remaining()),
            };
            let (esc_key, esc_rest) = menu_items[3];
            let inner_w = chunks[2].width.saturating_sub(2) as usize;
            let right_w = esc_key.width() + 2 + esc_rest.width();
            let left_w = left_text.as_str().width();
            let mid_spaces = if inner_w > left_w + right_w + 1 {
                inner_w - left_w - right_w - 1
            } else {
                1
            };
            let status_spans = vec![
                Span::raw(left_text),
                Span::raw(" ".repeat(mid_spaces)),
                Span::styled(
                    esc_key.to_string(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(": {} ", esc_rest)),
            ];
            let status = Paragraph::new(Spans::from(status_spans))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Left);
            f.render_widget(status, chunks[2]);

            // board area: two columns per cell plus border padding
            let board_area = centered_block(
                (session.cols() * 2 + 3) as u16,
                (session.rows() + 2) as u16,
                chunks[1],
            );
            board_rect = Some(board_area);
            let mut lines = vec![];
            for row in 0..session.rows() {
                let mut spans = vec![];
                for col in 0..session.cols() {
                    let (glyph, style) = cell_appearance(&session, &ui, row, col);
                    spans.push(Span::styled(format!(" {}", glyph), style));
                }
                spans.push(Span::styled(" ", Style::default().bg(rsw_color::revealed_bg())));
                lines.push(Spans::from(spans));
            }
            let board = Paragraph::new(Text::from(lines))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(difficulty.name())
                        .title_alignment(Alignment::Center),
                )
                .alignment(Alignment::Left);
            f.render_widget(board, board_area);

            // modals
            if ui.showing_difficulty {
                let mrect = centered_block(40, 9, size);
                f.render_widget(Clear, mrect);
                f.render_widget(
                    Block::default().borders(Borders::ALL).title("Select Difficulty"),
                    mrect,
                );
                let inner = Rect::new(
                    mrect.x + 1,
                    mrect.y + 1,
                    mrect.width.saturating_sub(2),
                    mrect.height.saturating_sub(2),
                );
                let mut lines = vec![Spans::from(Span::raw(""))];
                for (i, d) in Difficulty::ALL.iter().enumerate() {
                    let (rows, cols, mines) = d.params();
                    let mark = if i == ui.difficulty_hover { "*" } else { " " };
                    let text = format!(
                        " {} ){} {:<8} {:>2}x{:<2}  {} mines",
                        i + 1,
                        mark,
                        d.name(),
                        rows,
                        cols,
                        mines
                    );
                    if i == ui.difficulty_hover {
                        lines.push(Spans::from(Span::styled(
                            text,
                            Style::default()
                                .bg(rsw_color::cursor_bg())
                                .fg(Color::Black)
                                .add_modifier(Modifier::BOLD),
                        )));
                    } else {
                        lines.push(Spans::from(Span::raw(text)));
                    }
                }
                lines.push(Spans::from(Span::raw("")));
                let hint = if ui.startup {
                    " Enter: start   Esc: quit"
                } else {
                    " Enter: start   Esc: back"
                };
                lines.push(Spans::from(Span::styled(
                    hint,
                    Style::default().fg(Color::DarkGray),
                )));
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
            }

            if ui.showing_help {
                let mrect = centered_block(46, 10, size);
                f.render_widget(Clear, mrect);
                f.render_widget(Block::default().borders(Borders::ALL).title("Help"), mrect);
                let inner = Rect::new(
                    mrect.x + 1,
                    mrect.y + 1,
                    mrect.width.saturating_sub(2),
                    mrect.height.saturating_sub(2),
                );
                let help_lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(" Controls:")),
                    Spans::from(Span::raw("  Mouse | Arrows  - move cursor")),
                    Spans::from(Span::raw("  L-Click | Space - reveal")),
                    Spans::from(Span::raw("  R-Click | F     - toggle flag")),
                    Spans::from(Span::raw("  F2              - restart")),
                    Spans::from(Span::raw("  F5              - change difficulty")),
                ];
                let p = Paragraph::new(Text::from(help_lines)).alignment(Alignment::Left);
                f.render_widget(p, inner);
            }

            if ui.showing_result {
                let won = session.status() == Status::Won;
                let mrect = bottom_centered_block(40, 7, size);
                f.render_widget(Clear, mrect);
                f.render_widget(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(if won { "Success" } else { "Failure" }),
                    mrect,
                );
                let inner = Rect::new(
                    mrect.x + 1,
                    mrect.y + 1,
                    mrect.width.saturating_sub(2),
                    mrect.height.saturating_sub(2),
                );
                let message = session.status_message().unwrap_or("");
                let lines = vec![
                    Spans::from(Span::raw("")),
                    Spans::from(Span::styled(
                        message,
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::styled(
                        "Press any key for a new game",
                        Style::default().fg(Color::DarkGray),
                    )),
                ];
                let p = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                f.render_widget(p, inner);
            }
        })?;

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) => {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if ui.showing_difficulty {
                    match code {
                        KeyCode::Char('1') => {
                            start_new_game(&mut session, &mut ui, Difficulty::Easy, &mut rng);
                            difficulty = Difficulty::Easy;
                        }
                        KeyCode::Char('2') => {
                            start_new_game(&mut session, &mut ui, Difficulty::Medium, &mut rng);
                            difficulty = Difficulty::Medium;
                        }
                        KeyCode::Char('3') => {
                            start_new_game(&mut session, &mut ui, Difficulty::Hard, &mut rng);
                            difficulty = Difficulty::Hard;
                        }
                        KeyCode::Up => {
                            ui.difficulty_hover = if ui.difficulty_hover == 0 {
                                Difficulty::ALL.len() - 1
                            } else {
                                ui.difficulty_hover - 1
                            };
                        }
                        KeyCode::Down => {
                            ui.difficulty_hover = (ui.difficulty_hover + 1) % Difficulty::ALL.len();
                        }
                        KeyCode::Enter | KeyCode::Char(' ') => {
                            let chosen = Difficulty::ALL[ui.difficulty_hover];
                            start_new_game(&mut session, &mut ui, chosen, &mut rng);
                            difficulty = chosen;
                        }
                        KeyCode::Esc => {
                            // The startup dialog is the original's entry
                            // dialog: cancelling it quits the program.
                            if ui.startup {
                                break;
                            }
                            ui.showing_difficulty = false;
                        }
                        _ => {}
                    }
                } else if ui.showing_help {
                    ui.showing_help = false;
                } else if ui.showing_result {
                    // Any key starts a fresh game with the same dimensions
                    start_new_game(&mut session, &mut ui, difficulty, &mut rng);
                } else {
                    match code {
                        KeyCode::Esc => break,
                        KeyCode::F(1) => ui.showing_help = true,
                        KeyCode::F(2) => {
                            start_new_game(&mut session, &mut ui, difficulty, &mut rng);
                        }
                        KeyCode::F(5) => {
                            ui.difficulty_hover = Difficulty::ALL
                                .iter()
                                .position(|d| *d == difficulty)
                                .unwrap_or(0);
                            ui.showing_difficulty = true;
                        }
                        KeyCode::Left => {
                            ui.cursor.1 = ui.cursor.1.saturating_sub(1);
                        }
                        KeyCode::Right => {
                            ui.cursor.1 = (ui.cursor.1 + 1).min(session.cols() - 1);
                        }
                        KeyCode::Up => {
                            ui.cursor.0 = ui.cursor.0.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            ui.cursor.0 = (ui.cursor.0 + 1).min(session.rows() - 1);
                        }
                        KeyCode::Char(' ') | KeyCode::Enter => {
                            let (row, col) = ui.cursor;
                            apply_reveal(&mut session, &mut ui, row, col);
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            let (row, col) = ui.cursor;
                            session.toggle_flag(row, col);
                        }
                        _ => {}
                    }
                }
            }
            Event::Mouse(me) => {
                // Modals are keyboard-driven; a click dismisses the
                // result dialog like any key does.
                if ui.showing_difficulty || ui.showing_help {
                    continue;
                }
                if ui.showing_result {
                    if let MouseEventKind::Down(_) = me.kind {
                        start_new_game(&mut session, &mut ui, difficulty, &mut rng);
                    }
                    continue;
                }
                let Some(brect) = board_rect else { continue };
                let cell = cell_at(&session, brect, me.column, me.row);
                match me.kind {
                    MouseEventKind::Moved => {
                        if let Some(c) = cell {
                            ui.cursor = c;
                        }
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        ui.left_press = cell;
                        if let Some(c) = cell {
                            ui.cursor = c;
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        // Reveal only when press and release land on the same cell
                        if let (Some((pr, pc)), Some((r, c))) = (ui.left_press, cell) {
                            if (pr, pc) == (r, c) {
                                apply_reveal(&mut session, &mut ui, r, c);
                            }
                        }
                        ui.left_press = None;
                    }
                    MouseEventKind::Down(MouseButton::Right) => {
                        ui.right_press = cell;
                    }
                    MouseEventKind::Up(MouseButton::Right) => {
                        if let (Some((pr, pc)), Some((r, c))) = (ui.right_press, cell) {
                            if (pr, pc) == (r, c) {
                                session.toggle_flag(r, c);
                            }
                        }
                        ui.right_press = None;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Replace the session wholesale and reset the runtime UI state. Restart
/// and difficulty change are both teardown + fresh construction; no
/// partial state survives.
fn start_new_game(
    session: &mut GameSession,
    ui: &mut UiState,
    difficulty: Difficulty,
    rng: &mut ThreadRng,
) {
    *session = GameSession::from_difficulty(difficulty, rng);
    ui.reset_after_new_game();
}

/// Forward a reveal to the engine and pick up what the UI needs from the
/// result: the triggered mine for highlighting, and whether the game
/// just ended.
fn apply_reveal(session: &mut GameSession, ui: &mut UiState, row: usize, col: usize) {
    let result = session.reveal(row, col);
    for &(r, c, view) in &result.changed {
        if view == CellView::MineHit {
            ui.hit_cell = Some((r, c));
        }
    }
    if result.status != Status::InProgress {
        ui.showing_result = true;
    }
}

/// Glyph and style for one board cell, derived from the engine's view
fn cell_appearance(
    session: &GameSession,
    ui: &UiState,
    row: usize,
    col: usize,
) -> (&'static str, Style) {
    static DIGITS: [&str; 8] = ["1", "2", "3", "4", "5", "6", "7", "8"];
    let (glyph, mut style) = match session.view(row, col) {
        CellView::Hidden => (
            "■",
            Style::default()
                .fg(Color::Gray)
                .bg(rsw_color::hidden_bg(row, col)),
        ),
        CellView::Flag => (
            "⚑",
            Style::default()
                .fg(rsw_color::flag_fg())
                .bg(rsw_color::hidden_bg(row, col)),
        ),
        CellView::Blank => (" ", Style::default().bg(rsw_color::revealed_bg())),
        CellView::Number(n) => (
            DIGITS[(n as usize - 1).min(7)],
            Style::default()
                .fg(rsw_color::digit(n))
                .bg(rsw_color::revealed_bg())
                .add_modifier(Modifier::BOLD),
        ),
        CellView::Mine | CellView::MineHit => (
            "☼",
            Style::default()
                .fg(rsw_color::mine_fg())
                .bg(rsw_color::revealed_bg()),
        ),
    };
    if ui.hit_cell == Some((row, col)) {
        style = style.bg(rsw_color::mine_hit_bg()).fg(Color::White);
    }
    if ui.cursor == (row, col) && session.status() == Status::InProgress {
        style = style.bg(rsw_color::cursor_bg());
    }
    (glyph, style)
}

/// Map a mouse position to a board cell, if it lies inside the board
fn cell_at(session: &GameSession, brect: Rect, column: u16, row: u16) -> Option<(usize, usize)> {
    let inner = Rect::new(
        brect.x + 1,
        brect.y + 1,
        brect.width.saturating_sub(2),
        brect.height.saturating_sub(2),
    );
    let inside = column >= inner.x
        && column <= inner.x + inner.width.saturating_sub(1)
        && row >= inner.y
        && row <= inner.y + inner.height.saturating_sub(1);
    if !inside {
        return None;
    }
    let local_x = column as i32 - inner.x as i32;
    let cell_col = (local_x / 2) as usize;
    let cell_row = (row - inner.y) as usize;
    if cell_row < session.rows() && cell_col < session.cols() {
        Some((cell_row, cell_col))
    } else {
        None
    }
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn centered_block(w: u16, h: u16, r: Rect) -> Rect {
    center_rect(w, h, r)
}

fn bottom_centered_block(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + r.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}

use std::env;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use leaderboard_terminal::dataset::{
    ChartSeries, VisualizationKind, pie_type_label, visualization_label,
};
use leaderboard_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};
use leaderboard_terminal::stats::stat_label;
use leaderboard_terminal::{fake_feed, feed, leaderboard_fetch};

const DEFAULT_EXPORT_PATH: &str = "leaderboard_stats.xlsx";

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_selected(),
            KeyCode::Char('a') => self.state.select_all(),
            KeyCode::Char('n') => self.state.select_none(),
            KeyCode::Char('v') => self.state.cycle_visualization(),
            KeyCode::Char('t') => self.state.cycle_pie_type(),
            KeyCode::Char('s') => self.state.cycle_stat(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.state.refresh(),
            KeyCode::Char('u') | KeyCode::Char('U') => self.request_roster(true),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    /// Ship any queued stats fetch to the provider. Called once per tick so
    /// several selection changes in one tick collapse into a single fetch.
    fn dispatch_stats_request(&mut self) {
        let Some(req) = self.state.take_stats_request() else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Stats fetch unavailable");
            return;
        };
        if tx
            .send(ProviderCommand::FetchStats {
                seq: req.seq,
                usernames: req.usernames,
                force_refresh: req.force_refresh,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Stats request failed");
        }
    }

    fn request_roster(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Roster fetch unavailable");
            }
            return;
        };
        if tx.send(ProviderCommand::FetchValidPlayers).is_err() {
            if announce {
                self.state.push_log("[WARN] Roster request failed");
            }
        } else if announce {
            self.state.push_log("[INFO] Roster request sent");
        }
    }

    fn request_export(&mut self, announce: bool) {
        if self.state.player_stats.is_empty() {
            if announce {
                self.state.push_log("[INFO] Nothing to export yet");
            }
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Export unavailable");
            }
            return;
        };
        let path = env::var("LEADERBOARD_EXPORT_PATH")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string());
        if tx
            .send(ProviderCommand::ExportStats {
                path: path.clone(),
                stats: self.state.player_stats.clone(),
            })
            .is_err()
        {
            if announce {
                self.state.push_log("[WARN] Export request failed");
            }
        } else if announce {
            self.state.push_log(format!("[INFO] Export started: {path}"));
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if leaderboard_fetch::http_source_configured() {
        feed::spawn_provider(tx, cmd_rx);
    } else {
        fake_feed::spawn_fake_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.dispatch_stats_request();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(chunks[1]);

    render_players(frame, body[0], &app.state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(5)])
        .split(body[1]);

    match app.state.visualization {
        VisualizationKind::Table => render_table(frame, right[0], &app.state),
        VisualizationKind::Pie => render_chart(frame, right[0], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, right[1]);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let viz = match state.visualization {
        VisualizationKind::Table => visualization_label(state.visualization).to_string(),
        VisualizationKind::Pie => format!(
            "{} ({})",
            visualization_label(state.visualization),
            pie_type_label(state.pie_type)
        ),
    };
    let fetched = match state.last_fetched_at {
        Some(at) => format!(" | Fetched {}", format_clock(at)),
        None => String::new(),
    };
    let title = format!(
        "LEADERBOARD | {} | Stat: {} | {}/{} players{}",
        viz,
        stat_label(state.selected_stat),
        state.selected_usernames.len(),
        state.valid_usernames.len(),
        fetched
    );
    let line1 = format!("  ___  {title}");
    let line2 = " (_*_)".to_string();
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.visualization {
        VisualizationKind::Table => {
            "v Chart | s Stat | j/k Move | Space Select | a All | n None | r Refresh | u Roster | e Export | ? Help | q Quit"
                .to_string()
        }
        VisualizationKind::Pie => {
            "v Table | t Pie type | s Stat | j/k Move | Space Select | r Refresh | e Export | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Players").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.valid_usernames.is_empty() {
        let empty =
            Paragraph::new("No players resolved").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height == 0 {
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.cursor, state.valid_usernames.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let name = &state.valid_usernames[idx];
        let mark = if state.is_selected(name) { "[x]" } else { "[ ]" };
        let style = if idx == state.cursor {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let line = Paragraph::new(format!("{mark} {name}")).style(style);
        frame.render_widget(line, row_area);
    }
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Stats Table").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dataset = &state.dataset;
    if dataset.labels.is_empty() {
        let empty = Paragraph::new("No stats yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height < 2 {
        return;
    }

    let mut widths = vec![Constraint::Min(14)];
    widths.extend(dataset.series.iter().map(|_| Constraint::Length(10)));

    let header_area = Rect {
        height: 1,
        ..inner
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.clone())
        .split(header_area);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, cols[0], "Player", bold);
    for (i, series) in dataset.series.iter().enumerate() {
        render_cell_text(frame, cols[i + 1], &series.label, bold);
    }

    let rows_visible = (inner.height - 1) as usize;
    for (row, label) in dataset.labels.iter().take(rows_visible).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + 1 + row as u16,
            width: inner.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);
        render_cell_text(frame, cols[0], label, Style::default());
        for (i, series) in dataset.series.iter().enumerate() {
            let value = series.values.get(row).copied().unwrap_or_default();
            render_cell_text(frame, cols[i + 1], &format_stat_value(value), Style::default());
        }
    }
}

fn render_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(
        "{} · {}",
        pie_type_label(state.pie_type),
        stat_label(state.selected_stat)
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dataset = &state.dataset;
    let Some(series) = dataset.series.first() else {
        let empty = Paragraph::new("No stats yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };
    if inner.height == 0 {
        return;
    }

    let chart = stat_bar_chart(&dataset.labels, series);
    frame.render_widget(chart, inner);
}

/// One horizontal bar per player, scaled to its share of the series total.
/// Non-zero shares always get at least one cell so small slices stay visible.
fn stat_bar_chart(labels: &[String], series: &ChartSeries) -> BarChart<'static> {
    let total: f64 = series.values.iter().sum();

    let bars: Vec<Bar> = labels
        .iter()
        .zip(series.values.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let share = if total > 0.0 { value / total } else { 0.0 };
            let permille = ((share * 1000.0).round() as u64).max(1);
            let color = series
                .point_colors
                .get(i)
                .copied()
                .unwrap_or(Color::White);
            Bar::default()
                .value(permille)
                .text_value(format!("{label} {:.1}%", share * 100.0))
                .style(Style::default().fg(color))
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .group_gap(0)
        .max(1000)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn format_stat_value(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn format_clock(at: SystemTime) -> String {
    let local: DateTime<Local> = at.into();
    local.format("%H:%M:%S").to_string()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Leaderboard Terminal - Help",
        "",
        "Selection:",
        "  j/k or ↑/↓   Move cursor",
        "  Space/Enter  Toggle player",
        "  a            Select all",
        "  n            Select none",
        "",
        "Visualization:",
        "  v            Table / Chart",
        "  t            Pie / Doughnut",
        "  s            Cycle stat",
        "",
        "Data:",
        "  r            Refresh stats (bypass cache)",
        "  u            Re-resolve roster",
        "  e            Export to xlsx",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

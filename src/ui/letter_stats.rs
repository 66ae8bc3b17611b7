use letterdrill::{selector::slow_set, LetterStat};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::App;

pub struct LetterRowData {
    pub letter: char,
    pub stat: LetterStat,
    pub in_slow_set: bool,
}

/// Pure presenter for a single letter row
pub fn present_row(data: &LetterRowData, fast_ms: u64, medium_ms: u64) -> Row<'static> {
    let letter_display = if data.letter == ' ' {
        "SPACE".to_string()
    } else {
        data.letter.to_string()
    };

    let (avg_display, avg_color) = match data.stat.avg_ms() {
        Some(avg) if avg <= fast_ms as f64 => (format!("{avg:.0}"), Color::Green),
        Some(avg) if avg <= medium_ms as f64 => (format!("{avg:.0}"), Color::Yellow),
        Some(avg) => (format!("{avg:.0}"), Color::Red),
        None => ("—".to_string(), Color::DarkGray),
    };

    let miss_rate = data.stat.miss_rate();
    let miss_color = if miss_rate == 0.0 {
        Color::Green
    } else if miss_rate < 10.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(letter_display).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(avg_display).style(Style::default().fg(avg_color)),
        Cell::from(data.stat.timed_count.to_string()),
        Cell::from(data.stat.hits.to_string()),
        Cell::from(format!("{miss_rate:.1}")).style(Style::default().fg(miss_color)),
        Cell::from(if data.in_slow_set { "★" } else { "" })
            .style(Style::default().fg(Color::Magenta)),
    ])
}

/// Rows for every pool letter, slowest first; letters without timing go last
pub fn letter_rows(app: &App) -> Vec<LetterRowData> {
    let slowest = slow_set(&app.pool, &app.stats, app.settings.slow_n);
    let mut rows: Vec<LetterRowData> = app
        .pool
        .iter()
        .map(|&letter| LetterRowData {
            letter,
            stat: app.stats.get(letter).copied().unwrap_or_default(),
            in_slow_set: slowest.contains(&letter),
        })
        .collect();
    rows.sort_by(|a, b| {
        let a_avg = a.stat.avg_ms().unwrap_or(-1.0);
        let b_avg = b.stat.avg_ms().unwrap_or(-1.0);
        b_avg.partial_cmp(&a_avg).unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// Render the per-letter statistics screen
pub fn render_letter_stats(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Stats table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new("Letter Statistics (slowest first)")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let rows: Vec<Row> = letter_rows(app)
        .iter()
        .map(|data| present_row(data, app.settings.fast_ms, app.settings.medium_ms))
        .collect();

    let header = Row::new(vec!["Letter", "Avg ms", "Timed", "Hits", "Miss %", "Slow"])
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, chunks[1]);

    let instructions = Paragraph::new("(tab) back to drill / (→) new run / (esc)ape")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

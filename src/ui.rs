pub mod letter_stats;

use letterdrill::{InputOutcome, Speed};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    match app.state {
        AppState::Drilling => render_drill(app, f),
        AppState::LetterStats => letter_stats::render_letter_stats(app, f),
    }
}

pub fn speed_color(speed: Speed) -> Color {
    match speed {
        Speed::Fast => Color::Green,
        Speed::Medium => Color::Yellow,
        Speed::Slow => Color::Red,
    }
}

fn render_drill(app: &App, f: &mut Frame) {
    let area = f.area();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // pool
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // queue
            Constraint::Length(1), // padding
            Constraint::Length(1), // last outcome
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // session numbers
            Constraint::Length(1), // legend
        ])
        .split(area);

    let pool: String = app.pool.iter().collect();
    let header = Paragraph::new(Span::styled(
        format!(
            "drilling: {pool}   slow bias {}% of top {}",
            app.settings.slow_pct, app.settings.slow_n
        ),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let target_style = bold_style
        .add_modifier(Modifier::UNDERLINED)
        .fg(if app.session.mistake_on_current() {
            Color::Red
        } else {
            Color::White
        });
    let mut spans = Vec::with_capacity(app.session.queue().len() * 2);
    for (idx, letter) in app.session.queue().iter().enumerate() {
        if idx == 0 {
            spans.push(Span::styled(letter.to_string(), target_style));
        } else {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(letter.to_string(), dim_bold_style));
        }
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        chunks[2],
    );

    if let Some(ref last) = app.tally.last {
        f.render_widget(
            Paragraph::new(outcome_line(last)).alignment(Alignment::Center),
            chunks[4],
        );
    }

    let accuracy = app
        .session
        .accuracy()
        .map_or("-".to_string(), |a| format!("{a}%"));
    let lpm = app.session.lpm().map_or("-".to_string(), |l| l.to_string());
    let avg = match (app.tally.mean_ms(), app.tally.std_dev_ms()) {
        (Some(mean), Some(sd)) => format!("{mean:.0} ms ±{sd:.0}"),
        _ => "-".to_string(),
    };
    let numbers = Paragraph::new(Line::from(vec![
        Span::styled(format!("{accuracy} acc   {lpm} lpm   avg {avg}   "), bold_style),
        Span::styled(format!("{} fast ", app.tally.fast), Style::default().fg(Color::Green)),
        Span::styled(format!("{} medium ", app.tally.medium), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{} slow", app.tally.slow), Style::default().fg(Color::Red)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(numbers, chunks[6]);

    let legend = Paragraph::new(Span::styled(
        "(tab) letter stats / (→) new run / (esc)ape",
        italic_style,
    ));
    f.render_widget(legend, chunks[7]);
}

fn outcome_line(outcome: &InputOutcome) -> Line<'static> {
    if !outcome.hit {
        return Line::from(Span::styled(
            format!("✗ {}", outcome.letter),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    match outcome.speed {
        Some(speed) => Line::from(vec![
            Span::styled(
                format!("✓ {}  ", outcome.letter),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{speed} {} ms", outcome.time_ms),
                Style::default().fg(speed_color(speed)),
            ),
        ]),
        None => Line::from(Span::styled(
            format!("✓ {}  untimed", outcome.letter),
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
}

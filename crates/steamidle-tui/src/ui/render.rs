use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use steamidle_core::StatusSnapshot;

use super::styles;

const TITLE: &str = " Steam Idler - Active ";
const CANCEL_HINT: &str = "[Ctrl+C to exit]";

/// Width of the label column, so values line up.
const LABEL_WIDTH: usize = 13;

pub fn render(frame: &mut Frame, status: &StatusSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Status block
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(frame.area());

    let started = status.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    let account = if status.display_name == status.account_name {
        status.account_name.clone()
    } else {
        format!("{} ({})", status.display_name, status.account_name)
    };

    let lines = vec![
        field("Account:", account, styles::value_style()),
        field("App ID:", status.app_ids.to_string(), styles::value_style()),
        field("Time:", status.elapsed_display(), styles::elapsed_style()),
        field("Hours:", status.hours_display(), styles::elapsed_style()),
        field("Started:", started.to_string(), styles::muted_style()),
    ];

    let block = Block::bordered()
        .title(Span::styled(TITLE, styles::title_style()))
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    let hint = Paragraph::new(Line::from(Span::styled(CANCEL_HINT, styles::muted_style())));
    frame.render_widget(hint, chunks[1]);
}

fn field(label: &str, value: String, value_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<width$}", label, width = LABEL_WIDTH), styles::label_style()),
        Span::styled(value, value_style),
    ])
}

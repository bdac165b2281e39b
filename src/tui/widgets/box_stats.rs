use ratatui::widgets::{BarChart, Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::text::Line;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use crate::models::LeitnerBox;
use crate::scheduler::interval_days;
use crate::Config;
use crate::tui::widgets::color::parse_color;

/// Bar labels: "B1 1d", "B2 3d", ...
pub fn box_labels() -> Vec<String> {
    LeitnerBox::ALL
        .iter()
        .map(|b| format!("B{} {}d", b, interval_days(*b)))
        .collect()
}

pub fn render_box_stats(f: &mut Frame, area: Rect, counts: [usize; 5], due_count: usize, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bar_color = parse_color(&active_theme.highlight_bg);

    let sections = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let labels = box_labels();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(counts)
        .map(|(label, count)| (label.as_str(), count as u64))
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Cards per box"))
        .data(data.as_slice())
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(bar_color))
        .value_style(Style::default().add_modifier(Modifier::BOLD))
        .style(Style::default().fg(fg_color));
    f.render_widget(chart, sections[0]);

    let total: usize = counts.iter().sum();
    let mastered = counts[LeitnerBox::LAST.index()];
    let summary = Paragraph::new(Line::from(format!(
        "Total {}  ·  Due today {}  ·  In Box 5 {}",
        total, due_count, mastered
    )))
    .block(Block::default().borders(Borders::ALL))
    .style(Style::default().fg(fg_color));
    f.render_widget(summary, sections[1]);
}

use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::Rect;
use chrono::NaiveDate;
use crate::models::Card;
use crate::Config;
use crate::tui::widgets::color::parse_color;

/// One row of the deck: box, due date and the first line of the question
pub fn card_row(card: &Card, today: NaiveDate) -> String {
    let due = if card.next_review_date <= today {
        "due".to_string()
    } else {
        card.next_review_date.to_string()
    };
    format!(
        "B{} {:>10}  {}",
        card.leitner_box,
        due,
        card.front.lines().next().unwrap_or("")
    )
}

pub fn render_deck_list(
    f: &mut Frame,
    area: Rect,
    cards: &[Card],
    today: NaiveDate,
    list_state: &mut ListState,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let title = format!("Deck ({})", cards.len());

    if cards.is_empty() {
        let paragraph = Paragraph::new(format!(
            "No cards yet. Press {} to add one.",
            crate::utils::format_key_binding_for_display(&config.key_bindings.new)
        ))
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color));
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let mut spans = vec![Span::raw(card_row(card, today))];
            if !card.tags.is_empty() {
                spans.push(Span::styled(
                    format!("  [{}]", card.tags.join(", ")),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}

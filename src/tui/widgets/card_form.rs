use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use crate::tui::app::{CardField, CardForm};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

fn field_label(field: CardField) -> &'static str {
    match field {
        CardField::Front => "Front",
        CardField::Back => "Back",
        CardField::Tags => "Tags (comma-separated)",
    }
}

pub fn render_card_form(f: &mut Frame, area: Rect, form: &CardForm, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);

    let popup_area = popup_area(area, 70, 60);
    f.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for (field, value) in [
        (CardField::Front, &form.front),
        (CardField::Back, &form.back),
        (CardField::Tags, &form.tags),
    ] {
        let active = field == form.current_field;
        let label_style = if active {
            Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg_color).bg(bg_color)
        };
        lines.push(Line::from(Span::styled(field_label(field), label_style)));
        let cursor = if active { "_" } else { "" };
        lines.push(Line::from(format!("{}{}", value, cursor)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(format!(
        "Tab: next field · {}: save · Esc: cancel",
        crate::utils::format_key_binding_for_display(&config.key_bindings.save)
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("New Card")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

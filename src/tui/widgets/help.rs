use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::scheduler::BOX_INTERVALS;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let keys = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {} or Tab: Switch tabs\n", key(&keys.tab_left), key(&keys.tab_right)));
    text.push_str(&format!("  {} / {}: Move in deck list\n", key(&keys.list_up), key(&keys.list_down)));
    text.push('\n');

    text.push_str("Review:\n");
    text.push_str(&format!("  {}: Show answer\n", key(&keys.reveal)));
    text.push_str(&format!("  {}: Recalled, promote one box\n", key(&keys.recalled)));
    text.push_str(&format!("  {}: Forgot, back to Box 1\n", key(&keys.forgot)));
    text.push('\n');

    text.push_str("Deck:\n");
    text.push_str(&format!("  {}: New card\n", key(&keys.new)));
    text.push_str(&format!("  {}: Delete selected card\n", key(&keys.delete)));
    text.push_str(&format!("  {}: Save new card\n", key(&keys.save)));
    text.push('\n');

    text.push_str("Review intervals:\n  ");
    let intervals: Vec<String> = BOX_INTERVALS
        .iter()
        .enumerate()
        .map(|(i, days)| format!("Box {}: {}d", i + 1, days))
        .collect();
    text.push_str(&intervals.join(" · "));
    text.push_str("\n\n");

    text.push_str(&format!("  {}: Toggle help · {}: Quit\n", key(&keys.help), key(&keys.quit)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_follows_configured_keys() {
        let mut config = Config::default();
        config.key_bindings.recalled = "r".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  r: Recalled, promote one box"));
        assert!(text.contains("Box 4: 14d"));
    }
}

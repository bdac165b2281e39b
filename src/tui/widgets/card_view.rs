use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::text::{Line, Span, Text};
use ratskin::RatSkin;
use termimad::minimad::Text as MinimadText;

use crate::models::{Card, LeitnerBox};
use crate::scheduler::{interval_days, ReviewOutcome};
use crate::tui::App;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

/// Render markdown into ratatui lines wrapped to `width`
pub fn markdown_lines(markdown: &str, width: u16) -> Vec<Line<'static>> {
    let input = MinimadText::from(markdown);
    RatSkin::default()
        .parse(input, width)
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Button label for an outcome, e.g. "Promote to Box 4 (14d)"
pub fn outcome_hint(outcome: ReviewOutcome, current: LeitnerBox) -> String {
    let target = outcome.target_box(current);
    match outcome {
        ReviewOutcome::Recalled => format!("Promote to Box {} ({}d)", target, interval_days(target)),
        ReviewOutcome::Forgot => format!("Reset to Box {} ({}d)", target, interval_days(target)),
    }
}

pub fn render_review(f: &mut Frame, area: Rect, app: &App) {
    let queue = app.due_queue();
    match queue.first() {
        Some(card) => render_card(f, area, card, queue.len(), app),
        None => render_caught_up(f, area, app),
    }
}

fn render_caught_up(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.config.get_active_theme();
    let fg_color = parse_color(&theme.fg);

    let mut lines = vec![
        Line::from(Span::styled("All caught up!", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("You have reviewed all cards due for today."),
    ];
    match app.next_review_date() {
        Some(date) => lines.push(Line::from(format!("Next review: {}", date))),
        None => lines.push(Line::from(format!(
            "No cards yet. Press {} to add one.",
            format_key_binding_for_display(&app.config.key_bindings.new)
        ))),
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Review"))
        .style(Style::default().fg(fg_color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_card(f: &mut Frame, area: Rect, card: &Card, queue_len: usize, app: &App) {
    let theme = app.config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let answer_color = parse_color(&theme.answer_fg);
    let keys = &app.config.key_bindings;

    let title = format!("Card 1 of {} · Box {}", queue_len, card.leitner_box);
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block.style(Style::default().fg(fg_color)), area);

    let sections = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Question
            Constraint::Min(1),         // Answer
            Constraint::Length(2),      // Actions
        ])
        .split(inner);

    let text_width = sections[0].width.saturating_sub(2);
    let mut question = markdown_lines(&card.front, text_width);
    if !card.tags.is_empty() {
        question.push(Line::from(""));
        question.push(Line::from(Span::styled(
            card.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" "),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    f.render_widget(
        Paragraph::new(Text::from(question))
            .block(Block::default().borders(Borders::BOTTOM).title("Question"))
            .wrap(Wrap { trim: false }),
        sections[0],
    );

    let (answer, actions) = if app.show_answer {
        let answer = Text::from(markdown_lines(&card.back, text_width)).style(Style::default().fg(answer_color));
        let actions = Line::from(vec![
            Span::styled(
                format!("{}: Forgot → {}", format_key_binding_for_display(&keys.forgot), outcome_hint(ReviewOutcome::Forgot, card.leitner_box)),
                Style::default().fg(parse_color("lightred")),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{}: Recalled → {}", format_key_binding_for_display(&keys.recalled), outcome_hint(ReviewOutcome::Recalled, card.leitner_box)),
                Style::default().fg(answer_color),
            ),
        ]);
        (answer, actions)
    } else {
        (
            Text::from(Span::styled("(hidden)", Style::default().add_modifier(Modifier::DIM))),
            Line::from(format!("{}: Show answer", format_key_binding_for_display(&keys.reveal))),
        )
    };

    f.render_widget(
        Paragraph::new(answer)
            .block(Block::default().title("Answer"))
            .wrap(Wrap { trim: false }),
        sections[1],
    );
    f.render_widget(
        Paragraph::new(actions).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        sections[2],
    );
}

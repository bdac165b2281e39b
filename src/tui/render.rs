use ratatui::Frame;
use ratatui::widgets::{Block, Borders};
use ratatui::style::Style;
use crate::tui::{App, Layout, Mode, Tab};
use crate::tui::widgets::{
    tabs::render_tabs,
    card_view::render_review,
    deck_list::render_deck_list,
    box_stats::render_box_stats,
    card_form::render_card_form,
    status_bar::render_status_bar,
    help::render_help,
    color::parse_color,
    confirm_delete::render_confirm_delete,
};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border carries the app name and whose deck this is
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Recall · {}", app.owner))
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let due_count = app.due_queue().len();
    render_tabs(f, layout.tabs_area, app.current_tab, due_count, &app.config);

    match app.current_tab {
        Tab::Review => render_review(f, layout.main_area, app),
        Tab::Deck => render_deck_list(
            f,
            layout.main_area,
            &app.cards,
            app.today,
            &mut app.deck_state,
            &app.config,
        ),
        Tab::Stats => render_box_stats(f, layout.main_area, app.box_counts(), due_count, &app.config),
    }

    // Overlays go on top of the tab content
    if app.mode == Mode::Create {
        if let Some(ref form) = app.card_form {
            render_card_form(f, f.area(), form, &app.config);
        }
    }

    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }

    if let Some(ref card) = app.delete_confirmation {
        render_confirm_delete(f, f.area(), card, app.delete_modal_selection, &app.config);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.config);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let keys = &app.config.key_bindings;
    if app.delete_confirmation.is_some() {
        return vec!["↑/↓: Choose".to_string(), "Enter: Confirm".to_string(), "Esc: Cancel".to_string()];
    }

    match app.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&keys.help))],
        Mode::Create => vec![
            "Tab/Enter: Next field".to_string(),
            "Shift+Tab: Previous field".to_string(),
            format!("{}: Save", key(&keys.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::Normal => {
            let mut hints = vec![format!("{}: Quit", key(&keys.quit))];
            match app.current_tab {
                Tab::Review if app.show_answer => {
                    hints.push(format!("{}: Recalled", key(&keys.recalled)));
                    hints.push(format!("{}: Forgot", key(&keys.forgot)));
                }
                Tab::Review => hints.push(format!("{}: Show answer", key(&keys.reveal))),
                Tab::Deck => {
                    hints.push(format!("{}/{}: Move", key(&keys.list_up), key(&keys.list_down)));
                    hints.push(format!("{}: Delete", key(&keys.delete)));
                }
                Tab::Stats => {}
            }
            hints.push(format!("{}: New", key(&keys.new)));
            hints.push("Tab: Switch tab".to_string());
            hints.push(format!("{}: Help", key(&keys.help)));
            hints
        }
    }
}

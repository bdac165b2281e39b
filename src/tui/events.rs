use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use crate::scheduler::ReviewOutcome;
use crate::tui::app::CardField;
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::{App, Mode, Tab};

/// Restores the terminal when dropped, including on panic.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the drop afterwards is a no-op
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Size check happens before the alternate screen so the error stays visible
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    tracing::debug!(owner = %app.owner, cards = app.cards.len(), "tui started");

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, Windows also reports Release
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    // A session left open past midnight picks up the new day
                    app.today = crate::utils::today();
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
            }
        }
    }

    guard.restore()?;
    tracing::debug!("tui stopped");

    Ok(())
}

/// Returns `Ok(true)` when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.delete_confirmation.is_some() {
        return handle_delete_confirmation_modal(app, key_event);
    }

    match app.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Create => handle_create_mode(app, key_event),
        Mode::Normal => handle_normal_mode(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Up | KeyCode::Down => {
            // Two options, so both directions toggle
            app.delete_modal_selection = 1 - app.delete_modal_selection.min(1);
        }
        KeyCode::Enter => {
            if let Err(e) = app.confirm_delete() {
                app.set_status_message(format!("Failed to delete card: {}", e));
            }
        }
        KeyCode::Esc => {
            app.delete_confirmation = None;
        }
        _ => {}
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc || app.bindings.help.matches(&key_event) {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_create_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.bindings.save.matches(&key_event) {
        save_form(app);
        return Ok(false);
    }

    let Some(form) = app.card_form.as_mut() else {
        app.cancel_create_mode();
        return Ok(false);
    };

    match key_event.code {
        KeyCode::Esc => app.cancel_create_mode(),
        KeyCode::BackTab => form.current_field = form.current_field.previous(),
        KeyCode::Tab => {
            form.current_field = if key_event.modifiers.contains(KeyModifiers::SHIFT) {
                form.current_field.previous()
            } else {
                form.current_field.next()
            };
        }
        KeyCode::Enter => {
            if form.current_field == CardField::Tags {
                save_form(app);
            } else {
                form.current_field = form.current_field.next();
            }
        }
        KeyCode::Backspace => {
            form.current_value_mut().pop();
        }
        KeyCode::Char(c) => {
            if !crate::utils::has_primary_modifier(key_event.modifiers) {
                form.current_value_mut().push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn save_form(app: &mut App) {
    if let Err(e) = app.save_card_form() {
        app.set_status_message(format!("Failed to save card: {}", e));
    }
}

fn handle_normal_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.bindings.quit.matches(&key_event) {
        return Ok(true);
    }

    if app.bindings.help.matches(&key_event) {
        app.enter_help_mode();
        return Ok(false);
    }

    if app.bindings.tab_right.matches(&key_event) || key_event.code == KeyCode::Tab {
        app.switch_tab(app.current_tab.next());
        return Ok(false);
    }
    if app.bindings.tab_left.matches(&key_event) || key_event.code == KeyCode::BackTab {
        app.switch_tab(app.current_tab.previous());
        return Ok(false);
    }

    // Number keys jump straight to a tab
    if let KeyCode::Char(c @ '1'..='3') = key_event.code {
        let index = c as usize - '1' as usize;
        app.switch_tab(Tab::ALL[index]);
        return Ok(false);
    }

    if app.bindings.new.matches(&key_event) {
        app.enter_create_mode();
        return Ok(false);
    }

    match app.current_tab {
        Tab::Review => {
            if app.bindings.reveal.matches(&key_event) {
                app.reveal_answer();
            } else if app.bindings.recalled.matches(&key_event) {
                rate(app, ReviewOutcome::Recalled);
            } else if app.bindings.forgot.matches(&key_event) {
                rate(app, ReviewOutcome::Forgot);
            }
        }
        Tab::Deck => {
            if app.bindings.list_up.matches(&key_event) || key_event.code == KeyCode::Up {
                app.move_selection_up();
            } else if app.bindings.list_down.matches(&key_event) || key_event.code == KeyCode::Down {
                app.move_selection_down();
            } else if app.bindings.delete.matches(&key_event) {
                app.request_delete();
            }
        }
        Tab::Stats => {}
    }
    Ok(false)
}

fn rate(app: &mut App, outcome: ReviewOutcome) {
    if let Err(e) = app.rate_current(outcome) {
        app.set_status_message(format!("Failed to save review: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::config::Config;
    use crate::database::Database;
    use crate::models::{Card, LeitnerBox};

    fn day(s: &str) -> NaiveDate {
        crate::utils::parse_date(s).unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        press(KeyCode::Char(c))
    }

    fn app_with_cards(fronts: &[&str]) -> App {
        let db = Database::open_in_memory().unwrap();
        for front in fronts {
            let card = Card::new("ada", front.to_string(), "answer".into(), vec![], day("2024-03-01"));
            db.insert_card(&card).unwrap();
        }
        App::new(Config::default(), db, "ada".into(), day("2024-03-01")).unwrap()
    }

    #[test]
    fn quit_key_ends_the_loop() {
        let mut app = app_with_cards(&[]);
        assert!(!handle_key_event(&mut app, ch('x')).unwrap());
        assert!(handle_key_event(&mut app, ch('q')).unwrap());
    }

    #[test]
    fn reveal_then_recall_promotes_the_card() {
        let mut app = app_with_cards(&["capital of France?"]);
        handle_key_event(&mut app, ch('y')).unwrap();
        assert_eq!(app.cards[0].leitner_box, LeitnerBox::FIRST);

        handle_key_event(&mut app, ch(' ')).unwrap();
        assert!(app.show_answer);
        handle_key_event(&mut app, ch('y')).unwrap();

        assert_eq!(app.cards[0].leitner_box.number(), 2);
        assert_eq!(app.cards[0].next_review_date, day("2024-03-04"));
        assert!(app.due_queue().is_empty());
    }

    #[test]
    fn forgot_keeps_the_card_in_box_one() {
        let mut app = app_with_cards(&["q"]);
        handle_key_event(&mut app, ch(' ')).unwrap();
        handle_key_event(&mut app, ch('n')).unwrap();
        assert_eq!(app.cards[0].leitner_box, LeitnerBox::FIRST);
        assert_eq!(app.cards[0].next_review_date, day("2024-03-02"));
    }

    #[test]
    fn tabs_switch_with_arrows_and_numbers() {
        let mut app = app_with_cards(&[]);
        handle_key_event(&mut app, press(KeyCode::Right)).unwrap();
        assert_eq!(app.current_tab, Tab::Deck);
        handle_key_event(&mut app, ch('3')).unwrap();
        assert_eq!(app.current_tab, Tab::Stats);
        handle_key_event(&mut app, press(KeyCode::Tab)).unwrap();
        assert_eq!(app.current_tab, Tab::Review);
        handle_key_event(&mut app, press(KeyCode::Left)).unwrap();
        assert_eq!(app.current_tab, Tab::Stats);
    }

    #[test]
    fn typing_into_the_form_creates_a_card() {
        let mut app = app_with_cards(&[]);
        handle_key_event(&mut app, ch('a')).unwrap();
        assert_eq!(app.mode, Mode::Create);

        for c in "2+2".chars() {
            handle_key_event(&mut app, ch(c)).unwrap();
        }
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();
        handle_key_event(&mut app, ch('4')).unwrap();
        handle_key_event(&mut app, ch('5')).unwrap();
        handle_key_event(&mut app, press(KeyCode::Backspace)).unwrap();
        handle_key_event(&mut app, press(KeyCode::Tab)).unwrap();
        for c in "math".chars() {
            handle_key_event(&mut app, ch(c)).unwrap();
        }
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.cards.len(), 1);
        assert_eq!(app.cards[0].front, "2+2");
        assert_eq!(app.cards[0].back, "4");
        assert_eq!(app.cards[0].tags, vec!["math"]);
    }

    #[test]
    fn quit_key_is_text_inside_the_form() {
        let mut app = app_with_cards(&[]);
        handle_key_event(&mut app, ch('a')).unwrap();
        assert!(!handle_key_event(&mut app, ch('q')).unwrap());
        assert_eq!(app.card_form.as_ref().map(|f| f.front.as_str()), Some("q"));

        handle_key_event(&mut app, press(KeyCode::Esc)).unwrap();
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.card_form.is_none());
    }

    #[test]
    fn delete_from_deck_needs_confirmation() {
        let mut app = app_with_cards(&["one", "two"]);
        handle_key_event(&mut app, ch('2')).unwrap();
        handle_key_event(&mut app, ch('j')).unwrap();
        handle_key_event(&mut app, ch('d')).unwrap();
        assert!(app.delete_confirmation.is_some());

        // Keys other than the modal's are swallowed
        assert!(!handle_key_event(&mut app, ch('q')).unwrap());

        handle_key_event(&mut app, press(KeyCode::Down)).unwrap();
        assert_eq!(app.delete_modal_selection, 1);
        handle_key_event(&mut app, press(KeyCode::Up)).unwrap();
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();

        assert!(app.delete_confirmation.is_none());
        assert_eq!(app.cards.len(), 1);
        assert_eq!(app.cards[0].front, "one");
    }

    #[test]
    fn help_toggles_with_its_key_or_escape() {
        let mut app = app_with_cards(&[]);
        handle_key_event(&mut app, press(KeyCode::F(1))).unwrap();
        assert_eq!(app.mode, Mode::Help);
        handle_key_event(&mut app, ch('y')).unwrap();
        assert_eq!(app.mode, Mode::Help);
        handle_key_event(&mut app, press(KeyCode::Esc)).unwrap();
        assert_eq!(app.mode, Mode::Normal);
    }
}

use chrono::NaiveDate;
use ratatui::widgets::ListState;
use std::time::Instant;

use crate::config::{Config, KeyBindings};
use crate::database::{Database, DatabaseError};
use crate::models::Card;
use crate::scheduler::{self, ReviewOutcome};
use crate::tui::error::TuiError;
use crate::utils::{parse_key_binding, parse_tags, ParsedKeyBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Review,
    Deck,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Review, Tab::Deck, Tab::Stats];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Review => "Review",
            Tab::Deck => "Deck",
            Tab::Stats => "Stats",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Review => 0,
            Tab::Deck => 1,
            Tab::Stats => 2,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Create,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Front,
    Back,
    Tags,
}

impl CardField {
    pub fn next(self) -> Self {
        match self {
            CardField::Front => CardField::Back,
            CardField::Back => CardField::Tags,
            CardField::Tags => CardField::Front,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            CardField::Front => CardField::Tags,
            CardField::Back => CardField::Front,
            CardField::Tags => CardField::Back,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardForm {
    pub front: String,
    pub back: String,
    pub tags: String,
    pub current_field: CardField,
}

impl Default for CardForm {
    fn default() -> Self {
        Self {
            front: String::new(),
            back: String::new(),
            tags: String::new(),
            current_field: CardField::Front,
        }
    }
}

impl CardForm {
    pub fn current_value_mut(&mut self) -> &mut String {
        match self.current_field {
            CardField::Front => &mut self.front,
            CardField::Back => &mut self.back,
            CardField::Tags => &mut self.tags,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Key bindings from the config, parsed once
#[derive(Debug, Clone)]
pub struct Bindings {
    pub quit: ParsedKeyBinding,
    pub reveal: ParsedKeyBinding,
    pub recalled: ParsedKeyBinding,
    pub forgot: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub save: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub tab_left: ParsedKeyBinding,
    pub tab_right: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
}

impl Bindings {
    pub fn from_config(keys: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |action: &str, raw: &str| {
            parse_key_binding(raw).map_err(|reason| TuiError::KeyBindingError {
                action: action.to_string(),
                reason,
            })
        };
        Ok(Self {
            quit: parse("quit", &keys.quit)?,
            reveal: parse("reveal", &keys.reveal)?,
            recalled: parse("recalled", &keys.recalled)?,
            forgot: parse("forgot", &keys.forgot)?,
            new: parse("new", &keys.new)?,
            delete: parse("delete", &keys.delete)?,
            save: parse("save", &keys.save)?,
            help: parse("help", &keys.help)?,
            tab_left: parse("tab_left", &keys.tab_left)?,
            tab_right: parse("tab_right", &keys.tab_right)?,
            list_up: parse("list_up", &keys.list_up)?,
            list_down: parse("list_down", &keys.list_down)?,
        })
    }
}

pub struct App {
    pub config: Config,
    pub database: Database,
    pub bindings: Bindings,
    /// Whose deck is on screen
    pub owner: String,
    /// Review day, read once per interaction by the event loop
    pub today: NaiveDate,
    /// The owner's cards in creation order
    pub cards: Vec<Card>,
    pub current_tab: Tab,
    pub mode: Mode,
    pub show_answer: bool,
    pub deck_state: ListState,
    pub card_form: Option<CardForm>,
    pub delete_confirmation: Option<Card>,
    /// 0 = Delete, 1 = Cancel
    pub delete_modal_selection: usize,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, database: Database, owner: String, today: NaiveDate) -> Result<Self, TuiError> {
        let bindings = Bindings::from_config(&config.key_bindings)?;
        let mut app = Self {
            config,
            database,
            bindings,
            owner,
            today,
            cards: Vec::new(),
            current_tab: Tab::Review,
            mode: Mode::Normal,
            show_answer: false,
            deck_state: ListState::default(),
            card_form: None,
            delete_confirmation: None,
            delete_modal_selection: 0,
            status: StatusState::default(),
        };
        app.load_data()?;
        Ok(app)
    }

    /// Reload the owner's cards from the store
    pub fn load_data(&mut self) -> Result<(), DatabaseError> {
        self.cards = self.database.get_cards_for_owner(&self.owner)?;
        self.adjust_selected_index();
        Ok(())
    }

    /// Cards to review today, hardest first
    pub fn due_queue(&self) -> Vec<&Card> {
        scheduler::due_cards(&self.cards, &self.owner, self.today)
    }

    /// The card at the head of today's queue
    pub fn current_card(&self) -> Option<&Card> {
        self.due_queue().into_iter().next()
    }

    pub fn box_counts(&self) -> [usize; 5] {
        scheduler::box_counts(&self.cards, &self.owner)
    }

    /// Earliest upcoming review, for the "all caught up" screen
    pub fn next_review_date(&self) -> Option<NaiveDate> {
        self.cards.iter().map(|card| card.next_review_date).min()
    }

    pub fn reveal_answer(&mut self) {
        if self.current_card().is_some() {
            self.show_answer = true;
        }
    }

    /// Apply `outcome` to the head of the queue, persist it and move on
    pub fn rate_current(&mut self, outcome: ReviewOutcome) -> Result<(), DatabaseError> {
        let Some(card) = self.current_card().cloned() else {
            return Ok(());
        };
        if !self.show_answer {
            self.set_status_message("Reveal the answer first".to_string());
            return Ok(());
        }

        let reviewed = scheduler::apply_review(&card, outcome, self.today);
        self.database.update_card(&reviewed)?;
        tracing::info!(
            card = %reviewed.id,
            from = card.leitner_box.number(),
            to = reviewed.leitner_box.number(),
            ?outcome,
            "card reviewed"
        );

        self.show_answer = false;
        self.load_data()?;
        self.set_status_message(match outcome {
            ReviewOutcome::Recalled => format!("Promoted to Box {}", reviewed.leitner_box),
            ReviewOutcome::Forgot => "Back to Box 1".to_string(),
        });
        Ok(())
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.show_answer = false;
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.deck_state.selected().and_then(|index| self.cards.get(index))
    }

    /// Keep the deck selection inside the list after it changes size
    pub fn adjust_selected_index(&mut self) {
        if self.cards.is_empty() {
            self.deck_state.select(None);
        } else {
            let index = self.deck_state.selected().unwrap_or(0).min(self.cards.len() - 1);
            self.deck_state.select(Some(index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if let Some(index) = self.deck_state.selected() {
            self.deck_state.select(Some(index.saturating_sub(1)));
        }
    }

    pub fn move_selection_down(&mut self) {
        if let Some(index) = self.deck_state.selected() {
            if index + 1 < self.cards.len() {
                self.deck_state.select(Some(index + 1));
            }
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(card) = self.selected_card().cloned() {
            self.delete_confirmation = Some(card);
            self.delete_modal_selection = 0;
        }
    }

    /// Carry out the choice in the delete modal and close it
    pub fn confirm_delete(&mut self) -> Result<(), DatabaseError> {
        let Some(card) = self.delete_confirmation.take() else {
            return Ok(());
        };
        if self.delete_modal_selection != 0 {
            return Ok(());
        }

        self.database.delete_card(&card.id)?;
        tracing::info!(card = %card.id, owner = %self.owner, "card deleted");
        self.load_data()?;
        self.set_status_message("Card deleted".to_string());
        Ok(())
    }

    pub fn enter_create_mode(&mut self) {
        self.card_form = Some(CardForm::default());
        self.mode = Mode::Create;
    }

    pub fn cancel_create_mode(&mut self) {
        self.card_form = None;
        self.mode = Mode::Normal;
    }

    /// Save the add form as a fresh card. Front and back are required.
    pub fn save_card_form(&mut self) -> Result<(), DatabaseError> {
        let Some(form) = self.card_form.as_ref() else {
            return Ok(());
        };
        if form.front.trim().is_empty() || form.back.trim().is_empty() {
            self.set_status_message("Front and back are required".to_string());
            return Ok(());
        }

        let card = Card::new(
            &self.owner,
            form.front.trim().to_string(),
            form.back.trim().to_string(),
            parse_tags(&form.tags),
            self.today,
        );
        self.database.insert_card(&card)?;
        tracing::info!(card = %card.id, owner = %self.owner, "card created");

        self.cancel_create_mode();
        self.load_data()?;
        self.set_status_message("Card added, due today".to_string());
        Ok(())
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status = StatusState::default();
    }

    /// Status messages disappear after 3 seconds
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }
}

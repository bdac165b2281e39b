use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backup::{self, BackupError};
use crate::database::{Database, DatabaseError};
use crate::models::{Card, LeitnerBox};
use crate::scheduler::{self, ReviewOutcome};
use crate::utils::{parse_date, parse_tags};

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Leitner-box flashcards in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Act as this user instead of the configured one
    #[arg(short, long)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive review session (default if no subcommand)
    Tui,
    /// Add a card, due today
    Add {
        /// Question side
        front: String,
        /// Answer side
        back: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List cards due for review, hardest first
    Due {
        /// Review day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a review outcome for a card
    Rate {
        /// Card id or unique prefix
        id: String,
        #[arg(value_enum)]
        outcome: OutcomeArg,
        /// Review day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// List all of your cards
    List,
    /// Cards per box
    Stats {
        /// Day used for the due count (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a card
    Delete {
        /// Card id or unique prefix
        id: String,
    },
    /// Write every card to a JSON backup
    Export {
        file: PathBuf,
    },
    /// Merge a JSON backup: keep your own cards, take everyone else's
    Import {
        file: PathBuf,
    },
    /// Create fresh cards from a JSON array of {front, back, tags}
    AddBulk {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutcomeArg {
    #[value(alias = "pass", alias = "y")]
    Recalled,
    #[value(alias = "fail", alias = "n")]
    Forgot,
}

impl From<OutcomeArg> for ReviewOutcome {
    fn from(value: OutcomeArg) -> Self {
        match value {
            OutcomeArg::Recalled => ReviewOutcome::Recalled,
            OutcomeArg::Forgot => ReviewOutcome::Forgot,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Backup error: {0}")]
    BackupError(#[from] BackupError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Card {0} cannot be empty")]
    EmptyField(&'static str),
}

/// Parse `--date`, falling back to `today`
pub fn resolve_date(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate, CliError> {
    match date {
        Some(raw) => parse_date(raw)
            .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", raw, e))),
        None => Ok(today),
    }
}

fn describe(card: &Card) -> String {
    format!(
        "{}  box {}  next {}  {}",
        card.short_id(),
        card.leitner_box,
        card.next_review_date,
        card.front.lines().next().unwrap_or("")
    )
}

/// Handle the add command
pub fn handle_add(
    front: String,
    back: String,
    tags: Option<String>,
    owner: &str,
    today: NaiveDate,
    db: &Database,
    out: &mut impl Write,
) -> Result<Card, CliError> {
    if front.trim().is_empty() {
        return Err(CliError::EmptyField("front"));
    }
    if back.trim().is_empty() {
        return Err(CliError::EmptyField("back"));
    }

    let tags = tags.as_deref().map(parse_tags).unwrap_or_default();
    let card = Card::new(owner, front, back, tags, today);
    db.insert_card(&card)?;
    tracing::info!(card = %card.id, owner, "card created");

    writeln!(out, "Card created (ID: {})", card.short_id())?;
    Ok(card)
}

/// Handle the due command
pub fn handle_due(owner: &str, today: NaiveDate, db: &Database, out: &mut impl Write) -> Result<usize, CliError> {
    let cards = db.get_cards_for_owner(owner)?;
    let due = scheduler::due_cards(&cards, owner, today);

    if due.is_empty() {
        writeln!(out, "All caught up! Nothing due on {}.", today)?;
        return Ok(0);
    }

    writeln!(out, "{} card(s) due on {}:", due.len(), today)?;
    for card in &due {
        writeln!(out, "  {}", describe(card))?;
    }
    Ok(due.len())
}

/// Handle the rate command
pub fn handle_rate(
    id: &str,
    outcome: ReviewOutcome,
    review_date: NaiveDate,
    owner: &str,
    db: &Database,
    out: &mut impl Write,
) -> Result<Card, CliError> {
    let card = db.find_card(owner, id)?;
    let reviewed = scheduler::apply_review(&card, outcome, review_date);
    db.update_card(&reviewed)?;
    tracing::info!(
        card = %reviewed.id,
        from = card.leitner_box.number(),
        to = reviewed.leitner_box.number(),
        ?outcome,
        "card reviewed"
    );

    writeln!(
        out,
        "{}: box {} -> box {}, next review {}",
        reviewed.short_id(),
        card.leitner_box,
        reviewed.leitner_box,
        reviewed.next_review_date
    )?;
    Ok(reviewed)
}

/// Handle the list command
pub fn handle_list(owner: &str, db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let cards = db.get_cards_for_owner(owner)?;
    if cards.is_empty() {
        writeln!(out, "No cards yet. Add one with `recall add`.")?;
        return Ok(());
    }
    for card in &cards {
        write!(out, "{}", describe(card))?;
        if !card.tags.is_empty() {
            write!(out, "  [{}]", card.tags.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Handle the stats command
pub fn handle_stats(owner: &str, today: NaiveDate, db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let cards = db.get_cards_for_owner(owner)?;
    let counts = scheduler::box_counts(&cards, owner);
    let due = scheduler::due_cards(&cards, owner, today).len();

    for leitner_box in LeitnerBox::ALL {
        writeln!(
            out,
            "Box {}  ({:>2}d interval): {}",
            leitner_box,
            scheduler::interval_days(leitner_box),
            counts[leitner_box.index()]
        )?;
    }
    writeln!(out, "Total: {}  Due on {}: {}", cards.len(), today, due)?;
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(id: &str, owner: &str, db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let card = db.find_card(owner, id)?;
    db.delete_card(&card.id)?;
    tracing::info!(card = %card.id, owner, "card deleted");
    writeln!(out, "Card {} deleted", card.short_id())?;
    Ok(())
}

/// Handle the export command
pub fn handle_export(path: &Path, db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let cards = db.get_all_cards()?;
    let file = File::create(path)?;
    backup::export(&cards, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), count = cards.len(), "deck exported");
    writeln!(out, "Exported {} card(s) to {}", cards.len(), path.display())?;
    Ok(())
}

/// Handle the import command
pub fn handle_import(path: &Path, owner: &str, db: &Database, out: &mut impl Write) -> Result<usize, CliError> {
    let incoming = backup::read_backup(BufReader::new(File::open(path)?))?;
    let local = db.get_all_cards()?;
    let merged = backup::merge_for_owner(&local, &incoming.cards, owner);
    db.replace_all_cards(&merged)?;
    tracing::info!(path = %path.display(), total = merged.len(), "backup merged");
    writeln!(out, "Merged backup from {}: {} card(s) in deck", incoming.exported_at, merged.len())?;
    Ok(merged.len())
}

/// Handle the add-bulk command
pub fn handle_add_bulk(
    path: &Path,
    owner: &str,
    today: NaiveDate,
    db: &Database,
    out: &mut impl Write,
) -> Result<usize, CliError> {
    let drafts = backup::read_drafts(BufReader::new(File::open(path)?))?;
    let cards: Vec<Card> = drafts
        .into_iter()
        .filter(|draft| !draft.front.trim().is_empty() && !draft.back.trim().is_empty())
        .map(|draft| draft.into_card(owner, today))
        .collect();
    db.insert_cards(&cards)?;
    tracing::info!(path = %path.display(), count = cards.len(), owner, "bulk cards created");
    writeln!(out, "Added {} card(s)", cards.len())?;
    Ok(cards.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cli_parses_rate_with_alias() {
        let cli = Cli::try_parse_from(["recall", "--user", "ada", "rate", "abc", "pass", "--date", "2024-01-10"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("ada"));
        match cli.command {
            Some(Commands::Rate { id, outcome, date }) => {
                assert_eq!(id, "abc");
                assert_eq!(outcome, OutcomeArg::Recalled);
                assert_eq!(date.as_deref(), Some("2024-01-10"));
            }
            _ => panic!("expected rate command"),
        }
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["recall"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn bad_date_is_reported() {
        assert!(matches!(resolve_date(Some("Jan 10"), day("2024-01-10")), Err(CliError::DateParseError(_))));
        assert_eq!(resolve_date(None, day("2024-01-10")).unwrap(), day("2024-01-10"));
    }

    #[test]
    fn add_then_due_then_rate() {
        let db = Database::open_in_memory().unwrap();
        let today = day("2024-01-10");
        let mut out = Vec::new();

        let card = handle_add("Q".into(), "A".into(), Some("sql, joins".into()), "ada", today, &db, &mut out).unwrap();
        assert_eq!(card.tags, vec!["sql", "joins"]);
        assert_eq!(handle_due("ada", today, &db, &mut out).unwrap(), 1);

        let reviewed = handle_rate(card.short_id(), ReviewOutcome::Recalled, today, "ada", &db, &mut out).unwrap();
        assert_eq!(reviewed.leitner_box.number(), 2);
        assert_eq!(reviewed.next_review_date, day("2024-01-13"));
        assert_eq!(handle_due("ada", today, &db, &mut out).unwrap(), 0);
        assert_eq!(handle_due("ada", day("2024-01-13"), &db, &mut out).unwrap(), 1);

        let text = output(out);
        assert!(text.contains("All caught up"));
        assert!(text.contains("box 1 -> box 2"));
    }

    #[test]
    fn empty_front_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let result = handle_add("  ".into(), "A".into(), None, "ada", day("2024-01-10"), &db, &mut std::io::sink());
        assert!(matches!(result, Err(CliError::EmptyField("front"))));
    }

    #[test]
    fn users_cannot_touch_each_others_cards() {
        let db = Database::open_in_memory().unwrap();
        let card = handle_add("Q".into(), "A".into(), None, "ada", day("2024-01-10"), &db, &mut std::io::sink()).unwrap();
        let result = handle_delete(&card.id, "bo", &db, &mut std::io::sink());
        assert!(matches!(result, Err(CliError::DatabaseError(DatabaseError::CardNotFound(_)))));
        handle_delete(&card.id, "ada", &db, &mut std::io::sink()).unwrap();
        assert!(db.get_all_cards().unwrap().is_empty());
    }

    #[test]
    fn stats_lists_every_box() {
        let db = Database::open_in_memory().unwrap();
        handle_add("Q".into(), "A".into(), None, "ada", day("2024-01-10"), &db, &mut std::io::sink()).unwrap();
        let mut out = Vec::new();
        handle_stats("ada", day("2024-01-10"), &db, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Box 1  ( 1d interval): 1"));
        assert!(text.contains("Box 5  (30d interval): 0"));
        assert!(text.contains("Due on 2024-01-10: 1"));
    }

    #[test]
    fn export_then_import_from_the_other_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let today = day("2024-01-10");

        let theirs = Database::open_in_memory().unwrap();
        handle_add("their card".into(), "A".into(), None, "bo", today, &theirs, &mut std::io::sink()).unwrap();
        handle_export(&path, &theirs, &mut std::io::sink()).unwrap();

        let mine = Database::open_in_memory().unwrap();
        handle_add("my card".into(), "A".into(), None, "ada", today, &mine, &mut std::io::sink()).unwrap();
        assert_eq!(handle_import(&path, "ada", &mine, &mut std::io::sink()).unwrap(), 2);

        assert_eq!(mine.get_cards_for_owner("ada").unwrap().len(), 1);
        assert_eq!(mine.get_cards_for_owner("bo").unwrap()[0].front, "their card");
    }

    #[test]
    fn bulk_add_skips_blank_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts.json");
        std::fs::write(
            &path,
            r#"[{"front":"Q1","back":"A1","tags":["sql"]},{"front":"","back":"A2"},{"front":"Q3","back":"A3"}]"#,
        )
        .unwrap();

        let db = Database::open_in_memory().unwrap();
        let today = day("2024-01-10");
        assert_eq!(handle_add_bulk(&path, "ada", today, &db, &mut std::io::sink()).unwrap(), 2);
        let cards = db.get_cards_for_owner("ada").unwrap();
        assert!(cards.iter().all(|c| c.leitner_box == LeitnerBox::FIRST && c.next_review_date == today));
    }
}

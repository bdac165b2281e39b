use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::Card;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("No card matches '{0}'")]
    CardNotFound(String),
    #[error("'{0}' matches more than one card, use a longer id")]
    AmbiguousId(String),
    #[error("Failed to encode tags: {0}")]
    TagsError(#[from] serde_json::Error),
}

const CARD_COLUMNS: &str =
    "id, owner, front, back, leitner_box, next_review_date, last_reviewed, tags, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let db = Database { conn };
        db.initialize_schema()?;
        tracing::debug!(path = %db_path.display(), "database opened");

        Ok(db)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cards (
                id                  TEXT PRIMARY KEY,
                owner               TEXT NOT NULL,
                front               TEXT NOT NULL,
                back                TEXT NOT NULL,
                leitner_box         INTEGER NOT NULL DEFAULT 1
                                    CHECK (leitner_box BETWEEN 1 AND 5),
                next_review_date    TEXT NOT NULL,
                last_reviewed       TEXT,
                tags                TEXT,
                created_at          TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cards_owner ON cards(owner)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cards_next_review_date ON cards(next_review_date)",
            [],
        )?;

        Ok(())
    }

    fn row_to_card(row: &rusqlite::Row) -> Result<Card, rusqlite::Error> {
        // Tags are a JSON array so a tag may itself contain commas
        let tags: Option<String> = row.get(7)?;
        let tags = match tags.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
            })?,
            None => Vec::new(),
        };
        Ok(Card {
            id: row.get(0)?,
            owner: row.get(1)?,
            front: row.get(2)?,
            back: row.get(3)?,
            leitner_box: row.get(4)?,
            next_review_date: row.get(5)?,
            last_reviewed: row.get(6)?,
            tags,
            created_at: row.get(8)?,
        })
    }

    fn insert_with(conn: &Connection, card: &Card) -> Result<(), DatabaseError> {
        conn.execute(
            "INSERT INTO cards (id, owner, front, back, leitner_box, next_review_date, last_reviewed, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                card.id,
                card.owner,
                card.front,
                card.back,
                card.leitner_box,
                card.next_review_date,
                card.last_reviewed,
                serde_json::to_string(&card.tags)?,
                card.created_at,
            ],
        )?;
        Ok(())
    }

    /// Insert a new card
    pub fn insert_card(&self, card: &Card) -> Result<(), DatabaseError> {
        Self::insert_with(&self.conn, card)
    }

    /// Insert several cards in one transaction
    pub fn insert_cards(&self, cards: &[Card]) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        for card in cards {
            Self::insert_with(&tx, card)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Get a single card by its full id
    pub fn get_card(&self, id: &str) -> Result<Card, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS))?;
        stmt.query_row(rusqlite::params![id], Self::row_to_card)
            .optional()?
            .ok_or_else(|| DatabaseError::CardNotFound(id.to_string()))
    }

    /// Resolve a full id or a unique id prefix among the owner's cards
    pub fn find_card(&self, owner: &str, id_or_prefix: &str) -> Result<Card, DatabaseError> {
        let id_or_prefix = id_or_prefix.trim();
        if id_or_prefix.is_empty() {
            return Err(DatabaseError::CardNotFound(String::new()));
        }

        // A full id wins even when it is also the prefix of other ids
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards WHERE owner = ?1 AND id = ?2",
            CARD_COLUMNS
        ))?;
        if let Some(card) = stmt
            .query_row(rusqlite::params![owner, id_or_prefix], Self::row_to_card)
            .optional()?
        {
            return Ok(card);
        }

        let pattern = format!("{}%", escape_like(id_or_prefix));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards WHERE owner = ?1 AND id LIKE ?2 ESCAPE '\\' LIMIT 2",
            CARD_COLUMNS
        ))?;
        let mut matches = stmt
            .query_map(rusqlite::params![owner, pattern], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;

        match matches.len() {
            0 => Err(DatabaseError::CardNotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(DatabaseError::AmbiguousId(id_or_prefix.to_string())),
        }
    }

    /// All cards of one owner, in creation order
    pub fn get_cards_for_owner(&self, owner: &str) -> Result<Vec<Card>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards WHERE owner = ?1 ORDER BY created_at ASC, rowid ASC",
            CARD_COLUMNS
        ))?;
        let cards = stmt.query_map(rusqlite::params![owner], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Every card regardless of owner, in creation order
    pub fn get_all_cards(&self) -> Result<Vec<Card>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards ORDER BY created_at ASC, rowid ASC",
            CARD_COLUMNS
        ))?;
        let cards = stmt.query_map([], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Persist a card's current state
    pub fn update_card(&self, card: &Card) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE cards SET front = ?1, back = ?2, leitner_box = ?3, next_review_date = ?4,
                 last_reviewed = ?5, tags = ?6 WHERE id = ?7",
            rusqlite::params![
                card.front,
                card.back,
                card.leitner_box,
                card.next_review_date,
                card.last_reviewed,
                serde_json::to_string(&card.tags)?,
                card.id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::CardNotFound(card.id.clone()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete a card by id
    pub fn delete_card(&self, id: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM cards WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
            return Err(DatabaseError::CardNotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Swap the whole deck for `cards` atomically
    pub fn replace_all_cards(&self, cards: &[Card]) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cards", [])?;
        for card in cards {
            Self::insert_with(&tx, card)?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Escape LIKE wildcards so they match literally under `ESCAPE '\'`
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

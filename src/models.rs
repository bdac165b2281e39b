use std::fmt;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Mastery tier of a card. Only 1..=5 can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LeitnerBox(u8);

impl LeitnerBox {
    pub const FIRST: LeitnerBox = LeitnerBox(1);
    pub const LAST: LeitnerBox = LeitnerBox(5);

    /// All boxes in ascending order
    pub const ALL: [LeitnerBox; 5] = [
        LeitnerBox(1),
        LeitnerBox(2),
        LeitnerBox(3),
        LeitnerBox(4),
        LeitnerBox(5),
    ];

    pub fn new(number: u8) -> Option<Self> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&number) {
            Some(LeitnerBox(number))
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Next box up, capped at the last box
    pub fn promoted(self) -> Self {
        LeitnerBox((self.0 + 1).min(Self::LAST.0))
    }

    /// Zero-based position, handy for indexing per-box tables
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl Default for LeitnerBox {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for LeitnerBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBox(pub i64);

impl fmt::Display for InvalidBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box must be between 1 and 5, got {}", self.0)
    }
}

impl std::error::Error for InvalidBox {}

impl TryFrom<u8> for LeitnerBox {
    type Error = InvalidBox;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        LeitnerBox::new(value).ok_or(InvalidBox(value as i64))
    }
}

impl From<LeitnerBox> for u8 {
    fn from(value: LeitnerBox) -> Self {
        value.0
    }
}

impl ToSql for LeitnerBox {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0 as i64))
    }
}

impl FromSql for LeitnerBox {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        u8::try_from(raw)
            .ok()
            .and_then(LeitnerBox::new)
            .ok_or(FromSqlError::OutOfRange(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub owner: String,
    pub front: String,
    pub back: String,
    #[serde(rename = "box")]
    pub leitner_box: LeitnerBox,
    pub next_review_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

impl Card {
    /// A new card starts in the first box and is due on the day it is created
    pub fn new(owner: &str, front: String, back: String, tags: Vec<String>, today: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            front,
            back,
            leitner_box: LeitnerBox::FIRST,
            next_review_date: today,
            last_reviewed: None,
            tags,
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// First eight characters of the id, enough to address a card from the CLI
    pub fn short_id(&self) -> &str {
        let end = self.id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// Content-only card, as produced by a bulk generator or a JSON drafts file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CardDraft {
    pub fn into_card(self, owner: &str, today: NaiveDate) -> Card {
        Card::new(owner, self.front, self.back, self.tags, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn box_rejects_out_of_range() {
        assert!(LeitnerBox::new(0).is_none());
        assert!(LeitnerBox::new(6).is_none());
        assert_eq!(LeitnerBox::new(3).map(LeitnerBox::number), Some(3));
        assert!(LeitnerBox::try_from(9u8).is_err());
    }

    #[test]
    fn promotion_caps_at_last_box() {
        assert_eq!(LeitnerBox::FIRST.promoted().number(), 2);
        assert_eq!(LeitnerBox::LAST.promoted(), LeitnerBox::LAST);
    }

    #[test]
    fn new_card_is_due_immediately_in_first_box() {
        let card = Card::new("ada", "Q".into(), "A".into(), vec![], day("2024-03-01"));
        assert_eq!(card.leitner_box, LeitnerBox::FIRST);
        assert_eq!(card.next_review_date, day("2024-03-01"));
        assert_eq!(card.last_reviewed, None);
        assert_eq!(card.short_id().len(), 8);
    }

    #[test]
    fn card_json_uses_iso_dates_and_box_number() {
        let mut card = Card::new("ada", "Q".into(), "A".into(), vec!["sql".into()], day("2024-03-01"));
        card.leitner_box = LeitnerBox::new(4).unwrap();
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["box"], 4);
        assert_eq!(json["nextReviewDate"], "2024-03-01");
        assert!(json.get("lastReviewed").is_none());
    }

    #[test]
    fn card_json_with_invalid_box_is_rejected() {
        let json = r#"{"id":"x","owner":"ada","front":"Q","back":"A","box":7,
            "nextReviewDate":"2024-03-01","createdAt":"2024-03-01 10:00:00"}"#;
        assert!(serde_json::from_str::<Card>(json).is_err());
    }

    #[test]
    fn draft_becomes_fresh_card() {
        let draft = CardDraft { front: "Q".into(), back: "A".into(), tags: vec!["x".into()] };
        let card = draft.into_card("bo", day("2024-05-05"));
        assert_eq!(card.owner, "bo");
        assert_eq!(card.tags, vec!["x".to_string()]);
        assert_eq!(card.next_review_date, day("2024-05-05"));
    }
}

//! JSON snapshots of a deck, and the rule for folding another learner's
//! snapshot into the local one.

use std::collections::HashMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Card, CardDraft};

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to read or write backup: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid backup JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unsupported backup version {0} (expected {expected})", expected = BACKUP_VERSION)]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: String,
    pub cards: Vec<Card>,
}

impl Backup {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            cards,
        }
    }
}

/// Write `cards` as a pretty-printed backup
pub fn export<W: Write>(cards: &[Card], mut writer: W) -> Result<(), BackupError> {
    let backup = Backup::new(cards.to_vec());
    serde_json::to_writer_pretty(&mut writer, &backup)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn read_backup<R: Read>(reader: R) -> Result<Backup, BackupError> {
    let backup: Backup = serde_json::from_reader(reader)?;
    if backup.version != BACKUP_VERSION {
        return Err(BackupError::UnsupportedVersion(backup.version));
    }
    Ok(backup)
}

/// Read a JSON array of `{front, back, tags}` drafts
pub fn read_drafts<R: Read>(reader: R) -> Result<Vec<CardDraft>, BackupError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Combine the local deck with an incoming snapshot from the point of view of `owner`.
///
/// Each learner is authoritative for their own cards: the owner's cards come
/// from `local`, everyone else's come from `incoming`. Duplicate ids keep the
/// last occurrence, in first-seen position.
pub fn merge_for_owner(local: &[Card], incoming: &[Card], owner: &str) -> Vec<Card> {
    let mut merged: Vec<Card> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mine = local.iter().filter(|card| card.owner == owner);
    let theirs = incoming.iter().filter(|card| card.owner != owner);

    for card in mine.chain(theirs) {
        match positions.get(&card.id) {
            Some(&index) => merged[index] = card.clone(),
            None => {
                positions.insert(card.id.clone(), merged.len());
                merged.push(card.clone());
            }
        }
    }

    merged
}

//! JSON import/export of flashcard groups.
//! A group is written together with its cards; ids and review timestamps are
//! left out so the file can be imported into any account.

use crate::error::Result;
use crate::models::{Difficulty, Flashcard, FlashcardGroup, GroupColor};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupExport {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: GroupColor,
    pub cards: Vec<CardExport>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardExport {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl GroupExport {
    pub fn new(group: &FlashcardGroup, cards: &[Flashcard]) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            color: group.color,
            cards: cards
                .iter()
                .map(|card| CardExport {
                    front: card.front.clone(),
                    back: card.back.clone(),
                    difficulty: card.difficulty,
                })
                .collect(),
        }
    }
}

/// Exports a group to a JSON file at the specified path.
pub fn export_json_to_path(group: &GroupExport, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(group)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    log::info!("Group '{}' exported to '{}'", group.name, path.display());
    Ok(())
}

/// Imports a group from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<GroupExport> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let group: GroupExport = serde_json::from_str(&contents)?;

    log::info!("Group '{}' imported from '{}'", group.name, path.display());
    Ok(group)
}

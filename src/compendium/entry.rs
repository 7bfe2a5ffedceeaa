//! Compendium items and their storage keys.
//!
//! The item set is closed and matched exhaustively; there is no
//! downcasting anywhere in the crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Keyed;

/// Minimal stat block; just enough to exercise the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub name: String,
    pub armor_class: Option<i32>,
    pub hit_points: Option<i32>,
}

impl StatBlock {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            armor_class: None,
            hit_points: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: Uuid,
    pub stats: StatBlock,
    pub challenge_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub level: Option<i32>,
    pub stats: StatBlock,
    /// Player name, when this character belongs to one.
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: Uuid,
    pub name: String,
    /// `None` for cantrips.
    pub level: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompendiumItemGroup {
    pub id: Uuid,
    pub title: String,
    pub members: Vec<Uuid>,
}

/// Closed set of compendium item kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompendiumItem {
    Monster(Monster),
    Character(Character),
    Spell(Spell),
    Group(CompendiumItemGroup),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompendiumItemType {
    Monster,
    Character,
    Spell,
    Group,
}

impl CompendiumItemType {
    /// Prefix shared by all stored items of this type.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            CompendiumItemType::Monster => "compendium/monster/",
            CompendiumItemType::Character => "compendium/character/",
            CompendiumItemType::Spell => "compendium/spell/",
            CompendiumItemType::Group => "compendium/group/",
        }
    }

    /// Prefix shared by every stored item regardless of type.
    pub fn any_prefix() -> &'static str {
        "compendium/"
    }
}

impl fmt::Display for CompendiumItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompendiumItemType::Monster => "monster",
            CompendiumItemType::Character => "character",
            CompendiumItemType::Spell => "spell",
            CompendiumItemType::Group => "group",
        };
        f.write_str(name)
    }
}

impl CompendiumItem {
    pub fn id(&self) -> Uuid {
        match self {
            CompendiumItem::Monster(m) => m.id,
            CompendiumItem::Character(c) => c.id,
            CompendiumItem::Spell(s) => s.id,
            CompendiumItem::Group(g) => g.id,
        }
    }

    pub fn title(&self) -> String {
        match self {
            CompendiumItem::Monster(m) => m.stats.name.clone(),
            CompendiumItem::Character(c) => c.stats.name.clone(),
            CompendiumItem::Spell(s) => s.name.clone(),
            CompendiumItem::Group(g) => g.title.clone(),
        }
    }

    pub fn item_type(&self) -> CompendiumItemType {
        match self {
            CompendiumItem::Monster(_) => CompendiumItemType::Monster,
            CompendiumItem::Character(_) => CompendiumItemType::Character,
            CompendiumItem::Spell(_) => CompendiumItemType::Spell,
            CompendiumItem::Group(_) => CompendiumItemType::Group,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompendiumEntry {
    pub item: CompendiumItem,
}

impl CompendiumEntry {
    pub fn new(item: CompendiumItem) -> Self {
        Self { item }
    }

    pub fn null_instance() -> Self {
        Self::new(CompendiumItem::Monster(Monster {
            id: Uuid::nil(),
            stats: StatBlock::named(String::new()),
            challenge_rating: None,
        }))
    }

    pub fn title(&self) -> String {
        self.item.title()
    }
}

impl Keyed for CompendiumEntry {
    fn key(&self) -> String {
        format!("{}{}", self.item.item_type().key_prefix(), self.item.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_key_is_prefixed_by_type() {
        let entry = CompendiumEntry::new(CompendiumItem::Spell(Spell {
            id: Uuid::from_u128(3),
            name: "Mage Hand".into(),
            level: None,
        }));
        assert!(entry.key().starts_with("compendium/spell/"));
        assert!(entry.key().starts_with(CompendiumItemType::any_prefix()));
    }

    #[test]
    fn item_accessors_cover_every_kind() {
        let items = [
            CompendiumItem::Monster(Monster {
                id: Uuid::from_u128(1),
                stats: StatBlock::named("Goblin"),
                challenge_rating: Some(0.25),
            }),
            CompendiumItem::Character(Character {
                id: Uuid::from_u128(2),
                level: Some(3),
                stats: StatBlock::named("Alva"),
                player: Some("Sam".into()),
            }),
            CompendiumItem::Spell(Spell {
                id: Uuid::from_u128(3),
                name: "Shield".into(),
                level: Some(1),
            }),
            CompendiumItem::Group(CompendiumItemGroup {
                id: Uuid::from_u128(4),
                title: "Party".into(),
                members: vec![Uuid::from_u128(2)],
            }),
        ];
        let titles: Vec<String> = items.iter().map(CompendiumItem::title).collect();
        assert_eq!(titles, vec!["Goblin", "Alva", "Shield", "Party"]);
    }
}

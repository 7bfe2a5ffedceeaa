//! Compendium screen actions.

use crate::runtime::ResourceAction;
use crate::storage::StorageError;

use super::entry::{CompendiumEntry, CompendiumItemType, Monster};
use super::state::{AlertState, CompendiumNextScreen};

#[derive(Debug, Clone, PartialEq)]
pub enum CompendiumIndexAction {
    Results(ResourceAction<Vec<CompendiumEntry>, StorageError>),
    /// Change the listed item kind; reloads under the new scope.
    SetFilter(Option<CompendiumItemType>),
    SetNextScreen(Option<CompendiumNextScreen>),
    NextScreen(Box<CompendiumIndexNextAction>),
    Alert(Option<AlertState>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompendiumIndexNextAction {
    ItemDetail(CompendiumEntryDetailAction),
    CompendiumIndex(CompendiumIndexAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompendiumEntryDetailAction {
    /// Cross-cutting: handled by the compendium container, however
    /// deep the detail screen sits.
    OnSaveMonsterAsNpcTap(Monster),
}

impl CompendiumIndexAction {
    pub fn results(&self) -> Option<ResourceAction<Vec<CompendiumEntry>, StorageError>> {
        match self {
            CompendiumIndexAction::Results(action) => Some(action.clone()),
            _ => None,
        }
    }

    pub fn next_index(&self) -> Option<CompendiumIndexAction> {
        match self {
            CompendiumIndexAction::NextScreen(next) => match &**next {
                CompendiumIndexNextAction::CompendiumIndex(action) => Some(action.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// The monster a nested detail screen asked to save as an NPC,
    /// from any push depth.
    pub fn save_monster_as_npc(&self) -> Option<&Monster> {
        match self {
            CompendiumIndexAction::NextScreen(next) => match &**next {
                CompendiumIndexNextAction::ItemDetail(
                    CompendiumEntryDetailAction::OnSaveMonsterAsNpcTap(monster),
                ) => Some(monster),
                CompendiumIndexNextAction::CompendiumIndex(action) => {
                    action.save_monster_as_npc()
                }
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compendium::StatBlock;
    use uuid::Uuid;

    fn monster() -> Monster {
        Monster {
            id: Uuid::from_u128(1),
            stats: StatBlock::named("Goblin"),
            challenge_rating: None,
        }
    }

    fn tap() -> CompendiumIndexAction {
        CompendiumIndexAction::NextScreen(Box::new(CompendiumIndexNextAction::ItemDetail(
            CompendiumEntryDetailAction::OnSaveMonsterAsNpcTap(monster()),
        )))
    }

    #[test]
    fn save_as_npc_found_at_depth_one() {
        assert_eq!(tap().save_monster_as_npc(), Some(&monster()));
    }

    #[test]
    fn save_as_npc_found_through_nested_indexes() {
        let deep = CompendiumIndexAction::NextScreen(Box::new(
            CompendiumIndexNextAction::CompendiumIndex(CompendiumIndexAction::NextScreen(
                Box::new(CompendiumIndexNextAction::CompendiumIndex(tap())),
            )),
        ));
        assert_eq!(deep.save_monster_as_npc(), Some(&monster()));
    }

    #[test]
    fn save_as_npc_ignores_other_actions() {
        let action = CompendiumIndexAction::Alert(None);
        assert!(action.save_monster_as_npc().is_none());
    }
}

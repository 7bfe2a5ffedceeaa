//! Compendium index and detail screen state.

use crate::navigation::{
    normalized_screens, DedupEquatable, Destination, Presentable, PresentedScreens, StackItem,
};
use crate::runtime::AsyncResource;
use crate::storage::StorageError;

use super::entry::{CompendiumEntry, CompendiumItemType};

#[derive(Debug, Clone, PartialEq)]
pub struct CompendiumIndexState {
    pub title: String,
    /// `None` lists every item kind.
    pub item_type: Option<CompendiumItemType>,
    pub results: AsyncResource<Vec<CompendiumEntry>, StorageError>,
    pub alert: Option<AlertState>,
    pub presented_screens: PresentedScreens<CompendiumNextScreen>,
}

/// Data for a modal alert; rendering is the UI layer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompendiumNextScreen {
    ItemDetail(Box<CompendiumEntryDetailState>),
    CompendiumIndex(Box<CompendiumIndexState>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompendiumEntryDetailState {
    pub entry: CompendiumEntry,
}

impl CompendiumIndexState {
    pub fn new(title: impl Into<String>, item_type: Option<CompendiumItemType>) -> Self {
        Self {
            title: title.into(),
            item_type,
            results: AsyncResource::initial(),
            alert: None,
            presented_screens: PresentedScreens::new(),
        }
    }

    pub fn all() -> Self {
        Self::new("Compendium", None)
    }

    pub fn null_instance() -> Self {
        Self::new(String::new(), None)
    }

    pub fn next_index(&mut self) -> Option<&mut CompendiumIndexState> {
        match self.presented_screens.get_mut(&Destination::NextInStack) {
            Some(CompendiumNextScreen::CompendiumIndex(state)) => Some(state),
            _ => None,
        }
    }

    pub fn next_item_detail(&mut self) -> Option<&mut CompendiumEntryDetailState> {
        match self.presented_screens.get_mut(&Destination::NextInStack) {
            Some(CompendiumNextScreen::ItemDetail(state)) => Some(state),
            _ => None,
        }
    }
}

impl CompendiumEntryDetailState {
    pub fn new(entry: CompendiumEntry) -> Self {
        Self { entry }
    }

    pub fn null_instance() -> Self {
        Self::new(CompendiumEntry::null_instance())
    }
}

impl StackItem for CompendiumIndexState {
    fn stack_id(&self) -> String {
        match self.item_type {
            Some(t) => format!("compendium-index/{t}"),
            None => "compendium-index/all".to_string(),
        }
    }

    fn stack_title(&self) -> String {
        self.title.clone()
    }
}

impl Presentable for CompendiumNextScreen {
    fn null_instance(&self) -> Self {
        match self {
            CompendiumNextScreen::ItemDetail(_) => CompendiumNextScreen::ItemDetail(Box::new(
                CompendiumEntryDetailState::null_instance(),
            )),
            CompendiumNextScreen::CompendiumIndex(_) => CompendiumNextScreen::CompendiumIndex(
                Box::new(CompendiumIndexState::null_instance()),
            ),
        }
    }
}

impl DedupEquatable for CompendiumIndexState {
    fn normalized_for_dedup(&self) -> Self {
        let mut normalized = self.clone();
        normalized.presented_screens = normalized_screens(&self.presented_screens);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compendium::{CompendiumItem, Monster, StatBlock};
    use uuid::Uuid;

    fn index_with_pushed_detail() -> CompendiumIndexState {
        let mut state = CompendiumIndexState::all();
        let entry = CompendiumEntry::new(CompendiumItem::Monster(Monster {
            id: Uuid::from_u128(1),
            stats: StatBlock::named("Goblin"),
            challenge_rating: None,
        }));
        state.presented_screens.insert(
            Destination::NextInStack,
            CompendiumNextScreen::ItemDetail(Box::new(CompendiumEntryDetailState::new(entry))),
        );
        state
    }

    #[test]
    fn dedup_ignores_pushed_detail_contents() {
        let a = index_with_pushed_detail();
        let mut b = a.clone();
        if let Some(detail) = b.next_item_detail() {
            detail.entry = CompendiumEntry::null_instance();
        }
        assert_ne!(a, b);
        assert!(a.dedup_eq(&b));
    }

    #[test]
    fn dedup_sees_alert_at_current_level() {
        let a = index_with_pushed_detail();
        let mut b = a.clone();
        b.alert = Some(AlertState {
            title: "t".into(),
            message: "m".into(),
        });
        assert!(!a.dedup_eq(&b));
    }
}

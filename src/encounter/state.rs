//! Encounter detail screen state.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::navigation::{DedupEquatable, Presentable, StackItem};
use crate::runtime::AsyncResource;
use crate::storage::{Keyed, Record, StorageError};

use super::combatant::Combatant;
use super::model::Encounter;
use super::running::RunningEncounter;

#[derive(Debug, Clone, PartialEq)]
pub struct EncounterDetailState {
    /// The roster being assembled.
    pub building: Encounter,
    /// The run in progress, if any.
    pub running: Option<RunningEncounter>,
    /// Stored runs of this encounter, resumable from the run screen.
    pub resumable_runs: AsyncResource<Vec<Record>, StorageError>,
    pub sheet: Option<Sheet>,
    pub edit_mode: bool,
    pub selection: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sheet {
    Combatant(CombatantDetailState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatantDetailState {
    pub combatant: Combatant,
}

impl EncounterDetailState {
    pub fn new(building: Encounter) -> Self {
        Self {
            building,
            running: None,
            resumable_runs: AsyncResource::initial(),
            sheet: None,
            edit_mode: false,
            selection: BTreeSet::new(),
        }
    }

    pub fn null_instance() -> Self {
        Self::new(Encounter::new(Uuid::nil(), String::new(), Vec::new()))
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The encounter all user intent applies to: the live copy while
    /// running, the building roster otherwise.
    pub fn effective_encounter(&self) -> &Encounter {
        match &self.running {
            Some(run) => &run.current,
            None => &self.building,
        }
    }

    pub fn combatant_detail_state(&mut self) -> Option<&mut CombatantDetailState> {
        match &mut self.sheet {
            Some(Sheet::Combatant(state)) => Some(state),
            None => None,
        }
    }

    /// Refresh the sheet's combatant copy from the effective encounter.
    ///
    /// The sheet holds a copy; after any roster change the copy would
    /// silently go stale without this.
    pub(crate) fn sync_presented(&mut self) {
        let Some(Sheet::Combatant(detail)) = &self.sheet else {
            return;
        };
        let refreshed = self.effective_encounter().combatant(detail.combatant.id).cloned();
        if let (Some(Sheet::Combatant(detail)), Some(combatant)) = (&mut self.sheet, refreshed) {
            detail.combatant = combatant;
        }
    }
}

impl StackItem for EncounterDetailState {
    fn stack_id(&self) -> String {
        self.building.key()
    }

    fn stack_title(&self) -> String {
        self.effective_encounter().name.clone()
    }
}

impl Presentable for Sheet {
    fn null_instance(&self) -> Self {
        match self {
            Sheet::Combatant(_) => Sheet::Combatant(CombatantDetailState {
                combatant: Combatant::null_instance(),
            }),
        }
    }
}

impl DedupEquatable for EncounterDetailState {
    fn normalized_for_dedup(&self) -> Self {
        let mut normalized = self.clone();
        normalized.sheet = self.sheet.as_ref().map(Presentable::null_instance);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sheet() -> EncounterDetailState {
        let combatant = Combatant::new(Uuid::from_u128(10), "Goblin", 7);
        let mut state = EncounterDetailState::new(Encounter::new(
            Uuid::from_u128(1),
            "Ambush",
            vec![combatant.clone()],
        ));
        state.sheet = Some(Sheet::Combatant(CombatantDetailState { combatant }));
        state
    }

    #[test]
    fn dedup_erases_sheet_contents_but_not_presence() {
        let a = with_sheet();

        let mut b = a.clone();
        if let Some(Sheet::Combatant(detail)) = &mut b.sheet {
            detail.combatant.hit_points.current = 1;
        }
        assert_ne!(a, b);
        assert!(a.dedup_eq(&b));

        let mut c = a.clone();
        c.sheet = None;
        assert!(!a.dedup_eq(&c));
    }

    #[test]
    fn sync_refreshes_sheet_copy() {
        let mut state = with_sheet();
        state.building.combatants[0].hit_points.current = 2;
        state.sync_presented();
        if let Some(Sheet::Combatant(detail)) = &state.sheet {
            assert_eq!(detail.combatant.hit_points.current, 2);
        } else {
            panic!("expected combatant sheet");
        }
    }

    #[test]
    fn effective_encounter_prefers_running() {
        let mut state = with_sheet();
        assert_eq!(state.effective_encounter().id, state.building.id);

        let mut live = state.building.clone();
        live.name = "Live".to_string();
        state.running = Some(RunningEncounter::start(
            Uuid::from_u128(7),
            live,
            std::time::UNIX_EPOCH,
        ));
        assert_eq!(state.effective_encounter().name, "Live");
    }
}

//! Encounter detail screen actions.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::runtime::ResourceAction;
use crate::storage::{Record, StorageError};

use super::combatant::CombatantAction;
use super::model::EncounterAction;
use super::running::{RunningEncounter, RunningEncounterAction};
use super::state::Sheet;

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterDetailAction {
    OnAppear,
    /// Forwarded to the effective encounter (running copy or roster).
    Encounter(EncounterAction),
    BuildingEncounter(EncounterAction),
    RunningEncounter(RunningEncounterAction),
    OnRunTap,
    /// Resume the stored run with this key.
    OnResumeRunTap(String),
    /// `None` starts a fresh run from the current roster.
    Run(Option<RunningEncounter>),
    Stop,
    Sheet(Option<Sheet>),
    CombatantDetail(CombatantDetailAction),
    ResumableRuns(ResourceAction<Vec<Record>, StorageError>),
    RemoveResumableRun(String),
    /// `true` clears everything, `false` keeps player combatants.
    ResetEncounter(bool),
    EditMode(bool),
    Selection(BTreeSet<Uuid>),
    SelectionEncounterAction(SelectionEncounterAction),
    SelectionCombatantAction(CombatantAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionEncounterAction {
    Duplicate,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CombatantDetailAction {
    Combatant(CombatantAction),
}

impl EncounterDetailAction {
    pub fn building_encounter(&self) -> Option<EncounterAction> {
        match self {
            EncounterDetailAction::BuildingEncounter(action) => Some(action.clone()),
            _ => None,
        }
    }

    pub fn running_encounter(&self) -> Option<RunningEncounterAction> {
        match self {
            EncounterDetailAction::RunningEncounter(action) => Some(action.clone()),
            _ => None,
        }
    }

    pub fn resumable_runs(&self) -> Option<ResourceAction<Vec<Record>, StorageError>> {
        match self {
            EncounterDetailAction::ResumableRuns(action) => Some(action.clone()),
            _ => None,
        }
    }
}

//! A run in progress: roster snapshot plus turn tracking.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;
use crate::runtime::{ActionPrism, Effect, Reducer, StateLens};
use crate::storage::Keyed;

use super::model::{Encounter, EncounterAction};

/// Snapshot of an encounter being fought.
///
/// `base` is the roster as it was when the run started; `current` is
/// the live copy all in-fight changes apply to. Runs persist under a
/// prefix derived from the base encounter so they can be enumerated
/// and resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningEncounter {
    pub id: Uuid,
    pub base: Encounter,
    pub current: Encounter,
    pub turn: Option<Turn>,
    pub started_at: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub round: u32,
    pub combatant_id: Uuid,
}

impl RunningEncounter {
    pub fn start(id: Uuid, encounter: Encounter, started_at: SystemTime) -> Self {
        let turn = encounter.initiative_order().first().map(|c| Turn {
            round: 1,
            combatant_id: c.id,
        });
        Self {
            id,
            base: encounter.clone(),
            current: encounter,
            turn,
            started_at,
        }
    }

    /// Prefix under which every run of `encounter` is stored.
    pub fn key_prefix(encounter: &Encounter) -> String {
        format!("run/{}/", encounter.id)
    }
}

impl Keyed for RunningEncounter {
    fn key(&self) -> String {
        format!("{}{}", Self::key_prefix(&self.base), self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunningEncounterAction {
    /// Forwarded to the live copy of the roster.
    Current(EncounterAction),
    NextTurn,
    PreviousTurn,
}

impl RunningEncounter {
    pub fn reducer() -> Reducer<RunningEncounter, RunningEncounterAction, Environment> {
        Reducer::combine([
            Reducer::new(|state: &mut RunningEncounter, action, _env| {
                match action {
                    RunningEncounterAction::NextTurn => state.advance_turn(),
                    RunningEncounterAction::PreviousTurn => state.rewind_turn(),
                    RunningEncounterAction::Current(_) => {}
                }
                Effect::none()
            }),
            Encounter::reducer().pullback(
                StateLens::new(|state: &mut RunningEncounter| Some(&mut state.current)),
                ActionPrism::new(
                    |action: &RunningEncounterAction| match action {
                        RunningEncounterAction::Current(a) => Some(a.clone()),
                        _ => None,
                    },
                    RunningEncounterAction::Current,
                ),
            ),
        ])
    }

    fn advance_turn(&mut self) {
        let order: Vec<Uuid> = self.current.initiative_order().iter().map(|c| c.id).collect();
        let Some(first) = order.first().copied() else {
            return;
        };
        self.turn = Some(match self.turn {
            None => Turn {
                round: 1,
                combatant_id: first,
            },
            Some(turn) => {
                let at = order.iter().position(|id| *id == turn.combatant_id);
                match at {
                    Some(i) if i + 1 < order.len() => Turn {
                        round: turn.round,
                        combatant_id: order[i + 1],
                    },
                    // Wrapped (or current combatant vanished): new round.
                    _ => Turn {
                        round: turn.round + 1,
                        combatant_id: first,
                    },
                }
            }
        });
    }

    fn rewind_turn(&mut self) {
        let order: Vec<Uuid> = self.current.initiative_order().iter().map(|c| c.id).collect();
        let Some(turn) = self.turn else {
            return;
        };
        let Some(at) = order.iter().position(|id| *id == turn.combatant_id) else {
            return;
        };
        if at > 0 {
            self.turn = Some(Turn {
                round: turn.round,
                combatant_id: order[at - 1],
            });
        } else if turn.round > 1 {
            if let Some(last) = order.last().copied() {
                self.turn = Some(Turn {
                    round: turn.round - 1,
                    combatant_id: last,
                });
            }
        }
        // At the very first turn: nothing to rewind to.
    }
}

//! Encounter aggregate: the roster being built or fought.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;
use crate::runtime::{Effect, Reducer};
use crate::storage::Keyed;

use super::combatant::{self, Combatant, CombatantAction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: Uuid,
    pub name: String,
    pub combatants: Vec<Combatant>,
    /// Key of the run currently in progress, if any.
    pub running_encounter_key: Option<String>,
}

impl Encounter {
    pub fn new(id: Uuid, name: impl Into<String>, combatants: Vec<Combatant>) -> Self {
        let mut encounter = Self {
            id,
            name: name.into(),
            combatants,
            running_encounter_key: None,
        };
        encounter.update_combatant_discriminators();
        encounter
    }

    pub fn combatant(&self, id: Uuid) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Combatants that have rolled, highest initiative first.
    ///
    /// Ties break on name then discriminator so the order is stable
    /// across replays.
    pub fn initiative_order(&self) -> Vec<&Combatant> {
        let mut order: Vec<&Combatant> = self
            .combatants
            .iter()
            .filter(|c| c.initiative.is_some())
            .collect();
        order.sort_by(|a, b| {
            b.initiative
                .cmp(&a.initiative)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.discriminator.cmp(&b.discriminator))
        });
        order
    }

    /// Number same-named combatants in roster order; unique names get
    /// no discriminator.
    pub fn update_combatant_discriminators(&mut self) {
        let names: Vec<String> = self.combatants.iter().map(|c| c.name.clone()).collect();
        let mut seen: Vec<(String, i32)> = Vec::new();
        for (combatant, name) in self.combatants.iter_mut().zip(&names) {
            if names.iter().filter(|n| *n == name).count() > 1 {
                let next = match seen.iter_mut().find(|(n, _)| n == name) {
                    Some((_, count)) => {
                        *count += 1;
                        *count
                    }
                    None => {
                        seen.push((name.clone(), 1));
                        1
                    }
                };
                combatant.discriminator = Some(next);
            } else {
                combatant.discriminator = None;
            }
        }
    }
}

impl Keyed for Encounter {
    fn key(&self) -> String {
        format!("encounter/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterAction {
    Add(Combatant),
    Remove(Uuid),
    Duplicate(Uuid),
    /// Roll for every combatant that has no initiative yet.
    RollInitiative,
    Combatant(Uuid, CombatantAction),
}

impl Encounter {
    pub fn reducer() -> Reducer<Encounter, EncounterAction, Environment> {
        Reducer::combine([
            Reducer::new(|state: &mut Encounter, action, env: &Environment| {
                match action {
                    EncounterAction::Add(combatant) => {
                        state.combatants.push(combatant);
                    }
                    EncounterAction::Remove(id) => {
                        state.combatants.retain(|c| c.id != id);
                    }
                    EncounterAction::Duplicate(id) => match state.combatant(id) {
                        Some(original) => {
                            let mut copy = original.clone();
                            copy.id = env.generate_id();
                            copy.initiative = None;
                            state.combatants.push(copy);
                        }
                        None => {
                            tracing::debug!(%id, "duplicate dropped: no such combatant");
                        }
                    },
                    EncounterAction::RollInitiative => {
                        for combatant in &mut state.combatants {
                            if combatant.initiative.is_none() {
                                combatant.initiative = Some(env.dice.roll(20));
                            }
                        }
                    }
                    // Routed to the combatant below.
                    EncounterAction::Combatant(..) => {}
                }
                Effect::none()
            }),
            combatant::reducer().for_each(
                |state: &mut Encounter| &mut state.combatants,
                |action: &EncounterAction| match action {
                    EncounterAction::Combatant(id, action) => Some((*id, action.clone())),
                    _ => None,
                },
                EncounterAction::Combatant,
            ),
            // Keep "Goblin 1 / Goblin 2" labels correct after every
            // roster or name change.
            Reducer::new(|state: &mut Encounter, _action, _env| {
                state.update_combatant_discriminators();
                Effect::none()
            }),
        ])
    }
}

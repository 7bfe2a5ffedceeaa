//! Composed reducer for the encounter detail screen.

use std::sync::Arc;

use crate::environment::Environment;
use crate::runtime::{ActionPrism, AsyncResource, Effect, Reducer, ResourceAction, StateLens};
use crate::storage::KeyValueStoreExt;

use super::action::{
    CombatantDetailAction, EncounterDetailAction, SelectionEncounterAction,
};
use super::model::{Encounter, EncounterAction};
use super::running::{RunningEncounter, RunningEncounterAction};
use super::state::{EncounterDetailState, Sheet};

impl EncounterDetailState {
    pub fn reducer() -> Reducer<EncounterDetailState, EncounterDetailAction, Environment> {
        Reducer::combine([
            core_reducer(),
            Encounter::reducer().pullback(
                StateLens::new(|state: &mut EncounterDetailState| Some(&mut state.building)),
                ActionPrism::new(
                    |action: &EncounterDetailAction| action.building_encounter(),
                    EncounterDetailAction::BuildingEncounter,
                ),
            ),
            RunningEncounter::reducer().pullback(
                StateLens::new(|state: &mut EncounterDetailState| state.running.as_mut()),
                ActionPrism::new(
                    |action: &EncounterDetailAction| action.running_encounter(),
                    EncounterDetailAction::RunningEncounter,
                ),
            ),
            // Stored runs of this encounter, re-scoped when the screen
            // is reused for a different encounter.
            Reducer::with_state(
                "resumable-runs",
                |state: &EncounterDetailState| state.building.id,
                |state: &EncounterDetailState| {
                    let prefix = RunningEncounter::key_prefix(&state.building);
                    AsyncResource::reducer(move |env: &Environment| {
                        let store = Arc::clone(&env.store);
                        let prefix = prefix.clone();
                        Box::pin(async move { store.fetch_all_raw(&prefix) })
                    })
                    .pullback(
                        StateLens::new(|state: &mut EncounterDetailState| {
                            Some(&mut state.resumable_runs)
                        }),
                        ActionPrism::new(
                            |action: &EncounterDetailAction| action.resumable_runs(),
                            EncounterDetailAction::ResumableRuns,
                        ),
                    )
                },
            ),
            // The combatant sheet shows a copy; keep it in step with
            // the roster after every action.
            Reducer::new(|state: &mut EncounterDetailState, _action, _env| {
                state.sync_presented();
                Effect::none()
            }),
        ])
    }
}

fn core_reducer() -> Reducer<EncounterDetailState, EncounterDetailAction, Environment> {
    Reducer::new(
        |state: &mut EncounterDetailState, action, env: &Environment| match action {
            EncounterDetailAction::OnAppear => {
                if state.resumable_runs.result().is_none() {
                    Effect::action(EncounterDetailAction::ResumableRuns(
                        ResourceAction::StartLoading,
                    ))
                } else {
                    Effect::none()
                }
            }
            EncounterDetailAction::OnRunTap => Effect::action(EncounterDetailAction::Run(None)),
            EncounterDetailAction::OnResumeRunTap(key) => {
                let store = Arc::clone(&env.store);
                Effect::future(async move {
                    match store.get::<RunningEncounter>(&key) {
                        Ok(Some(run)) => Some(EncounterDetailAction::Run(Some(run))),
                        Ok(None) => {
                            tracing::warn!(%key, "cannot resume run: record missing");
                            None
                        }
                        Err(err) => {
                            tracing::warn!(%err, %key, "cannot resume run");
                            None
                        }
                    }
                })
            }
            EncounterDetailAction::Run(run) => {
                let run = run.unwrap_or_else(|| {
                    RunningEncounter::start(
                        env.generate_id(),
                        state.building.clone(),
                        env.clock.now(),
                    )
                });
                state.running = Some(run.clone());
                let store = Arc::clone(&env.store);
                Effect::fire_and_forget(async move {
                    if let Err(err) = store.put(&run) {
                        tracing::warn!(%err, "could not store run");
                    }
                })
            }
            EncounterDetailAction::Stop => match state.running.take() {
                Some(run) => {
                    state.building.running_encounter_key = None;
                    let store = Arc::clone(&env.store);
                    Effect::fire_and_forget(async move {
                        // Save progress so the run shows up as resumable.
                        if let Err(err) = store.put(&run) {
                            tracing::warn!(%err, "could not store stopped run");
                        }
                    })
                    .append(Effect::action(EncounterDetailAction::ResumableRuns(
                        ResourceAction::StartLoading,
                    )))
                }
                None => {
                    tracing::warn!("stop ignored: no run in progress");
                    Effect::none()
                }
            },
            EncounterDetailAction::Encounter(action) => {
                if state.is_running() {
                    Effect::action(EncounterDetailAction::RunningEncounter(
                        RunningEncounterAction::Current(action),
                    ))
                } else {
                    Effect::action(EncounterDetailAction::BuildingEncounter(action))
                }
            }
            // Handled by the pullback members.
            EncounterDetailAction::BuildingEncounter(_)
            | EncounterDetailAction::RunningEncounter(_)
            | EncounterDetailAction::ResumableRuns(_) => Effect::none(),
            EncounterDetailAction::RemoveResumableRun(key) => {
                let store = Arc::clone(&env.store);
                Effect::future(async move {
                    if let Err(err) = store.remove(&key) {
                        tracing::warn!(%err, %key, "could not remove stored run");
                    }
                    Some(EncounterDetailAction::ResumableRuns(
                        ResourceAction::StartLoading,
                    ))
                })
            }
            EncounterDetailAction::Sheet(sheet) => {
                state.sheet = sheet;
                Effect::none()
            }
            EncounterDetailAction::CombatantDetail(CombatantDetailAction::Combatant(action)) => {
                match &state.sheet {
                    Some(Sheet::Combatant(detail)) => {
                        Effect::action(EncounterDetailAction::Encounter(
                            EncounterAction::Combatant(detail.combatant.id, action),
                        ))
                    }
                    // Sheet already dismissed; normal dispatch race.
                    None => Effect::none(),
                }
            }
            EncounterDetailAction::ResetEncounter(clear_all) => {
                state.building.running_encounter_key = None;
                if clear_all {
                    state.building.combatants.clear();
                } else {
                    state.building.combatants.retain(|c| c.is_player);
                }
                state.building.update_combatant_discriminators();

                let store = Arc::clone(&env.store);
                let prefix = RunningEncounter::key_prefix(&state.building);
                Effect::fire_and_forget(async move {
                    if let Err(err) = store.remove_all(&prefix) {
                        tracing::warn!(%err, "could not clear stored runs");
                    }
                })
                .append(Effect::action(EncounterDetailAction::ResumableRuns(
                    ResourceAction::StartLoading,
                )))
            }
            EncounterDetailAction::EditMode(on) => {
                state.edit_mode = on;
                if !on {
                    state.selection.clear();
                }
                Effect::none()
            }
            EncounterDetailAction::Selection(selection) => {
                state.selection = selection;
                Effect::none()
            }
            EncounterDetailAction::SelectionCombatantAction(action) => Effect::sequence(
                state
                    .selection
                    .iter()
                    .map(|id| {
                        EncounterDetailAction::Encounter(EncounterAction::Combatant(
                            *id,
                            action.clone(),
                        ))
                    })
                    .collect::<Vec<_>>(),
            ),
            EncounterDetailAction::SelectionEncounterAction(action) => {
                let encounter = state.effective_encounter();
                Effect::sequence(
                    state
                        .selection
                        .iter()
                        .filter(|id| encounter.combatant(**id).is_some())
                        .map(|id| {
                            EncounterDetailAction::Encounter(match action {
                                SelectionEncounterAction::Duplicate => {
                                    EncounterAction::Duplicate(*id)
                                }
                                SelectionEncounterAction::Remove => EncounterAction::Remove(*id),
                            })
                        })
                        .collect::<Vec<_>>(),
                )
            }
        },
    )
}

//! Compendium index reducer and the container wrapper handling
//! cross-cutting intents.

use std::sync::Arc;

use crate::environment::Environment;
use crate::navigation::Destination;
use crate::runtime::{ActionPrism, AsyncResource, Effect, Reducer, ResourceAction, StateLens};

use super::action::{CompendiumIndexAction, CompendiumIndexNextAction};
use super::entry::{Character, CompendiumEntry, CompendiumItem};
use super::state::{AlertState, CompendiumIndexState};

impl CompendiumIndexState {
    pub fn reducer() -> Reducer<CompendiumIndexState, CompendiumIndexAction, Environment> {
        Reducer::combine([
            core_reducer(),
            // Results, re-scoped per filter: switching the listed kind
            // cancels a load still in flight for the previous one.
            Reducer::with_state(
                "compendium-results",
                |state: &CompendiumIndexState| {
                    state
                        .item_type
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "all".to_string())
                },
                |state: &CompendiumIndexState| {
                    let item_type = state.item_type;
                    AsyncResource::reducer(move |env: &Environment| {
                        let compendium = env.compendium.clone();
                        Box::pin(async move { compendium.list(item_type) })
                    })
                    .pullback(
                        StateLens::new(|state: &mut CompendiumIndexState| {
                            Some(&mut state.results)
                        }),
                        ActionPrism::new(
                            |action: &CompendiumIndexAction| action.results(),
                            CompendiumIndexAction::Results,
                        ),
                    )
                },
            ),
            // A pushed index is a full index screen again.
            Reducer::lazy(CompendiumIndexState::reducer).pullback(
                StateLens::new(CompendiumIndexState::next_index),
                ActionPrism::new(
                    |action: &CompendiumIndexAction| action.next_index(),
                    |child| {
                        CompendiumIndexAction::NextScreen(Box::new(
                            CompendiumIndexNextAction::CompendiumIndex(child),
                        ))
                    },
                ),
            ),
        ])
    }
}

fn core_reducer() -> Reducer<CompendiumIndexState, CompendiumIndexAction, Environment> {
    Reducer::new(
        |state: &mut CompendiumIndexState, action, _env: &Environment| match action {
            CompendiumIndexAction::SetFilter(item_type) => {
                state.item_type = item_type;
                Effect::action(CompendiumIndexAction::Results(ResourceAction::StartLoading))
            }
            CompendiumIndexAction::SetNextScreen(screen) => {
                match screen {
                    Some(screen) => {
                        state
                            .presented_screens
                            .insert(Destination::NextInStack, screen);
                    }
                    None => {
                        state.presented_screens.remove(&Destination::NextInStack);
                    }
                }
                Effect::none()
            }
            CompendiumIndexAction::Alert(alert) => {
                state.alert = alert;
                Effect::none()
            }
            // Routed to the pushed screen / resource members.
            CompendiumIndexAction::NextScreen(_) | CompendiumIndexAction::Results(_) => {
                Effect::none()
            }
        },
    )
}

/// Index reducer plus handling for intents that bubble out of deeply
/// pushed screens.
pub fn compendium_container_reducer(
) -> Reducer<CompendiumIndexState, CompendiumIndexAction, Environment> {
    Reducer::combine([
        Reducer::new(
            |_state: &mut CompendiumIndexState, action: CompendiumIndexAction, env: &Environment| {
                let Some(monster) = action.save_monster_as_npc() else {
                    return Effect::none();
                };
                let monster = monster.clone();
                let compendium = env.compendium.clone();
                let ids = Arc::clone(&env.ids);
                Effect::future(async move {
                    let mut stats = monster.stats;
                    stats.name = format!("{} NPC", stats.name);
                    let name = stats.name.clone();
                    let character = Character {
                        id: ids.next(),
                        level: None,
                        stats,
                        player: None,
                    };
                    match compendium.put(&CompendiumEntry::new(CompendiumItem::Character(character)))
                    {
                        Ok(()) => Some(CompendiumIndexAction::Alert(Some(AlertState {
                            title: "Monster saved as NPC".to_string(),
                            message: format!(
                                "A character named \"{name}\" was added to the compendium."
                            ),
                        }))),
                        Err(err) => {
                            tracing::warn!(%err, "could not save NPC");
                            None
                        }
                    }
                })
            },
        ),
        CompendiumIndexState::reducer(),
    ])
}

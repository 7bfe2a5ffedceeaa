//! Composed reducer for the campaign browse screen.

use std::sync::Arc;

use crate::encounter::{Encounter, EncounterDetailState};
use crate::environment::Environment;
use crate::navigation::Destination;
use crate::runtime::{ActionPrism, AsyncResource, Effect, Reducer, ResourceAction, StateLens};
use crate::storage::{KeyValueStoreExt, Keyed};

use super::action::{CampaignBrowseAction, NextScreenAction};
use super::node::{CampaignNode, CampaignNodeContents, ContentType};
use super::state::{CampaignBrowseState, Mode, NextScreen};

impl CampaignBrowseState {
    pub fn reducer() -> Reducer<CampaignBrowseState, CampaignBrowseAction, Environment> {
        Reducer::combine([
            core_reducer(),
            // Children of the current node, re-scoped per node so
            // navigating elsewhere cancels a stale listing.
            Reducer::with_state(
                "campaign-items",
                |state: &CampaignBrowseState| state.node.id,
                |state: &CampaignBrowseState| {
                    let node = state.node.clone();
                    AsyncResource::reducer(move |env: &Environment| {
                        let browser = env.campaign_browser.clone();
                        let node = node.clone();
                        Box::pin(async move { browser.nodes_in(&node) })
                    })
                    .pullback(
                        StateLens::new(|state: &mut CampaignBrowseState| Some(&mut state.items)),
                        ActionPrism::new(
                            |action: &CampaignBrowseAction| action.items(),
                            CampaignBrowseAction::Items,
                        ),
                    )
                },
            ),
            // Pushed screens; the browse case recurses into this very
            // reducer, one level built per actual push depth.
            Reducer::lazy(CampaignBrowseState::reducer).pullback(
                StateLens::new(CampaignBrowseState::next_campaign_browse),
                ActionPrism::new(
                    |action: &CampaignBrowseAction| action.next_campaign_browse(),
                    |child| {
                        CampaignBrowseAction::NextScreen(Box::new(NextScreenAction::CampaignBrowse(
                            child,
                        )))
                    },
                ),
            ),
            EncounterDetailState::reducer().pullback(
                StateLens::new(CampaignBrowseState::next_encounter_detail),
                ActionPrism::new(
                    |action: &CampaignBrowseAction| action.next_encounter_detail(),
                    |child| {
                        CampaignBrowseAction::NextScreen(Box::new(
                            NextScreenAction::EncounterDetail(child),
                        ))
                    },
                ),
            ),
            EncounterDetailState::reducer().pullback(
                StateLens::new(CampaignBrowseState::detail_encounter_detail),
                ActionPrism::new(
                    |action: &CampaignBrowseAction| action.detail_encounter_detail(),
                    |child| {
                        CampaignBrowseAction::DetailScreen(Box::new(
                            NextScreenAction::EncounterDetail(child),
                        ))
                    },
                ),
            ),
            // The move sheet is a browse screen in move mode.
            Reducer::lazy(CampaignBrowseState::reducer).pullback(
                StateLens::new(CampaignBrowseState::move_sheet_state),
                ActionPrism::new(
                    |action: &CampaignBrowseAction| action.move_sheet(),
                    |child| CampaignBrowseAction::MoveSheet(Box::new(child)),
                ),
            ),
        ])
    }
}

fn core_reducer() -> Reducer<CampaignBrowseState, CampaignBrowseAction, Environment> {
    Reducer::new(|state: &mut CampaignBrowseState, action, env: &Environment| match action {
        CampaignBrowseAction::DidTapConfirmMoveButton => {
            if let Mode::Move(nodes) = &state.mode {
                return Effect::action(CampaignBrowseAction::PerformMove(
                    nodes.clone(),
                    state.node.clone(),
                ));
            }
            Effect::none()
        }
        // Bubbles up; the screen that presented the move sheet acts on it.
        CampaignBrowseAction::PerformMove(..) => Effect::none(),
        CampaignBrowseAction::MoveSheet(inner) => match *inner {
            CampaignBrowseAction::PerformMove(items, destination) => {
                let browser = env.campaign_browser.clone();
                Effect::fire_and_forget(async move {
                    for item in &items {
                        if let Err(err) = browser.move_node(item, &destination) {
                            tracing::warn!(%err, node = %item.id, "move failed");
                        }
                    }
                })
                .append(Effect::sequence([
                    CampaignBrowseAction::Sheet(None),
                    CampaignBrowseAction::Items(ResourceAction::StartLoading),
                ]))
            }
            // Everything else belongs to the sheet's own reducer.
            _ => Effect::none(),
        },
        CampaignBrowseAction::Sheet(sheet) => {
            state.sheet = sheet;
            Effect::none()
        }
        CampaignBrowseAction::SetNextScreen(screen) => {
            present(state, Destination::NextInStack, screen);
            Effect::none()
        }
        CampaignBrowseAction::SetDetailScreen(screen) => {
            present(state, Destination::Detail, screen);
            Effect::none()
        }
        CampaignBrowseAction::NextScreen(next) => match *next {
            // Bubble-up: a move confirmed somewhere down the pushed
            // chain is re-emitted unchanged at this level.
            NextScreenAction::CampaignBrowse(CampaignBrowseAction::PerformMove(
                items,
                destination,
            )) => Effect::action(CampaignBrowseAction::PerformMove(items, destination)),
            _ => Effect::none(),
        },
        CampaignBrowseAction::DetailScreen(_) => Effect::none(),
        CampaignBrowseAction::DidTapNodeEditDone(edit, node, title) => match node {
            Some(node) => rename_node(env, node, title),
            None => create_node(env, state.node.clone(), edit.content_type, title),
        },
        CampaignBrowseAction::Remove(node) => {
            let browser = env.campaign_browser.clone();
            Effect::fire_and_forget(async move {
                if let Err(err) = browser.remove(&node) {
                    tracing::warn!(%err, node = %node.id, "remove failed");
                }
            })
            .append(Effect::action(CampaignBrowseAction::Items(
                ResourceAction::StartLoading,
            )))
        }
        // Handled by the async resource member.
        CampaignBrowseAction::Items(_) => Effect::none(),
    })
}

fn present(state: &mut CampaignBrowseState, destination: Destination, screen: Option<NextScreen>) {
    match screen {
        Some(screen) => {
            state.presented_screens.insert(destination, screen);
        }
        None => {
            state.presented_screens.remove(&destination);
        }
    }
}

/// Rename a node, keeping the title of encounter contents in sync.
fn rename_node(
    env: &Environment,
    mut node: CampaignNode,
    title: String,
) -> Effect<CampaignBrowseAction> {
    let browser = env.campaign_browser.clone();
    let store = Arc::clone(&env.store);
    Effect::future(async move {
        if let Some(CampaignNodeContents {
            key,
            content_type: ContentType::Encounter,
        }) = &node.contents
        {
            match store.get::<Encounter>(key) {
                Ok(Some(mut encounter)) => {
                    encounter.name = title.clone();
                    if let Err(err) = store.put(&encounter) {
                        tracing::warn!(%err, "could not store renamed encounter");
                    }
                }
                Ok(None) => tracing::warn!(%key, "could not rename encounter: record missing"),
                Err(err) => tracing::warn!(%err, "could not rename encounter"),
            }
        }
        node.title = title;
        if let Err(err) = browser.put(&node) {
            tracing::warn!(%err, "could not store renamed node");
        }
        Some(CampaignBrowseAction::Items(ResourceAction::StartLoading))
    })
}

/// Create a node under `parent`, including backing contents when the
/// new node is an encounter.
fn create_node(
    env: &Environment,
    parent: CampaignNode,
    content_type: Option<ContentType>,
    title: String,
) -> Effect<CampaignBrowseAction> {
    let browser = env.campaign_browser.clone();
    let store = Arc::clone(&env.store);
    let ids = Arc::clone(&env.ids);
    Effect::future(async move {
        let contents = match content_type {
            Some(ContentType::Encounter) => {
                let encounter = Encounter::new(ids.next(), title.clone(), Vec::new());
                if let Err(err) = store.put(&encounter) {
                    tracing::warn!(%err, "could not store new encounter");
                }
                Some(CampaignNodeContents {
                    key: encounter.key(),
                    content_type: ContentType::Encounter,
                })
            }
            None => None,
        };
        let node = CampaignNode {
            id: ids.next(),
            title,
            contents,
            special: None,
            parent_key_prefix: Some(parent.key_prefix_for_children()),
        };
        if let Err(err) = browser.put(&node) {
            tracing::warn!(%err, "could not store new node");
        }
        Some(CampaignBrowseAction::Items(ResourceAction::StartLoading))
    })
}

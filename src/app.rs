//! Root state and the fully composed application reducer.

use crate::campaign::{CampaignBrowseAction, CampaignBrowseState};
use crate::compendium::{compendium_container_reducer, CompendiumIndexAction, CompendiumIndexState};
use crate::environment::Environment;
use crate::runtime::{ActionPrism, Reducer, StateLens};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub campaign: CampaignBrowseState,
    pub compendium: CompendiumIndexState,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            campaign: CampaignBrowseState::root(),
            compendium: CompendiumIndexState::all(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Campaign(CampaignBrowseAction),
    Compendium(CompendiumIndexAction),
}

/// The root reducer the store runs: every feature lifted into the app
/// domain via its accessor pair.
pub fn app_reducer() -> Reducer<AppState, AppAction, Environment> {
    Reducer::combine([
        CampaignBrowseState::reducer().pullback(
            StateLens::new(|state: &mut AppState| Some(&mut state.campaign)),
            ActionPrism::new(
                |action: &AppAction| match action {
                    AppAction::Campaign(action) => Some(action.clone()),
                    _ => None,
                },
                AppAction::Campaign,
            ),
        ),
        compendium_container_reducer().pullback(
            StateLens::new(|state: &mut AppState| Some(&mut state.compendium)),
            ActionPrism::new(
                |action: &AppAction| match action {
                    AppAction::Compendium(action) => Some(action.clone()),
                    _ => None,
                },
                AppAction::Compendium,
            ),
        ),
    ])
}

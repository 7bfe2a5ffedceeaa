//! Root composition: both features behind one store.

use lorekeeper::app::{app_reducer, AppAction, AppState};
use lorekeeper::campaign::{CampaignBrowseAction, CampaignNode};
use lorekeeper::compendium::{
    CompendiumEntry, CompendiumIndexAction, CompendiumItem, Spell,
};
use lorekeeper::environment::Environment;
use lorekeeper::runtime::{ResourceAction, Store};
use uuid::Uuid;

#[tokio::test]
async fn features_load_independently_behind_one_store() {
    let env = Environment::deterministic(1);
    let root = CampaignNode::root();
    env.campaign_browser
        .put(&CampaignNode {
            id: Uuid::from_u128(1),
            title: "Chapter One".into(),
            contents: None,
            special: None,
            parent_key_prefix: Some(root.key_prefix_for_children()),
        })
        .expect("seed node");
    env.compendium
        .put(&CompendiumEntry::new(CompendiumItem::Spell(Spell {
            id: Uuid::from_u128(2),
            name: "Shield".into(),
            level: Some(1),
        })))
        .expect("seed spell");

    let store = Store::new(AppState::new(), app_reducer(), env);
    store.send(AppAction::Campaign(CampaignBrowseAction::Items(
        ResourceAction::StartLoading,
    )));
    store.send(AppAction::Compendium(CompendiumIndexAction::Results(
        ResourceAction::StartLoading,
    )));
    store.until_idle().await;

    let state = store.state();
    assert_eq!(state.campaign.items.value().map(Vec::len), Some(1));
    assert_eq!(state.compendium.results.value().map(Vec::len), Some(1));
}

#[tokio::test]
async fn one_features_action_leaves_the_other_untouched() {
    let env = Environment::deterministic(2);
    let store = Store::new(AppState::new(), app_reducer(), env);
    let before = store.state();

    store.send(AppAction::Compendium(CompendiumIndexAction::Alert(None)));
    store.until_idle().await;

    let state = store.state();
    assert_eq!(state.campaign, before.campaign);
}

//! Encounter detail screen driven end-to-end: running, resuming,
//! sheet redirection and selection-wide actions.

use std::collections::BTreeSet;

use lorekeeper::encounter::{
    Combatant, CombatantAction, CombatantDetailAction, CombatantDetailState, Encounter,
    EncounterAction, EncounterDetailAction, EncounterDetailState, RunningEncounterAction,
    SelectionEncounterAction, Sheet,
};
use lorekeeper::environment::Environment;
use lorekeeper::runtime::Store;
use uuid::Uuid;

fn ambush() -> Encounter {
    Encounter::new(
        Uuid::from_u128(1),
        "Ambush",
        vec![
            Combatant::player(Uuid::from_u128(10), "Alva", 24),
            Combatant::new(Uuid::from_u128(11), "Goblin", 7),
            Combatant::new(Uuid::from_u128(12), "Goblin", 7),
        ],
    )
}

fn store_with(env: Environment) -> Store<EncounterDetailState, EncounterDetailAction> {
    Store::new(
        EncounterDetailState::new(ambush()),
        EncounterDetailState::reducer(),
        env,
    )
}

#[tokio::test]
async fn on_appear_loads_resumable_runs_once() {
    let env = Environment::deterministic(1);
    let store = store_with(env);

    store.send(EncounterDetailAction::OnAppear);
    store.until_idle().await;
    let state = store.state();
    assert_eq!(state.resumable_runs.value().map(Vec::len), Some(0));

    // A second appearance must not reload an already loaded list.
    store.send(EncounterDetailAction::OnAppear);
    store.until_idle().await;
    assert_eq!(store.state().resumable_runs, state.resumable_runs);
}

#[tokio::test]
async fn run_stop_resume_round_trips_progress() {
    let env = Environment::deterministic(2);
    let store = store_with(env);

    store.send(EncounterDetailAction::Encounter(
        EncounterAction::RollInitiative,
    ));
    store.send(EncounterDetailAction::OnRunTap);
    store.until_idle().await;
    assert!(store.state().is_running());

    // Damage lands on the running copy, not the roster being built.
    store.send(EncounterDetailAction::Encounter(EncounterAction::Combatant(
        Uuid::from_u128(11),
        CombatantAction::ApplyDamage(5),
    )));
    store.send(EncounterDetailAction::RunningEncounter(
        RunningEncounterAction::NextTurn,
    ));
    store.send(EncounterDetailAction::Stop);
    store.until_idle().await;

    let state = store.state();
    assert!(!state.is_running());
    assert_eq!(
        state
            .building
            .combatant(Uuid::from_u128(11))
            .expect("goblin")
            .hit_points
            .current,
        7
    );
    let resumable = state.resumable_runs.value().expect("runs listed");
    assert_eq!(resumable.len(), 1);

    // Resume from the stored record and find the progress again.
    let key = resumable[0].key.clone();
    store.send(EncounterDetailAction::OnResumeRunTap(key));
    store.until_idle().await;

    let state = store.state();
    let run = state.running.as_ref().expect("resumed");
    assert_eq!(
        run.current
            .combatant(Uuid::from_u128(11))
            .expect("goblin")
            .hit_points
            .current,
        2
    );
}

#[tokio::test]
async fn resuming_a_missing_run_is_a_noop() {
    let env = Environment::deterministic(3);
    let store = store_with(env);

    store.send(EncounterDetailAction::OnResumeRunTap(
        "run/does-not/exist".to_string(),
    ));
    store.until_idle().await;
    assert!(!store.state().is_running());
}

#[tokio::test]
async fn running_actions_without_a_run_are_dropped() {
    let env = Environment::deterministic(4);
    let store = store_with(env);
    let before = store.state();

    store.send(EncounterDetailAction::RunningEncounter(
        RunningEncounterAction::NextTurn,
    ));
    store.until_idle().await;
    assert_eq!(store.state(), before);
}

#[tokio::test]
async fn combatant_sheet_redirects_to_the_roster_and_stays_in_sync() {
    let env = Environment::deterministic(5);
    let store = store_with(env);

    let goblin = ambush().combatant(Uuid::from_u128(11)).cloned().expect("goblin");
    store.send(EncounterDetailAction::Sheet(Some(Sheet::Combatant(
        CombatantDetailState { combatant: goblin },
    ))));
    store.send(EncounterDetailAction::CombatantDetail(
        CombatantDetailAction::Combatant(CombatantAction::ApplyDamage(4)),
    ));
    store.until_idle().await;

    let state = store.state();
    assert_eq!(
        state
            .building
            .combatant(Uuid::from_u128(11))
            .expect("goblin")
            .hit_points
            .current,
        3
    );
    match &state.sheet {
        Some(Sheet::Combatant(detail)) => {
            assert_eq!(detail.combatant.hit_points.current, 3);
        }
        other => panic!("expected combatant sheet, got {other:?}"),
    }
}

#[tokio::test]
async fn sheet_actions_after_dismiss_are_dropped() {
    let env = Environment::deterministic(6);
    let store = store_with(env);

    store.send(EncounterDetailAction::CombatantDetail(
        CombatantDetailAction::Combatant(CombatantAction::ApplyDamage(4)),
    ));
    store.until_idle().await;

    // No sheet was ever presented; nothing may change.
    assert_eq!(store.state().building, ambush());
}

#[tokio::test]
async fn selection_actions_fan_out_over_the_selection() {
    let env = Environment::deterministic(7);
    let store = store_with(env);

    store.send(EncounterDetailAction::EditMode(true));
    store.send(EncounterDetailAction::Selection(BTreeSet::from([
        Uuid::from_u128(11),
        Uuid::from_u128(12),
    ])));
    store.send(EncounterDetailAction::SelectionCombatantAction(
        CombatantAction::ApplyDamage(2),
    ));
    store.until_idle().await;

    let state = store.state();
    for id in [11u128, 12] {
        assert_eq!(
            state
                .building
                .combatant(Uuid::from_u128(id))
                .expect("goblin")
                .hit_points
                .current,
            5
        );
    }
    assert_eq!(
        state
            .building
            .combatant(Uuid::from_u128(10))
            .expect("alva")
            .hit_points
            .current,
        24
    );

    store.send(EncounterDetailAction::SelectionEncounterAction(
        SelectionEncounterAction::Remove,
    ));
    store.until_idle().await;
    assert_eq!(store.state().building.combatants.len(), 1);

    // Leaving edit mode clears the (now stale) selection.
    store.send(EncounterDetailAction::EditMode(false));
    store.until_idle().await;
    assert!(store.state().selection.is_empty());
}

#[tokio::test]
async fn reset_keeps_players_and_clears_stored_runs() {
    let env = Environment::deterministic(8);
    let store = store_with(env);

    store.send(EncounterDetailAction::OnRunTap);
    store.send(EncounterDetailAction::Stop);
    store.until_idle().await;
    assert_eq!(store.state().resumable_runs.value().map(Vec::len), Some(1));

    store.send(EncounterDetailAction::ResetEncounter(false));
    store.until_idle().await;

    let state = store.state();
    assert_eq!(state.building.combatants.len(), 1);
    assert!(state.building.combatants[0].is_player);
    assert_eq!(state.resumable_runs.value().map(Vec::len), Some(0));
}

#[tokio::test]
async fn remove_resumable_run_deletes_and_reloads() {
    let env = Environment::deterministic(9);
    let store = store_with(env);

    store.send(EncounterDetailAction::OnRunTap);
    store.send(EncounterDetailAction::Stop);
    store.until_idle().await;

    let key = store.state().resumable_runs.value().expect("runs")[0]
        .key
        .clone();
    store.send(EncounterDetailAction::RemoveResumableRun(key));
    store.until_idle().await;
    assert_eq!(store.state().resumable_runs.value().map(Vec::len), Some(0));
}

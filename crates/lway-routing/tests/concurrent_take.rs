//! Races on the take path: exactly one winner, no leaked claims.

use std::sync::{Arc, Barrier};
use std::time::Duration;

use lway_core::{Actor, ActorName, ContractId};
use lway_routing::{
    BoardSnapshot, EngineConfig, ErrorKind, RoutingEngine, RoutingError, RoutingState,
};

const BOARD: &str = include_str!("../../../fixtures/board.yaml");

fn engine(delay: Duration) -> RoutingEngine {
    RoutingEngine::from_snapshot(
        EngineConfig::with_claim_confirmation(delay),
        BoardSnapshot::from_yaml_str(BOARD).unwrap(),
    )
    .unwrap()
}

fn actor(name: &str) -> Actor {
    Actor::new(ActorName::new(name).unwrap(), "Manager")
}

fn c001() -> ContractId {
    ContractId::new("C-001").unwrap()
}

#[tokio::test]
async fn two_takes_one_winner() {
    let engine = engine(Duration::from_millis(20));
    let id = c001();
    let ivan = actor("Ivan");
    let petr = actor("Petr");

    let (a, b) = tokio::join!(engine.take(&id, &ivan), engine.take(&id, &petr));

    let (winner, loser) = match (a, b) {
        (Ok(c), Err(e)) => (c.assigned_to.unwrap(), e),
        (Err(e), Ok(c)) => (c.assigned_to.unwrap(), e),
        other => panic!("expected one winner, got {other:?}"),
    };
    assert_eq!(loser.kind(), ErrorKind::AlreadyClaiming);

    let stored = engine.get(&id).unwrap();
    assert_eq!(stored.assigned_to, Some(winner));
    assert_eq!(engine.state_of(&id).unwrap(), RoutingState::Work);
    assert_eq!(engine.history(&id).unwrap().len(), 1);
    assert_eq!(engine.claims().in_flight_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_spawned_takes_one_winner() {
    let engine = engine(Duration::from_millis(10));
    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let who = actor(&format!("Actor{i}"));
            engine.take(&c001(), &who).await.map(|_| who)
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(who) => winners.push(who),
            Err(RoutingError::AlreadyClaiming(_)) | Err(RoutingError::InvalidTransition { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(engine.get(&c001()).unwrap().assigned_to, Some(winners[0].clone()));
    assert_eq!(engine.history(&c001()).unwrap().len(), 1);
}

#[test]
fn threaded_begin_take_single_token() {
    let engine = engine(Duration::ZERO);
    let barrier = Arc::new(Barrier::new(6));
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let who = actor(&format!("Actor{i}"));
                barrier.wait();
                let token = engine.begin_take(&c001(), &who)?;
                engine.commit_take(token, &who)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            err.kind(),
            ErrorKind::AlreadyClaiming | ErrorKind::InvalidTransition
        ));
    }
    assert_eq!(engine.claims().in_flight_count(), 0);
}

#[test]
fn abort_restores_an_unclaimed_contract() {
    let engine = engine(Duration::ZERO);
    let id = c001();
    let before = engine.get(&id).unwrap();

    let token = engine.begin_take(&id, &actor("Ivan")).unwrap();
    assert_eq!(engine.state_of(&id).unwrap(), RoutingState::Claiming);
    engine.abort_take(token);

    assert_eq!(engine.get(&id).unwrap(), before);
    assert_eq!(engine.state_of(&id).unwrap(), RoutingState::IncomingFree);
    assert!(engine.history(&id).unwrap().is_empty());

    // A fresh take succeeds as if nothing happened.
    let token = engine.begin_take(&id, &actor("Petr")).unwrap();
    let taken = engine.commit_take(token, &actor("Petr")).unwrap();
    assert_eq!(taken.assigned_to.unwrap().name.as_str(), "Petr");
}

#[tokio::test]
async fn cancelled_take_releases_the_claim() {
    let engine = engine(Duration::from_secs(5));
    let id = c001();
    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        engine.take(&id, &actor("Ivan")),
    )
    .await;
    assert!(outcome.is_err());

    assert_eq!(engine.claims().in_flight_count(), 0);
    assert_eq!(engine.state_of(&id).unwrap(), RoutingState::IncomingFree);
    assert!(engine.get(&id).unwrap().assigned_to.is_none());
}

#[test]
fn dropped_token_releases_the_claim() {
    let engine = engine(Duration::ZERO);
    let id = c001();
    {
        let _token = engine.begin_take(&id, &actor("Ivan")).unwrap();
        assert!(engine.claims().is_claiming(&id));
    }
    assert!(!engine.claims().is_claiming(&id));
}

#[test]
fn claims_on_different_contracts_do_not_interfere() {
    let engine = engine(Duration::ZERO);
    let a = engine.begin_take(&c001(), &actor("Ivan")).unwrap();
    let b = engine
        .begin_take(&ContractId::new("C-002").unwrap(), &actor("Petr"))
        .unwrap();
    assert_eq!(engine.claims().in_flight_count(), 2);
    engine.commit_take(b, &actor("Petr")).unwrap();
    engine.commit_take(a, &actor("Ivan")).unwrap();
    assert_eq!(engine.pool_summary().incoming_free, 0);
}

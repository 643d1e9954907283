//! Integration tests driving the engine facade end to end:
//! submission → ledger → consensus → repository → readback.
//!
//! Most tests use the in-memory nullable store so failures can be injected;
//! one test repeats the consensus flow against a real LMDB environment.

use fuelmap_engine::{EngineError, StationEngine, Submission};
use fuelmap_ledger::{LedgerError, VoteResult};
use fuelmap_nullables::{NullClock, NullStore};
use fuelmap_store::{PriceHistoryStore, StationStore};
use fuelmap_store_lmdb::LmdbEnvironment;
use fuelmap_types::{
    ActorId, Coordinates, EngineParams, FuelType, NewStation, Price, PriceSource, StationId,
    Timestamp, TrustScore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_700_000_000;

fn engine() -> StationEngine<NullStore> {
    StationEngine::new(NullStore::new(), EngineParams::default()).expect("engine")
}

fn actor(name: &str) -> ActorId {
    ActorId::new(name).unwrap()
}

fn id(s: &str) -> StationId {
    StationId::new(s).unwrap()
}

fn new_station(station: &str, owner: Option<&str>) -> NewStation {
    NewStation {
        id: id(station),
        name: format!("Posto {station}"),
        cnpj: None,
        location: None,
        owner: owner.map(actor),
    }
}

fn located(station: &str, lat: f64, lon: f64) -> NewStation {
    NewStation {
        location: Some(Coordinates::new(lat, lon).unwrap()),
        ..new_station(station, None)
    }
}

// ---------------------------------------------------------------------------
// 1. Community consensus
// ---------------------------------------------------------------------------

#[test]
fn three_distinct_proposals_reach_consensus() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine.register_station(new_station("s1", None), clock.now()).unwrap();

    let mut results = Vec::new();
    for voter in ["ana", "bia", "caio"] {
        clock.advance(60);
        let submission = engine
            .propose_price(&id("s1"), FuelType::Gasoline, 5.00, actor(voter), clock.now())
            .unwrap();
        let Submission::Community(outcome) = submission else {
            panic!("expected community path");
        };
        results.push((outcome.opened, outcome.vote.result, outcome.vote.change.votes));
    }
    assert_eq!(
        results,
        vec![
            (true, VoteResult::VoteRecorded, 1),
            (false, VoteResult::VoteRecorded, 2),
            (false, VoteResult::ConsensusReached, 3),
        ]
    );

    let station = engine.station(&id("s1")).unwrap();
    assert_eq!(station.prices.get(FuelType::Gasoline), Some(Price::new(5.0).unwrap()));
    assert!(station.is_verified);
    assert!(station.pending_changes.is_empty());

    let history = engine.price_history(&id("s1")).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source, PriceSource::Consensus);
    assert_eq!(history[0].recorded_at, clock.now());

    assert_eq!(engine.metrics().proposals.get(), 3);
    assert_eq!(engine.metrics().consensus_reached.get(), 1);
}

#[test]
fn repeat_voter_is_reported_and_not_counted() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine.register_station(new_station("s1", None), clock.now()).unwrap();
    engine
        .propose_price(&id("s1"), FuelType::Ethanol, 3.89, actor("ana"), clock.now())
        .unwrap();

    let result = engine
        .vote_on_pending_price(&id("s1"), FuelType::Ethanol, actor("ana"), clock.now())
        .unwrap();
    assert_eq!(result, VoteResult::AlreadyVoted);

    let station = engine.station(&id("s1")).unwrap();
    assert_eq!(station.pending_for(FuelType::Ethanol).unwrap().votes, 1);
    assert_eq!(engine.metrics().duplicate_votes.get(), 1);
}

#[test]
fn vote_without_pending_change_is_not_found() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine.register_station(new_station("s1", None), clock.now()).unwrap();

    let err = engine
        .vote_on_pending_price(&id("s1"), FuelType::Diesel, actor("ana"), clock.now())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::NoPendingChange(FuelType::Diesel))
    ));
}

#[test]
fn dispute_on_confirmed_price_clears_verification_until_resolved() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine
        .register_station(new_station("s1", Some("owner")), clock.now())
        .unwrap();
    engine
        .propose_price(&id("s1"), FuelType::Gasoline, 5.49, actor("owner"), clock.now())
        .unwrap();

    engine
        .propose_price(&id("s1"), FuelType::Gasoline, 5.99, actor("ana"), clock.now())
        .unwrap();
    let disputed = engine.station(&id("s1")).unwrap();
    assert!(!disputed.is_verified);
    assert_eq!(disputed.prices.get(FuelType::Gasoline), Some(Price::new(5.49).unwrap()));

    for voter in ["bia", "caio"] {
        engine
            .vote_on_pending_price(&id("s1"), FuelType::Gasoline, actor(voter), clock.now())
            .unwrap();
    }
    let resolved = engine.station(&id("s1")).unwrap();
    assert!(resolved.is_verified);
    assert_eq!(resolved.prices.get(FuelType::Gasoline), Some(Price::new(5.99).unwrap()));
}

// ---------------------------------------------------------------------------
// 2. Owner bypass
// ---------------------------------------------------------------------------

#[test]
fn owner_sets_price_directly_and_supersedes_pending() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine
        .register_station(new_station("s1", Some("dono")), clock.now())
        .unwrap();
    engine
        .propose_price(&id("s1"), FuelType::Diesel, 6.10, actor("ana"), clock.now())
        .unwrap();

    clock.advance(30);
    let submission = engine
        .propose_price(&id("s1"), FuelType::Diesel, 5.95, actor("dono"), clock.now())
        .unwrap();
    let Submission::Owner(update) = submission else {
        panic!("expected owner path");
    };
    assert!(update.superseded.is_some());

    let station = engine.station(&id("s1")).unwrap();
    assert_eq!(station.prices.get(FuelType::Diesel), Some(Price::new(5.95).unwrap()));
    assert!(station.pending_changes.is_empty());
    assert!(station.is_verified);
    // 5 base + 3 verified + 1 undisputed
    assert_eq!(station.trust_score, TrustScore::clamped(9.0));

    let history = engine.price_history(&id("s1")).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source, PriceSource::Owner);
    assert_eq!(engine.metrics().owner_updates.get(), 1);
}

// ---------------------------------------------------------------------------
// 3. Validation and not-found
// ---------------------------------------------------------------------------

#[test]
fn invalid_price_is_rejected_without_mutation() {
    let engine = engine();
    let clock = NullClock::new(START);
    let before = engine.register_station(new_station("s1", None), clock.now()).unwrap();

    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = engine
            .propose_price(&id("s1"), FuelType::Gasoline, bad, actor("ana"), clock.now())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
    assert_eq!(engine.station(&id("s1")).unwrap(), before);
}

#[test]
fn unknown_station_is_not_found() {
    let engine = engine();
    let now = Timestamp::new(START);
    let missing = id("ghost");
    assert!(matches!(
        engine.propose_price(&missing, FuelType::Gasoline, 5.0, actor("ana"), now),
        Err(EngineError::StationNotFound(_))
    ));
    assert!(matches!(engine.station(&missing), Err(EngineError::StationNotFound(_))));
    assert!(matches!(engine.delete_station(&missing), Err(EngineError::StationNotFound(_))));
    assert!(matches!(engine.price_history(&missing), Err(EngineError::StationNotFound(_))));
}

#[test]
fn duplicate_registration_is_rejected() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(new_station("s1", None), now).unwrap();
    assert!(matches!(
        engine.register_station(new_station("s1", None), now),
        Err(EngineError::DuplicateStation(_))
    ));
}

// ---------------------------------------------------------------------------
// 4. Persistence failures roll back
// ---------------------------------------------------------------------------

#[test]
fn failed_consensus_commit_leaves_store_untouched() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine.register_station(new_station("s1", None), clock.now()).unwrap();
    for voter in ["ana", "bia"] {
        engine
            .propose_price(&id("s1"), FuelType::Gasoline, 5.00, actor(voter), clock.now())
            .unwrap();
    }
    let before = engine.station(&id("s1")).unwrap();

    engine.repository().fail_writes(true);
    let err = engine
        .vote_on_pending_price(&id("s1"), FuelType::Gasoline, actor("caio"), clock.now())
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
    assert_eq!(engine.metrics().persistence_failures.get(), 1);
    assert_eq!(engine.metrics().consensus_reached.get(), 0);

    engine.repository().fail_writes(false);
    assert_eq!(engine.station(&id("s1")).unwrap(), before);
    assert!(engine.price_history(&id("s1")).unwrap().is_empty());

    // The same vote succeeds once storage recovers.
    let result = engine
        .vote_on_pending_price(&id("s1"), FuelType::Gasoline, actor("caio"), clock.now())
        .unwrap();
    assert_eq!(result, VoteResult::ConsensusReached);
}

#[test]
fn failed_owner_update_is_not_applied() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(new_station("s1", Some("dono")), now).unwrap();

    engine.repository().fail_writes(true);
    assert!(matches!(
        engine.propose_price(&id("s1"), FuelType::Ethanol, 3.79, actor("dono"), now),
        Err(EngineError::Persistence(_))
    ));
    engine.repository().fail_writes(false);

    let station = engine.station(&id("s1")).unwrap();
    assert!(station.prices.get(FuelType::Ethanol).is_none());
    assert_eq!(engine.metrics().owner_updates.get(), 0);
}

// ---------------------------------------------------------------------------
// 5. Batch recomputation and best value
// ---------------------------------------------------------------------------

#[test]
fn refresh_flags_one_best_value_station() {
    let engine = engine();
    let clock = NullClock::new(START);
    // Owner-managed stations reach trust 9.5 with a competitive gasoline price.
    engine.register_station(new_station("a", Some("owner-a")), clock.now()).unwrap();
    engine.register_station(new_station("b", Some("owner-b")), clock.now()).unwrap();
    engine.register_station(new_station("c", None), clock.now()).unwrap();
    engine
        .propose_price(&id("a"), FuelType::Gasoline, 5.50, actor("owner-a"), clock.now())
        .unwrap();
    engine
        .propose_price(&id("b"), FuelType::Gasoline, 5.20, actor("owner-b"), clock.now())
        .unwrap();

    let summary = engine.refresh(clock.now()).unwrap();
    assert_eq!(summary.stations, 3);
    assert_eq!(summary.best_value, Some(id("b")));

    let flagged: Vec<StationId> = engine
        .repository()
        .load_all_stations()
        .unwrap()
        .into_iter()
        .filter(|s| s.is_best_value)
        .map(|s| s.id)
        .collect();
    assert_eq!(flagged, vec![id("b")]);
    assert_eq!(engine.metrics().tracked_stations.get(), 3);

    // Nothing changed, so a second pass writes nothing.
    assert_eq!(engine.refresh(clock.now()).unwrap().updated, 0);
}

#[test]
fn failed_refresh_keeps_a_single_best_value_station() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(new_station("z", Some("owner-z")), now).unwrap();
    engine
        .propose_price(&id("z"), FuelType::Gasoline, 5.50, actor("owner-z"), now)
        .unwrap();
    assert_eq!(engine.refresh(now).unwrap().best_value, Some(id("z")));

    // "a" sorts first and would take the flag from "z".
    engine.register_station(new_station("a", Some("owner-a")), now).unwrap();
    engine
        .propose_price(&id("a"), FuelType::Gasoline, 4.00, actor("owner-a"), now)
        .unwrap();
    engine.repository().fail_writes_for(&id("z")).unwrap();

    let err = engine.refresh(now).unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
    assert_eq!(engine.metrics().persistence_failures.get(), 1);

    let flagged: Vec<StationId> = engine
        .repository()
        .load_all_stations()
        .unwrap()
        .into_iter()
        .filter(|s| s.is_best_value)
        .map(|s| s.id)
        .collect();
    assert_eq!(flagged, vec![id("z")]);
}

#[test]
fn stale_dispute_lowers_trust_on_refresh() {
    let engine = engine();
    let clock = NullClock::new(START);
    engine.register_station(new_station("s1", None), clock.now()).unwrap();
    engine
        .propose_price(&id("s1"), FuelType::Diesel, 6.30, actor("ana"), clock.now())
        .unwrap();
    engine.refresh(clock.now()).unwrap();
    let fresh = engine.station(&id("s1")).unwrap().trust_score;

    clock.advance_days(8);
    engine.refresh(clock.now()).unwrap();
    let stale = engine.station(&id("s1")).unwrap().trust_score;
    assert_eq!(fresh, TrustScore::clamped(5.0));
    assert_eq!(stale, TrustScore::clamped(4.5));
}

#[test]
fn best_value_station_does_not_write() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(new_station("a", Some("o")), now).unwrap();
    engine
        .propose_price(&id("a"), FuelType::Gasoline, 5.0, actor("o"), now)
        .unwrap();

    let best = engine.best_value_station(now).unwrap().unwrap();
    assert_eq!(best.id, id("a"));
    assert!(best.is_best_value);
    assert!(!engine.station(&id("a")).unwrap().is_best_value);
}

// ---------------------------------------------------------------------------
// 6. Lifecycle and queries
// ---------------------------------------------------------------------------

#[test]
fn delete_cascades_to_price_history() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(new_station("s1", Some("dono")), now).unwrap();
    for price in [5.10, 5.20, 5.30] {
        engine
            .propose_price(&id("s1"), FuelType::Gasoline, price, actor("dono"), now)
            .unwrap();
    }
    assert_eq!(engine.delete_station(&id("s1")).unwrap(), 3);
    assert_eq!(engine.repository().station_count().unwrap(), 0);
    assert!(engine.repository().price_history(&id("s1")).unwrap().is_empty());
}

#[test]
fn nearby_uses_configured_radius_and_sorts() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine.register_station(located("far", -7.20, -41.4669), now).unwrap();
    engine.register_station(located("near", -7.0780, -41.4670), now).unwrap();
    engine.register_station(located("mid", -7.0900, -41.4669), now).unwrap();
    engine.register_station(new_station("unmapped", None), now).unwrap();

    let center = Coordinates::new(-7.076944, -41.466944).unwrap();
    let ids: Vec<String> = engine
        .nearby(&center, None)
        .unwrap()
        .into_iter()
        .map(|n| n.station.id.to_string())
        .collect();
    assert_eq!(ids, vec!["near", "mid"]);

    assert_eq!(engine.nearby(&center, Some(50.0)).unwrap().len(), 3);
    assert!(matches!(
        engine.nearby(&center, Some(0.0)),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn search_by_name_and_cnpj() {
    let engine = engine();
    let now = Timestamp::new(START);
    engine
        .register_station(
            NewStation {
                cnpj: Some("12.345.678/0001-90".into()),
                ..new_station("ipiranga", None)
            },
            now,
        )
        .unwrap();
    engine.register_station(new_station("shell", None), now).unwrap();

    assert_eq!(engine.search("POSTO").unwrap().len(), 2);
    let by_cnpj = engine.search("345.678").unwrap();
    assert_eq!(by_cnpj.len(), 1);
    assert_eq!(by_cnpj[0].id, id("ipiranga"));
    assert!(engine.search("  ").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// 7. LMDB end to end
// ---------------------------------------------------------------------------

#[test]
fn consensus_flow_persists_through_lmdb() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = NullClock::new(START);
    {
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
        let engine = StationEngine::new(
            env.station_store(),
            EngineParams {
                confirmation_threshold: 2,
                ..EngineParams::default()
            },
        )
        .unwrap();
        engine.register_station(new_station("s1", None), clock.now()).unwrap();
        for voter in ["ana", "bia"] {
            clock.advance(1);
            engine
                .propose_price(&id("s1"), FuelType::Ethanol, 3.99, actor(voter), clock.now())
                .unwrap();
        }
    }

    let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("reopen env");
    let store = env.station_store();
    let station = store.get_station(&id("s1")).unwrap();
    assert_eq!(station.prices.get(FuelType::Ethanol), Some(Price::new(3.99).unwrap()));
    assert!(station.is_verified);
    let history = store.price_history(&id("s1")).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].recorded_at, clock.now());
}

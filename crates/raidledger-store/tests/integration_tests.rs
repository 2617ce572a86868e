//! Integration tests for raidledger-store
//!
//! These tests exercise clear ingestion, clear-history queries, versioned
//! ledger writes and the atomic review commit.

use chrono::{DateTime, Duration, TimeZone, Utc};
use raidledger_domain::traits::{ClearHistoryStore, LedgerStore, StoreFailure, SubmissionStore};
use raidledger_domain::{
    Clear, Encounter, EncounterId, Job, LedgerRecord, Member, MemberId, PointsCategory,
    PointsEvent, PointsEventStatus, Submission, SubmissionChannel, TierId,
};
use raidledger_store::SqliteStore;

fn t(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, day, hour, 0, 0).unwrap()
}

fn tier() -> TierId {
    TierId::parse("ANABASEIOS").unwrap()
}

fn clear(member: u64, encounter: &str, at: DateTime<Utc>, fight: u32) -> Clear {
    Clear {
        member_id: MemberId(member),
        encounter_id: EncounterId::from(encounter),
        start_time: at,
        report_id: "aBcD1234".to_string(),
        report_fight_id: fight,
        job: Job("WHM".to_string()),
        locked_in: false,
    }
}

fn seeded_store(roster_size: u64) -> SqliteStore {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .register_encounters(&[
            Encounter::new("p9s", "P9S", 88).with_difficulty(101),
            Encounter::new("p9s_echo", "P9S", 88).with_difficulty(101).echo(13),
            Encounter::new("p10s", "P10S", 89).with_difficulty(101),
        ])
        .unwrap();
    let roster: Vec<Member> = (1..=roster_size)
        .map(|i| Member::new(i, format!("Member {}", i), (i % 3) as u32))
        .collect();
    store.replace_roster(&roster).unwrap();
    store
}

#[test]
fn test_record_clears_is_idempotent() {
    let mut store = seeded_store(5);
    let batch = vec![clear(1, "p9s", t(1, 20), 3), clear(2, "p9s", t(1, 20), 3)];

    assert_eq!(store.record_clears(&batch).unwrap(), 2);
    assert_eq!(store.record_clears(&batch).unwrap(), 0);

    let rate = store.clear_rate("P9S", false).unwrap();
    assert_eq!(rate.clears, 2);
}

#[test]
fn test_clear_rate_counts_distinct_members() {
    let mut store = seeded_store(10);
    let mut batch = Vec::new();
    for m in 1..=7 {
        batch.push(clear(m, "p9s", t(2, 20), m as u32));
    }
    // Second clear by member 1 does not change the numerator
    batch.push(clear(1, "p9s", t(9, 20), 50));
    store.record_clears(&batch).unwrap();

    let rate = store.clear_rate("P9S", false).unwrap();
    assert_eq!((rate.clears, rate.eligible_members), (7, 10));
    assert_eq!(rate.to_string(), "7 / 10");
}

#[test]
fn test_clear_rate_echo_filter() {
    let mut store = seeded_store(4);
    store
        .record_clears(&[clear(1, "p9s", t(1, 20), 1), clear(2, "p9s_echo", t(20, 20), 2)])
        .unwrap();

    assert_eq!(store.clear_rate("P9S", false).unwrap().clears, 1);
    assert_eq!(store.clear_rate("P9S", true).unwrap().clears, 2);
}

#[test]
fn test_clear_rate_unknown_encounter() {
    let store = seeded_store(4);
    let err = store.clear_rate("P99S", false).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_clear_rates_cover_uncleared_encounters() {
    let mut store = seeded_store(4);
    store.record_clears(&[clear(1, "p9s", t(1, 20), 1)]).unwrap();

    let rates = store.clear_rates(false).unwrap();
    assert_eq!(rates["P9S"].clears, 1);
    assert_eq!(rates["P10S"].clears, 0);
    assert_eq!(rates["P10S"].eligible_members, 4);
}

#[test]
fn test_clear_order_buckets_first_clears_by_date() {
    let mut store = seeded_store(5);
    store
        .record_clears(&[
            clear(1, "p9s", t(1, 20), 1),
            clear(2, "p9s", t(1, 21), 2),
            clear(1, "p9s", t(3, 20), 3),
            clear(3, "p9s", t(3, 20), 3),
        ])
        .unwrap();

    let order = store.clear_order_for("P9S", false).unwrap();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0].members.len(), 2);
    assert_eq!(order[1].members.iter().copied().collect::<Vec<_>>(), vec![MemberId(3)]);

    let all = store.clear_order(false).unwrap();
    assert_eq!(all["P9S"], order);
    assert!(!all.contains_key("P10S"));
}

#[test]
fn test_prior_clears_respects_cutoff() {
    let mut store = seeded_store(5);
    let fight_start = t(10, 20);
    store
        .record_clears(&[
            // Same fight recorded 30s after its start is not a prior clear
            clear(1, "p9s", fight_start + Duration::seconds(30), 7),
            clear(2, "p9s", fight_start - Duration::days(3), 1),
            clear(3, "p10s", fight_start - Duration::days(3), 1),
        ])
        .unwrap();

    let members = [MemberId(1), MemberId(2), MemberId(3)];
    let encounters = [EncounterId::from("p9s"), EncounterId::from("p9s_echo")];
    let cutoff = fight_start - Duration::seconds(60);

    let prior = store.prior_clears(&members, &encounters, cutoff).unwrap();
    assert_eq!(prior.len(), 1);
    assert_eq!(prior[0].member_id, MemberId(2));

    assert!(store.prior_clears(&[], &encounters, cutoff).unwrap().is_empty());
}

#[test]
fn test_unknown_encounter_rejects_whole_batch() {
    let mut store = seeded_store(3);
    let err = store
        .record_clears(&[clear(1, "p9s", t(1, 20), 1), clear(2, "unknown_enc", t(1, 20), 1)])
        .unwrap_err();

    assert!(err.is_invalid());
    assert!(err.to_string().contains("unknown_enc"));
    assert_eq!(store.clear_rate("P9S", false).unwrap().clears, 0);
}

#[test]
fn test_ingest_is_all_or_nothing() {
    let mut store = seeded_store(3);
    let roster = vec![Member::new(7, "Newcomer", 1)];

    assert!(store
        .ingest(&roster, &[clear(7, "p9s", t(1, 20), 1), clear(7, "p13s", t(1, 20), 2)])
        .is_err());
    assert_eq!(store.roster().unwrap().len(), 3);

    assert_eq!(store.ingest(&roster, &[clear(7, "p9s", t(1, 20), 1)]).unwrap(), 1);
    assert_eq!(store.roster().unwrap().len(), 1);
    assert_eq!(store.clear_rate("P9S", false).unwrap().to_string(), "1 / 1");

    // Empty roster keeps the snapshot
    assert_eq!(store.ingest(&[], &[clear(7, "p9s", t(1, 20), 1)]).unwrap(), 0);
    assert_eq!(store.roster().unwrap().len(), 1);
}

#[test]
fn test_cleared_and_uncleared_members() {
    let mut store = seeded_store(3);
    store
        .record_clears(&[clear(2, "p9s", t(1, 20), 1), clear(9, "p9s", t(1, 20), 1)])
        .unwrap();

    let cleared = store.cleared_members("P9S", false).unwrap();
    assert!(cleared.contains(&MemberId(2)));
    // Former members are left out, matching the clear rate
    assert!(!cleared.contains(&MemberId(9)));
    assert_eq!(cleared.len() as u64, store.clear_rate("P9S", false).unwrap().clears);

    let uncleared: Vec<u64> = store
        .uncleared_members("P9S", false)
        .unwrap()
        .iter()
        .map(|m| m.id.value())
        .collect();
    assert_eq!(uncleared.len(), 2);
    assert!(!uncleared.contains(&2));
}

#[test]
fn test_cleared_jobs() {
    let mut store = seeded_store(3);
    let mut on_sge = clear(1, "p9s", t(2, 20), 2);
    on_sge.job = Job("SGE".to_string());
    store
        .record_clears(&[clear(1, "p9s", t(1, 20), 1), on_sge, clear(9, "p9s", t(1, 20), 1)])
        .unwrap();

    let jobs = store.cleared_jobs(false).unwrap();
    assert_eq!(jobs["P9S"].len(), 2);
    assert!(jobs["P9S"].iter().all(|(member, _)| *member != MemberId(9)));
}

#[test]
fn test_roster_replace_and_lookup() {
    let mut store = seeded_store(3);
    store
        .replace_roster(&[Member::new(42, "Alpha Beta", 0)])
        .unwrap();

    let roster = store.roster().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(store.member_by_name("Alpha Beta").unwrap().unwrap().id, MemberId(42));
    assert!(store.member_by_name("Member 1").unwrap().is_none());
}

#[test]
fn test_ledger_versioned_writes() {
    let mut store = seeded_store(1);
    let mut record = LedgerRecord::new(MemberId(1), tier());
    let pe = PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap();
    record.commit(&pe);

    let v1 = store.put_ledger(&record).unwrap();
    assert_eq!(v1, 1);

    // A second writer that also started from "absent" loses
    let err = store.put_ledger(&record).unwrap_err();
    assert!(err.is_conflict());

    let mut loaded = store.get_ledger(MemberId(1), &tier()).unwrap().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.total_points, 10);
    assert!(loaded.is_consistent());

    let stale = loaded.clone();
    loaded.commit(&pe);
    assert_eq!(store.put_ledger(&loaded).unwrap(), 2);
    assert!(store.put_ledger(&stale).unwrap_err().is_conflict());
}

#[test]
fn test_leaderboard_order() {
    let mut store = seeded_store(3);
    for (member, count) in [(1u64, 1), (2, 3), (3, 3)] {
        let mut record = LedgerRecord::new(MemberId(member), tier());
        for _ in 0..count {
            record.commit(&PointsEvent::pending(MemberId(member), PointsCategory::Vet, "vet").unwrap());
        }
        store.put_ledger(&record).unwrap();
    }

    let board = store.leaderboard(&tier()).unwrap();
    let ids: Vec<u64> = board.iter().map(|e| e.member_id.value()).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert_eq!(board[0].total_points, 30);
    assert!(store.leaderboard(&TierId::parse("ULTIMATE").unwrap()).unwrap().is_empty());
}

fn submission(members: &[u64]) -> Submission {
    let events = members
        .iter()
        .map(|m| PointsEvent::pending(MemberId(*m), PointsCategory::FcPf, "FC PF").unwrap())
        .collect();
    Submission::new("tester", SubmissionChannel::Dev, tier(), events)
}

#[test]
fn test_submission_queue_lifecycle() {
    let mut store = seeded_store(2);
    let mut sub = submission(&[1, 2]);
    store.create_submission(&sub).unwrap();

    let queue = store.pending_submissions().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].submission_id, sub.id);
    assert!(store.create_submission(&sub).unwrap_err().is_conflict());

    // Partial review keeps it queued
    let mut ledger = LedgerRecord::new(MemberId(1), tier());
    ledger.commit(&sub.events[0]);
    sub.events[0].resolve(PointsEventStatus::Approved).unwrap();
    store.commit_review(&[ledger], &sub).unwrap();
    assert_eq!(store.pending_submissions().unwrap().len(), 1);

    sub.events[1].resolve(PointsEventStatus::Denied).unwrap();
    store.commit_review(&[], &sub).unwrap();
    assert!(store.pending_submissions().unwrap().is_empty());

    // Retained for audit
    let stored = store.get_submission(sub.id).unwrap().unwrap();
    assert_eq!(stored.events[1].status, PointsEventStatus::Denied);
}

#[test]
fn test_commit_review_rolls_back_on_conflict() {
    let mut store = seeded_store(2);
    let mut sub = submission(&[1, 2]);
    store.create_submission(&sub).unwrap();

    // Member 2 already has a ledger the reviewer did not see
    let mut existing = LedgerRecord::new(MemberId(2), tier());
    existing.commit(&PointsEvent::pending(MemberId(2), PointsCategory::Vet, "vet").unwrap());
    store.put_ledger(&existing).unwrap();

    let mut first = LedgerRecord::new(MemberId(1), tier());
    first.commit(&sub.events[0]);
    let mut stale = LedgerRecord::new(MemberId(2), tier());
    stale.commit(&sub.events[1]);
    for e in &mut sub.events {
        e.resolve(PointsEventStatus::Approved).unwrap();
    }

    let err = store.commit_review(&[first, stale], &sub).unwrap_err();
    assert!(err.is_conflict());

    // Nothing from the failed commit is visible
    assert!(store.get_ledger(MemberId(1), &tier()).unwrap().is_none());
    assert_eq!(store.get_ledger(MemberId(2), &tier()).unwrap().unwrap().total_points, 10);
    assert_eq!(store.pending_submissions().unwrap().len(), 1);
    let stored = store.get_submission(sub.id).unwrap().unwrap();
    assert!(stored.events.iter().all(|e| e.status == PointsEventStatus::Pending));
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raidledger.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store
            .register_encounters(&[Encounter::new("p9s", "P9S", 88).with_difficulty(101)])
            .unwrap();
        store.replace_roster(&[Member::new(1, "Solo", 0)]).unwrap();
        store.record_clears(&[clear(1, "p9s", t(1, 20), 1)]).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    let rate = store.clear_rate("P9S", false).unwrap();
    assert_eq!((rate.clears, rate.eligible_members), (1, 1));
}

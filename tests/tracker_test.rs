//! Record operations end to end against an in-memory store.

use chrono::Utc;
use telex_tracker::db::Db;
use telex_tracker::error::Error;
use telex_tracker::export::HEADER;
use telex_tracker::model::{Status, TelexId, TelexRecord, Track, Transition};
use telex_tracker::tracker::{AddOutcome, Tracker};

async fn test_tracker() -> Tracker {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    Tracker::new(db)
}

async fn add(tracker: &Tracker, number: &str) -> TelexId {
    match tracker.add(Some(number)).await.unwrap() {
        AddOutcome::Created(id) => id,
        AddOutcome::Skipped => panic!("telex {number:?} was skipped"),
    }
}

fn assert_status_invariant(record: &TelexRecord) {
    let both = record.assignee_widebody.as_deref().is_some_and(|s| !s.is_empty())
        && record.assignee_narrowbody.as_deref().is_some_and(|s| !s.is_empty());
    assert_eq!(record.status == Status::Done, both, "{record:?}");
    assert_eq!(record.completed_at.is_some(), both, "{record:?}");
}

#[tokio::test]
async fn empty_telex_number_is_skipped() {
    let tracker = test_tracker().await;
    assert_eq!(tracker.add(Some("")).await.unwrap(), AddOutcome::Skipped);
    assert_eq!(tracker.add(None).await.unwrap(), AddOutcome::Skipped);
    assert_eq!(tracker.list_all().await.unwrap().total(), 0);
}

#[tokio::test]
async fn new_telex_is_pending() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX/2024/001").await;
    let rec = tracker.get(id).await.unwrap();
    assert_eq!(rec.status, Status::Pending);
    assert!(rec.completed_at.is_none());
}

#[tokio::test]
async fn widebody_only_stays_pending() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;

    let assigned = tracker.assign_track(id, Track::Widebody, "budi").await.unwrap();
    assert!(assigned.transition.is_none());
    let rec = assigned.record;
    assert_eq!(rec.status, Status::Pending);
    assert!(rec.completed_at.is_none());
    assert_status_invariant(&rec);
}

#[tokio::test]
async fn both_tracks_complete_the_telex() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;

    tracker.assign_track(id, Track::Widebody, "budi").await.unwrap();
    tracker.assign_track(id, Track::Narrowbody, "sari").await.unwrap();

    let rec = tracker.get(id).await.unwrap();
    assert_eq!(rec.status, Status::Done);
    let completed = rec.completed_at.expect("completed_at set");
    assert!(completed <= Utc::now());
    assert!(completed >= rec.created_at);
    assert_status_invariant(&rec);
}

#[tokio::test]
async fn transitions_fire_only_when_status_changes() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;

    let steps = [
        (Track::Widebody, "budi", None),
        (Track::Narrowbody, "sari", Some(Transition::Completed)),
        (Track::Narrowbody, "dewi", None),
        (Track::Widebody, "", Some(Transition::Reopened)),
        (Track::Widebody, "", None),
        (Track::Widebody, "budi", Some(Transition::Completed)),
    ];
    for (track, name, expected) in steps {
        let assigned = tracker.assign_track(id, track, name).await.unwrap();
        assert_eq!(assigned.transition, expected, "{track} = {name:?}");
        assert_status_invariant(&assigned.record);
    }
}

#[tokio::test]
async fn clearing_a_track_reopens_the_telex() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;
    tracker.assign_track(id, Track::Widebody, "budi").await.unwrap();
    tracker.assign_track(id, Track::Narrowbody, "sari").await.unwrap();

    let reopened = tracker.assign_track(id, Track::Narrowbody, "").await.unwrap();
    assert_eq!(reopened.transition, Some(Transition::Reopened));
    let rec = reopened.record;
    assert_eq!(rec.status, Status::Pending);
    assert!(rec.completed_at.is_none());
    assert_eq!(tracker.get(id).await.unwrap(), rec);
    assert_status_invariant(&rec);
}

#[tokio::test]
async fn assign_by_kind_rejects_unknown_track_without_writing() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;
    tracker.assign_track(id, Track::Widebody, "budi").await.unwrap();
    let before = tracker.get(id).await.unwrap();

    let err = tracker
        .assign_track_by_kind(id, "freighter", "sari")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTrackKind(ref k) if k == "freighter"));
    assert_eq!(tracker.get(id).await.unwrap(), before);

    let assigned = tracker
        .assign_track_by_kind(id, "narrowbody", "sari")
        .await
        .unwrap();
    assert_eq!(assigned.record.status, Status::Done);
}

#[tokio::test]
async fn missing_id_wins_over_bad_track() {
    let tracker = test_tracker().await;
    let err = tracker
        .assign_track_by_kind(TelexId(404), "freighter", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(404)));
    assert!(matches!(
        tracker.assign_track(TelexId(404), Track::Widebody, "x").await,
        Err(Error::NotFound(404))
    ));
}

#[tokio::test]
async fn remark_is_overwritten_as_is() {
    let tracker = test_tracker().await;
    let id = add(&tracker, "TLX").await;

    let rec = tracker.set_remark(id, Some("tunggu dokumen")).await.unwrap();
    assert_eq!(rec.remark.as_deref(), Some("tunggu dokumen"));

    let rec = tracker.set_remark(id, Some("")).await.unwrap();
    assert_eq!(rec.remark.as_deref(), Some(""));
    assert_eq!(tracker.get(id).await.unwrap().remark.as_deref(), Some(""));

    // Remarks never touch status.
    assert_eq!(rec.status, Status::Pending);

    assert!(matches!(
        tracker.set_remark(TelexId(77), Some("x")).await,
        Err(Error::NotFound(77))
    ));
}

#[tokio::test]
async fn counters_match_records() {
    let tracker = test_tracker().await;
    let a = add(&tracker, "A").await;
    let b = add(&tracker, "B").await;
    add(&tracker, "C").await;
    for id in [a, b] {
        tracker.assign_track(id, Track::Widebody, "w").await.unwrap();
        tracker.assign_track(id, Track::Narrowbody, "n").await.unwrap();
    }

    let listing = tracker.list_all().await.unwrap();
    assert_eq!(listing.done, 2);
    assert_eq!(listing.pending, 1);
    assert_eq!(listing.pending + listing.done, listing.total());
    for rec in &listing.records {
        assert_status_invariant(rec);
    }
}

#[tokio::test]
async fn delete_removes_from_listing_and_export() {
    let tracker = test_tracker().await;
    let keep = add(&tracker, "KEEP-ME").await;
    let gone = add(&tracker, "DELETE-ME").await;

    tracker.delete(gone).await.unwrap();
    assert!(matches!(tracker.delete(gone).await, Err(Error::NotFound(_))));

    let listing = tracker.list_all().await.unwrap();
    assert_eq!(listing.total(), 1);
    assert_eq!(listing.records[0].id, keep);

    let export = tracker.export_csv(Utc::now()).await.unwrap();
    assert!(!export.body.contains("DELETE-ME"));
    assert!(export.body.contains("KEEP-ME"));
}

#[tokio::test]
async fn export_matches_listing() {
    let tracker = test_tracker().await;
    add(&tracker, "FIRST").await;
    add(&tracker, "SECOND\r\nWITH BREAK").await;
    let third = add(&tracker, "THIRD").await;
    tracker.assign_track(third, Track::Widebody, "budi").await.unwrap();

    let listing = tracker.list_all().await.unwrap();
    let export = tracker.export_csv(Utc::now()).await.unwrap();
    let lines: Vec<&str> = export.body.lines().collect();

    assert_eq!(lines[0], HEADER.join(";"));
    assert_eq!(lines.len() - 1, listing.total());

    // Same order as the listing, keyed by the leading id column.
    let exported_ids: Vec<String> = lines[1..]
        .iter()
        .map(|l| l.split(';').next().unwrap().to_string())
        .collect();
    let listed_ids: Vec<String> = listing.records.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(exported_ids, listed_ids);

    assert!(lines.iter().any(|l| l.contains(";SECOND WITH BREAK;")));
    assert!(export.filename.starts_with("data_telex_"));
    assert!(export.filename.ends_with(".csv"));
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use meetgrid_core::claim::{ClaimRequest, SlotClaimEngine};
use meetgrid_core::errors::{MeetgridError, MeetgridResult};
use meetgrid_core::grid::AvailabilityGrid;
use meetgrid_core::memory::{InMemoryStore, StaticProvisioner};
use meetgrid_core::models::event::Event;
use meetgrid_core::ports::{GridStore, MeetingProvisioner, StoredGrid};
use mockall::mock;
use pretty_assertions::assert_eq;
use uuid::Uuid;

mock! {
    Provisioner {}

    #[async_trait]
    impl MeetingProvisioner for Provisioner {
        async fn provision(
            &self,
            topic: &str,
            start: DateTime<Utc>,
            duration_minutes: u32,
        ) -> MeetgridResult<String>;
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
}

fn make_engine(store: &InMemoryStore, provisioner: Arc<dyn MeetingProvisioner>) -> SlotClaimEngine {
    let store = Arc::new(store.clone());
    SlotClaimEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        provisioner,
    )
}

/// Delegates reads to the in-memory store but fails every conditional write,
/// either as a lost race or as an infrastructure fault.
struct SaveFailingGrids {
    inner: Arc<InMemoryStore>,
    lost_race: bool,
}

#[async_trait]
impl GridStore for SaveFailingGrids {
    async fn load_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
    ) -> MeetgridResult<Option<StoredGrid>> {
        self.inner.load_grid(event_id, participant_email).await
    }

    async fn save_grid(
        &self,
        _event_id: Uuid,
        participant_email: &str,
        _grid: &AvailabilityGrid,
        _expected_prior: &str,
    ) -> MeetgridResult<()> {
        if self.lost_race {
            Err(MeetgridError::Conflict(format!(
                "availability of {participant_email} changed since read"
            )))
        } else {
            Err(MeetgridError::Internal(Box::new(std::io::Error::other(
                "connection reset",
            ))))
        }
    }
}

fn engine_with_grids(
    store: &InMemoryStore,
    grids: Arc<dyn GridStore>,
    provisioner: Arc<dyn MeetingProvisioner>,
) -> SlotClaimEngine {
    let store = Arc::new(store.clone());
    SlotClaimEngine::new(store.clone(), grids, store.clone(), store, provisioner)
}

fn request(event: &Event, interviewer: &str, claimant: &str) -> ClaimRequest {
    ClaimRequest {
        event_id: event.id,
        day_idx: 0,
        timeslot_idx: 10,
        claimant_name: "Bob".to_string(),
        claimant_email: claimant.to_string(),
        interviewer_email: interviewer.to_string(),
    }
}

fn stored_cell(store: &InMemoryStore, event: &Event, email: &str) -> Vec<String> {
    let blob = store.grid_blob(event.id, email).expect("grid exists");
    let grid =
        AvailabilityGrid::deserialize(&blob, event.days().expect("valid range")).expect("valid blob");
    grid.get(0, 10).expect("in bounds").iter().cloned().collect()
}

#[tokio::test]
async fn test_claim_confirms_and_marks_grid() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let record = engine
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("claim succeeds");

    assert_eq!(record.event_id, event.id);
    assert_eq!(record.day_idx, 0);
    assert_eq!(record.timeslot_idx, 10);
    assert_eq!(record.participant_email, "bob@x.com");
    assert_eq!(record.interviewer_email, "a@x.com");
    assert_eq!(record.meeting_link, "https://meet/abc");
    assert_eq!(stored_cell(&store, &event, "a@x.com"), vec!["bob@x.com"]);
}

#[tokio::test]
async fn test_repeat_claim_observes_slot_not_free() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    engine
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("first claim succeeds");
    let second = engine.claim(request(&event, "a@x.com", "carol@x.com")).await;

    assert!(matches!(second, Err(MeetgridError::SlotNotFree { .. })));
    // The cell still holds exactly the first claimant.
    assert_eq!(stored_cell(&store, &event, "a@x.com"), vec!["bob@x.com"]);
}

#[tokio::test]
async fn test_self_booking_is_rejected_without_mutation() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");

    let mut provisioner = MockProvisioner::new();
    provisioner.expect_provision().times(0);
    let engine = make_engine(&store, Arc::new(provisioner));

    let before = store.grid_blob(event.id, "a@x.com").expect("grid exists");
    let result = engine.claim(request(&event, "a@x.com", "a@x.com")).await;

    assert!(matches!(result, Err(MeetgridError::SelfBooking(_))));
    assert_eq!(store.grid_blob(event.id, "a@x.com").expect("grid exists"), before);
}

#[tokio::test]
async fn test_unknown_event_is_rejected() {
    let store = InMemoryStore::new();
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let result = engine
        .claim(ClaimRequest {
            event_id: Uuid::new_v4(),
            day_idx: 0,
            timeslot_idx: 0,
            claimant_name: "Bob".to_string(),
            claimant_email: "bob@x.com".to_string(),
            interviewer_email: "a@x.com".to_string(),
        })
        .await;

    assert!(matches!(result, Err(MeetgridError::EventNotFound(_))));
}

#[tokio::test]
async fn test_unknown_interviewer_is_rejected() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let result = engine.claim(request(&event, "ghost@x.com", "bob@x.com")).await;

    assert!(matches!(result, Err(MeetgridError::ParticipantNotFound(_))));
}

#[tokio::test]
async fn test_out_of_bounds_slot_is_rejected() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let mut req = request(&event, "a@x.com", "bob@x.com");
    req.day_idx = 1;
    let result = engine.claim(req).await;

    assert!(matches!(result, Err(MeetgridError::OutOfBounds { .. })));
}

#[tokio::test]
async fn test_provisioning_failure_leaves_no_state() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::failing()));

    let before = store.grid_blob(event.id, "a@x.com").expect("grid exists");
    let result = engine.claim(request(&event, "a@x.com", "bob@x.com")).await;

    assert!(matches!(result, Err(MeetgridError::Provisioning(_))));
    assert_eq!(store.grid_blob(event.id, "a@x.com").expect("grid exists"), before);
    // Retrying from scratch is safe: the slot is still claimable.
    let retry = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));
    retry
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("retry succeeds");
}

#[tokio::test]
async fn test_provisioner_receives_computed_slot_start() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(2), date(3));
    store.add_participant(&event, "a@x.com").expect("seed");

    let mut provisioner = MockProvisioner::new();
    provisioner
        .expect_provision()
        .withf(|topic, start, duration| {
            let expected = Utc.with_ymd_and_hms(2025, 6, 3, 2, 30, 0).single().expect("valid");
            topic == "Interviews" && *start == expected && *duration == 30
        })
        .times(1)
        .returning(|_, _, _| Ok("https://meet/xyz".to_string()));
    let engine = make_engine(&store, Arc::new(provisioner));

    // Day 1 of a June 2-3 event, interval 10: June 3rd, 02:30 UTC.
    let mut req = request(&event, "a@x.com", "bob@x.com");
    req.day_idx = 1;
    let record = engine.claim(req).await.expect("claim succeeds");

    assert_eq!(record.meeting_link, "https://meet/xyz");
}

#[tokio::test]
async fn test_duration_is_clamped_to_policy() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");

    let mut provisioner = MockProvisioner::new();
    provisioner
        .expect_provision()
        .withf(|_, _, duration| *duration == 15)
        .times(1)
        .returning(|_, _, _| Ok("https://meet/short".to_string()));
    let engine = make_engine(&store, Arc::new(provisioner)).with_duration(5);

    engine
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("claim succeeds");
}

#[tokio::test]
async fn test_concurrent_claims_have_exactly_one_winner() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let (first, second) = tokio::join!(
        engine.claim(request(&event, "a@x.com", "bob@x.com")),
        engine.claim(request(&event, "a@x.com", "carol@x.com")),
    );

    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(matches!(err, MeetgridError::SlotNotFree { .. }));
        }
    }

    // The cell holds exactly the winning claimant, never both.
    let winner = outcomes
        .iter()
        .find_map(|r| r.as_ref().ok())
        .expect("one winner");
    assert_eq!(
        stored_cell(&store, &event, "a@x.com"),
        vec![winner.participant_email.clone()]
    );
}

#[tokio::test]
async fn test_cancel_frees_cell_and_deletes_record() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let record = engine
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("claim succeeds");
    engine.cancel(record.id).await.expect("cancel succeeds");

    assert!(stored_cell(&store, &event, "a@x.com").is_empty());
    // The slot is claimable again.
    engine
        .claim(request(&event, "a@x.com", "carol@x.com"))
        .await
        .expect("reclaim succeeds");
}

#[test_log::test(tokio::test)]
async fn test_commit_failure_after_provisioning_reports_orphaned_link() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let grids = Arc::new(SaveFailingGrids {
        inner: Arc::new(store.clone()),
        lost_race: false,
    });
    let engine = engine_with_grids(&store, grids, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let result = engine.claim(request(&event, "a@x.com", "bob@x.com")).await;

    // The provisioned link is carried out so it can be reconciled.
    match result {
        Err(MeetgridError::PartialCommit { meeting_link }) => {
            assert_eq!(meeting_link, "https://meet/abc");
        }
        other => panic!("expected PartialCommit, got {other:?}"),
    }
    assert!(stored_cell(&store, &event, "a@x.com").is_empty());
}

#[test_log::test(tokio::test)]
async fn test_cancel_keeps_booking_when_grid_write_loses_race() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let record = engine
        .claim(request(&event, "a@x.com", "bob@x.com"))
        .await
        .expect("claim succeeds");

    let grids = Arc::new(SaveFailingGrids {
        inner: Arc::new(store.clone()),
        lost_race: true,
    });
    let racing = engine_with_grids(&store, grids, Arc::new(StaticProvisioner::new("https://meet/abc")));
    let failed = racing.cancel(record.id).await;

    // The cell stays occupied and the record survives the failed attempt.
    assert!(matches!(failed, Err(MeetgridError::Conflict(_))));
    assert_eq!(stored_cell(&store, &event, "a@x.com"), vec!["bob@x.com"]);

    // Retrying against a healthy store completes the cancellation.
    engine.cancel(record.id).await.expect("retry succeeds");
    assert!(stored_cell(&store, &event, "a@x.com").is_empty());
}

#[tokio::test]
async fn test_mixed_case_emails_resolve_stored_identities() {
    let store = InMemoryStore::new();
    let event = store.add_event("Interviews", date(1), date(1));
    store.add_participant(&event, "a@x.com").expect("seed");
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let mut req = request(&event, " A@X.com ", "Bob@X.com");
    req.claimant_email = " Bob@X.com ".to_string();
    let record = engine.claim(req).await.expect("claim succeeds");

    assert_eq!(record.interviewer_email, "a@x.com");
    assert_eq!(record.participant_email, "bob@x.com");
    assert_eq!(stored_cell(&store, &event, "a@x.com"), vec!["bob@x.com"]);
}

#[tokio::test]
async fn test_cancel_unknown_booking_is_rejected() {
    let store = InMemoryStore::new();
    let engine = make_engine(&store, Arc::new(StaticProvisioner::new("https://meet/abc")));

    let result = engine.cancel(Uuid::new_v4()).await;

    assert!(matches!(result, Err(MeetgridError::BookingNotFound(_))));
}

use chrono::{NaiveDate, TimeZone, Utc};
use meetgrid_core::booking::ClaimContext;
use meetgrid_core::errors::MeetgridError;
use meetgrid_core::models::event::Event;
use meetgrid_core::models::registrant::{BookingRecord, BookingResponse};
use pretty_assertions::assert_eq;
use serde_json::{from_str, to_string};
use uuid::Uuid;

fn event(start: (u32, u32), end: (u32, u32)) -> Event {
    Event {
        id: Uuid::new_v4(),
        name: "Interviews".to_string(),
        code: "AB12CD".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, start.0, start.1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2025, end.0, end.1).expect("valid date"),
        created_at: Utc::now(),
    }
}

fn context() -> ClaimContext {
    ClaimContext {
        event_id: Uuid::new_v4(),
        day_idx: 0,
        timeslot_idx: 10,
        claimant_name: "Bob".to_string(),
        claimant_email: "bob@x.com".to_string(),
        interviewer_email: "a@x.com".to_string(),
    }
}

#[test]
fn test_event_serialization_round_trip() {
    let event = event((6, 1), (6, 3));

    let json = to_string(&event).expect("serializes");
    let restored: Event = from_str(&json).expect("deserializes");

    assert_eq!(restored.id, event.id);
    assert_eq!(restored.code, event.code);
    assert_eq!(restored.start_date, event.start_date);
    assert_eq!(restored.end_date, event.end_date);
}

#[test]
fn test_event_day_count() {
    assert_eq!(event((6, 1), (6, 1)).days().expect("valid"), 1);
    assert_eq!(event((6, 1), (6, 7)).days().expect("valid"), 7);
}

#[test]
fn test_slot_start_offsets_into_the_range() {
    let event = event((6, 1), (6, 3));

    let start = event.slot_start(2, 4).expect("in bounds");

    // Day 2 is June 3rd; interval 4 is 01:00.
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 3, 1, 0, 0).single().expect("valid"));
}

#[test]
fn test_slot_start_rejects_out_of_range_day() {
    let event = event((6, 1), (6, 1));

    let result = event.slot_start(1, 0);

    assert!(matches!(result, Err(MeetgridError::OutOfBounds { .. })));
}

#[test]
fn test_assemble_populates_every_field() {
    let ctx = context();

    let record = ctx
        .assemble("https://meet/abc".to_string())
        .expect("complete context");

    assert_eq!(record.event_id, ctx.event_id);
    assert_eq!(record.day_idx, 0);
    assert_eq!(record.timeslot_idx, 10);
    assert_eq!(record.participant_name, "Bob");
    assert_eq!(record.participant_email, "bob@x.com");
    assert_eq!(record.interviewer_email, "a@x.com");
    assert_eq!(record.meeting_link, "https://meet/abc");
}

#[test]
fn test_assemble_rejects_missing_fields() {
    let mut ctx = context();
    ctx.claimant_name = "  ".to_string();
    assert!(matches!(
        ctx.assemble("https://meet/abc".to_string()),
        Err(MeetgridError::IncompleteClaim(_))
    ));

    let ctx = context();
    assert!(matches!(
        ctx.assemble(String::new()),
        Err(MeetgridError::IncompleteClaim(_))
    ));
}

#[test]
fn test_booking_record_serialization_round_trip() {
    let record = context()
        .assemble("https://meet/abc".to_string())
        .expect("complete context");

    let json = to_string(&record).expect("serializes");
    let restored: BookingRecord = from_str(&json).expect("deserializes");

    assert_eq!(restored, record);
}

#[test]
fn test_booking_response_carries_record_fields() {
    let record = context()
        .assemble("https://meet/abc".to_string())
        .expect("complete context");

    let response = BookingResponse::from(record.clone());

    assert_eq!(response.id, record.id);
    assert_eq!(response.meeting_link, record.meeting_link);
    assert_eq!(response.interviewer_email, record.interviewer_email);
}

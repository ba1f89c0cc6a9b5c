use axum::http::StatusCode;
use axum::response::IntoResponse;
use meetgrid_api::middleware::error_handling::AppError;
use meetgrid_core::errors::MeetgridError;
use rstest::rstest;

fn status_of(error: MeetgridError) -> StatusCode {
    AppError(error).into_response().status()
}

#[rstest]
#[case(MeetgridError::EventNotFound("abc".to_string()), StatusCode::NOT_FOUND)]
#[case(MeetgridError::ParticipantNotFound("a@x.com".to_string()), StatusCode::NOT_FOUND)]
#[case(MeetgridError::BookingNotFound("abc".to_string()), StatusCode::NOT_FOUND)]
#[case(MeetgridError::Validation("bad input".to_string()), StatusCode::BAD_REQUEST)]
#[case(MeetgridError::CorruptGrid("bad blob".to_string()), StatusCode::BAD_REQUEST)]
#[case(MeetgridError::IncompleteClaim("meeting link".to_string()), StatusCode::BAD_REQUEST)]
#[case(MeetgridError::SelfBooking("a@x.com".to_string()), StatusCode::FORBIDDEN)]
#[case(MeetgridError::Provisioning("provider down".to_string()), StatusCode::BAD_GATEWAY)]
fn test_error_status_mapping(#[case] error: MeetgridError, #[case] expected: StatusCode) {
    assert_eq!(status_of(error), expected);
}

#[test]
fn test_invalid_range_maps_to_bad_request() {
    let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date");
    let end = chrono::NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date");

    assert_eq!(
        status_of(MeetgridError::InvalidRange { start, end }),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_lost_race_errors_map_to_conflict() {
    assert_eq!(
        status_of(MeetgridError::SlotNotFree {
            day_idx: 0,
            timeslot_idx: 10
        }),
        StatusCode::CONFLICT
    );
    assert_eq!(
        status_of(MeetgridError::Conflict("grid changed".to_string())),
        StatusCode::CONFLICT
    );
    assert_eq!(
        status_of(MeetgridError::DuplicateKey("booking key".to_string())),
        StatusCode::CONFLICT
    );
}

#[test]
fn test_partial_commit_is_a_server_error() {
    // A partial failure means an orphaned external meeting; it must not be
    // reported as a client mistake.
    assert_eq!(
        status_of(MeetgridError::PartialCommit {
            meeting_link: "https://meet/abc".to_string()
        }),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_database_error_is_a_server_error() {
    assert_eq!(
        status_of(MeetgridError::Database(eyre::eyre!("connection refused"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

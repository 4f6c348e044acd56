// Exercises the Supabase-backed repository against a mock REST endpoint.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::models::{Booking, BookingAttendee, BookingError, BookingStatus};
use booking_cell::repository::{BookingRepository, SupabaseBookingRepository};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

fn repository(server: &MockServer) -> SupabaseBookingRepository {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        chat_base_url: String::new(),
        chat_bot_token: String::new(),
        reconcile_interval_secs: 300,
    };
    SupabaseBookingRepository::new(Arc::new(SupabaseClient::new(&config)))
}

fn booking_row(id: Uuid, room_id: Uuid, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "room_id": room_id,
        "member_id": Uuid::new_v4(),
        "date": "2026-08-10",
        "start_time": "10:00",
        "end_time": "11:00",
        "reason": "retro",
        "cancel_reason": null,
        "status": status,
        "created_at": "2026-08-01T09:00:00Z",
        "updated_at": "2026-08-01T09:00:00Z"
    })
}

#[tokio::test]
async fn find_sends_filters_and_parses_rows() {
    let server = MockServer::start().await;
    let room_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("room_id", format!("eq.{}", room_id)))
        .and(query_param("date", "eq.2026-08-10"))
        .and(query_param("status", "eq.active"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([booking_row(
                booking_id, room_id, "active"
            )])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let found = repository(&server)
        .find(
            room_id,
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            BookingStatus::Active,
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, booking_id);
    assert_eq!(found[0].status, BookingStatus::Active);
    assert_eq!(found[0].time_range(), "10:00-11:00");
    assert!(found[0].attendees.is_empty());
}

#[tokio::test]
async fn find_by_id_attaches_attendees() {
    let server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking_row(
            booking_id,
            Uuid::new_v4(),
            "active"
        )])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/booking_users"))
        .and(query_param("booking_id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "booking_id": booking_id,
            "user_id": 42,
            "nickname": "kim",
            "created_at": "2026-08-01T09:00:00Z"
        }])))
        .mount(&server)
        .await;

    let booking = repository(&server)
        .find_by_id(booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.attendees.len(), 1);
    assert_eq!(booking.attendees[0].user_id, 42);
    assert_eq!(booking.attendees[0].nickname, "kim");
}

#[tokio::test]
async fn find_by_id_returns_none_on_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let booking = repository(&server).find_by_id(Uuid::new_v4()).await.unwrap();
    assert!(booking.is_none());
}

#[tokio::test]
async fn insert_posts_row_and_requires_representation() {
    let server = MockServer::start().await;
    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        member_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        start_time: "10:00".to_string(),
        end_time: "11:00".to_string(),
        reason: "retro".to_string(),
        cancel_reason: None,
        status: BookingStatus::Active,
        created_at: now,
        updated_at: now,
        attendees: Vec::new(),
    };

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "id": booking.id,
            "start_time": "10:00",
            "end_time": "11:00",
            "status": "active"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([booking_row(booking.id, booking.room_id, "active")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    repository(&server).insert(&booking).await.unwrap();
}

#[tokio::test]
async fn insert_without_returned_rows_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        member_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        start_time: "10:00".to_string(),
        end_time: "11:00".to_string(),
        reason: "retro".to_string(),
        cancel_reason: None,
        status: BookingStatus::Active,
        created_at: now,
        updated_at: now,
        attendees: Vec::new(),
    };

    let result = repository(&server).insert(&booking).await;
    assert!(matches!(result, Err(BookingError::Repository(_))));
}

#[tokio::test]
async fn save_patches_status_and_cancel_reason() {
    let server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .and(body_partial_json(json!({
            "status": "cancelled",
            "cancel_reason": "room flooded"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc::now();
    let booking = Booking {
        id: booking_id,
        room_id: Uuid::new_v4(),
        member_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        start_time: "10:00".to_string(),
        end_time: "11:00".to_string(),
        reason: "retro".to_string(),
        cancel_reason: Some("room flooded".to_string()),
        status: BookingStatus::Cancelled,
        created_at: now,
        updated_at: now,
        attendees: Vec::new(),
    };

    repository(&server).save(&booking).await.unwrap();
}

#[tokio::test]
async fn insert_attendee_posts_to_booking_users() {
    let server = MockServer::start().await;
    let attendee = BookingAttendee {
        id: Uuid::new_v4(),
        booking_id: Uuid::new_v4(),
        user_id: 7,
        nickname: "sam".to_string(),
        created_at: Utc::now(),
    };

    Mock::given(method("POST"))
        .and(path("/rest/v1/booking_users"))
        .and(body_partial_json(json!({
            "user_id": 7,
            "nickname": "sam"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": attendee.id,
            "booking_id": attendee.booking_id,
            "user_id": 7,
            "nickname": "sam",
            "created_at": attendee.created_at
        }])))
        .expect(1)
        .mount(&server)
        .await;

    repository(&server).insert_attendee(&attendee).await.unwrap();
}

#[tokio::test]
async fn room_admin_lookup_collects_chat_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(query_param("is_room_admin", "eq.true"))
        .and(query_param("select", "chat_user_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "chat_user_id": 11 },
            { "chat_user_id": 12 }
        ])))
        .mount(&server)
        .await;

    let ids = repository(&server).room_admin_chat_ids().await.unwrap();
    assert_eq!(ids, vec![11, 12]);
}

#[tokio::test]
async fn upstream_failure_surfaces_as_repository_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database on fire"))
        .mount(&server)
        .await;

    let result = repository(&server).find_by_status(BookingStatus::Active).await;
    assert!(matches!(result, Err(BookingError::Repository(_))));
}

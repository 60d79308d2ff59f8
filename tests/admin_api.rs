mod common;

use axum::http::StatusCode;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

use bus_ticket_backend::entities::{bus, route, schedule};
use bus_ticket_backend::utils::jwt::create_token;
use common::{
    admin, app, customer, request, sample_bus, sample_route, sample_schedule, token_for,
};

// ============ Access-control gate ============

#[tokio::test]
async fn test_admin_endpoint_requires_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, _) = request(app(db), "GET", "/api/admin/bus", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_endpoint_rejects_customer_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let token = token_for(&customer(Uuid::new_v4()));

    let (status, _) = request(app(db), "GET", "/api/admin/bus", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_endpoint_rejects_tampered_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    // Signed with a different secret than the server verifies with
    let token = create_token(&admin(Uuid::new_v4()), "some-other-secret", 168).unwrap();

    let (status, _) = request(app(db), "GET", "/api/admin/bus", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let token = create_token(&admin(Uuid::new_v4()), common::JWT_SECRET, -1).unwrap();

    let (status, _) = request(app(db), "GET", "/api/admin/bus", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============ Bus / Route CRUD ============

#[tokio::test]
async fn test_add_bus_created() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_bus(1, 40)]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "POST",
        "/api/admin/bus",
        Some(&token),
        Some(json!({ "reg_number": "B-0001-XY", "capacity": 40, "bus_type": "AC Sleeper" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 40);
}

#[tokio::test]
async fn test_add_bus_missing_fields_is_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, _) = request(
        app(db),
        "POST",
        "/api/admin/bus",
        Some(&token),
        Some(json!({ "reg_number": "", "capacity": 40, "bus_type": "AC Sleeper" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_route_created() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_route(1)]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "POST",
        "/api/admin/route",
        Some(&token),
        Some(json!({ "source": "Jakarta", "destination": "Surabaya" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["source"], "Jakarta");
}

// ============ Schedule CRUD ============

#[tokio::test]
async fn test_add_schedule_unknown_bus_is_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<bus::Model>::new()])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "POST",
        "/api/admin/schedule",
        Some(&token),
        Some(json!({
            "bus_id": 99,
            "route_id": 1,
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20T18:00",
            "fare": 150.0,
            "available_seats": 40
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid bus");
}

#[tokio::test]
async fn test_add_schedule_seats_beyond_capacity_is_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_bus(1, 30)]])
        .append_query_results([vec![sample_route(1)]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "POST",
        "/api/admin/schedule",
        Some(&token),
        Some(json!({
            "bus_id": 1,
            "route_id": 1,
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20T18:00",
            "fare": 150.0,
            "available_seats": 31
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Available seats cannot exceed bus capacity");
}

#[tokio::test]
async fn test_add_schedule_accepts_picker_timestamps() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_bus(1, 40)]])
        .append_query_results([vec![sample_route(1)]])
        .append_query_results([vec![sample_schedule(1, 1, 1, 40)]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "POST",
        "/api/admin/schedule",
        Some(&token),
        Some(json!({
            "bus_id": 1,
            "route_id": 1,
            // Date-picker format with the embedded 'T'
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20 18:00:00",
            "fare": 150.0,
            "available_seats": 40
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["available_seats"], 40);
}

#[tokio::test]
async fn test_update_schedule_missing_field_is_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "PUT",
        "/api/admin/schedule/1",
        Some(&token),
        Some(json!({
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20T18:00",
            "available_seats": 40
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required to update");
}

#[tokio::test]
async fn test_update_schedule_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<schedule::Model>::new()])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, _) = request(
        app(db),
        "PUT",
        "/api/admin/schedule/99",
        Some(&token),
        Some(json!({
            "fare": 175.0,
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20T18:00",
            "available_seats": 40
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_schedule_success() {
    let before = sample_schedule(1, 1, 1, 40);
    let mut after = before.clone();
    after.fare = 175.0;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![before]])
        .append_query_results([vec![sample_bus(1, 40)]])
        .append_query_results([vec![after]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(
        app(db),
        "PUT",
        "/api/admin/schedule/1",
        Some(&token),
        Some(json!({
            "fare": 175.0,
            "departure_time": "2026-08-20T09:30",
            "arrival_time": "2026-08-20T18:00",
            "available_seats": 40
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fare"], 175.0);
}

#[tokio::test]
async fn test_list_schedules_joined_with_bus_and_route() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_schedule(1, 1, 1, 40)]])
        .append_query_results([vec![sample_bus(1, 40)]])
        .append_query_results([vec![sample_route(1)]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(app(db), "GET", "/api/admin/schedule", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["reg_number"], "B-0001-XY");
    assert_eq!(items[0]["source"], "Jakarta");
}

// ============ Cascade deletes ============

#[tokio::test]
async fn test_delete_schedule_not_found_after_rollback() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            // No bookings referenced the schedule
            MockExecResult { last_insert_id: 0, rows_affected: 0 },
            // And the schedule itself did not exist
            MockExecResult { last_insert_id: 0, rows_affected: 0 },
        ])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, _) = request(app(db), "DELETE", "/api/admin/schedule/99", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_schedule_removes_bookings() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult { last_insert_id: 0, rows_affected: 3 },
            MockExecResult { last_insert_id: 0, rows_affected: 1 },
        ])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(app(db), "DELETE", "/api/admin/schedule/1", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Schedule and all associated bookings deleted");
}

#[tokio::test]
async fn test_delete_bus_cascades_schedules_and_bookings() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            sample_schedule(1, 7, 1, 40),
            sample_schedule(2, 7, 1, 40),
        ]])
        .append_exec_results([
            // Bookings of both schedules
            MockExecResult { last_insert_id: 0, rows_affected: 2 },
            // The two schedules
            MockExecResult { last_insert_id: 0, rows_affected: 2 },
            // The bus itself
            MockExecResult { last_insert_id: 0, rows_affected: 1 },
        ])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(app(db), "DELETE", "/api/admin/bus/7", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bus and all related schedules/bookings deleted");
}

#[tokio::test]
async fn test_delete_bus_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<schedule::Model>::new()])
        .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, _) = request(app(db), "DELETE", "/api/admin/bus/99", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_route_cascades_schedules_and_bookings() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_schedule(1, 1, 3, 40)]])
        .append_exec_results([
            MockExecResult { last_insert_id: 0, rows_affected: 1 },
            MockExecResult { last_insert_id: 0, rows_affected: 1 },
            MockExecResult { last_insert_id: 0, rows_affected: 1 },
        ])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(app(db), "DELETE", "/api/admin/route/3", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Route and all related schedules/bookings deleted");
}

#[tokio::test]
async fn test_delete_route_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<schedule::Model>::new()])
        .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, _) = request(app(db), "DELETE", "/api/admin/route/99", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_routes_visible_to_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![route::Model {
            id: 2,
            source: "Bandung".to_string(),
            destination: "Semarang".to_string(),
        }]])
        .into_connection();
    let token = token_for(&admin(Uuid::new_v4()));

    let (status, body) = request(app(db), "GET", "/api/admin/route", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["destination"], "Semarang");
}

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tower::ServiceExt;
use uuid::Uuid;

use bus_ticket_backend::entities::booking::{self, BookingStatus};
use bus_ticket_backend::entities::user::{self, UserRole};
use bus_ticket_backend::entities::{bus, passenger, route, schedule};
use bus_ticket_backend::routes::create_router;
use bus_ticket_backend::utils::jwt::create_token;
use bus_ticket_backend::{AppState, Config};

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 168,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
    }
}

pub fn app(db: DatabaseConnection) -> Router {
    create_router(AppState {
        db: std::sync::Arc::new(db),
        config: test_config(),
    })
}

pub fn customer(id: Uuid) -> user::Model {
    user::Model {
        id,
        email: "rina@example.com".to_string(),
        password_hash: "unused".to_string(),
        name: "Rina".to_string(),
        phone: "081234567890".to_string(),
        role: UserRole::Customer,
        created_at: Utc::now().into(),
    }
}

pub fn admin(id: Uuid) -> user::Model {
    user::Model {
        id,
        email: "admin@busticket.com".to_string(),
        password_hash: "unused".to_string(),
        name: "Admin".to_string(),
        phone: "0000000000".to_string(),
        role: UserRole::Admin,
        created_at: Utc::now().into(),
    }
}

pub fn token_for(user: &user::Model) -> String {
    create_token(user, JWT_SECRET, 168).unwrap()
}

pub fn sample_bus(id: i32, capacity: i32) -> bus::Model {
    bus::Model {
        id,
        reg_number: format!("B-{:04}-XY", id),
        capacity,
        bus_type: "AC Sleeper".to_string(),
    }
}

pub fn sample_route(id: i32) -> route::Model {
    route::Model {
        id,
        source: "Jakarta".to_string(),
        destination: "Surabaya".to_string(),
    }
}

pub fn sample_schedule(id: i32, bus_id: i32, route_id: i32, available_seats: i32) -> schedule::Model {
    schedule::Model {
        id,
        bus_id,
        route_id,
        departure_time: Utc.with_ymd_and_hms(2026, 8, 20, 9, 30, 0).unwrap().into(),
        arrival_time: Utc.with_ymd_and_hms(2026, 8, 20, 18, 0, 0).unwrap().into(),
        fare: 150.0,
        available_seats,
    }
}

pub fn sample_booking(
    id: Uuid,
    user_id: Uuid,
    schedule_id: i32,
    num_of_seats: i32,
    status: BookingStatus,
) -> booking::Model {
    booking::Model {
        id,
        user_id,
        schedule_id,
        num_of_seats,
        total_amount: 150.0 * num_of_seats as f64,
        status,
        booking_date: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap().into(),
    }
}

pub fn sample_passenger(id: i32, booking_id: Uuid, seat_number: i32) -> passenger::Model {
    passenger::Model {
        id,
        booking_id,
        name: format!("Passenger {}", id),
        age: 30,
        gender: "female".to_string(),
        seat_number,
    }
}

/// Send one request through the router and return status plus parsed JSON body
pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::{bus, passenger, route, schedule};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

// ============ Search ============

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub source: String,
    pub destination: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub schedule_id: i32,
    pub reg_number: String,
    pub bus_type: String,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub fare: f64,
    pub available_seats: i32,
}

/// Search schedules with seats left by source, destination and travel date
pub async fn search_buses(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchResult>>> {
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date, expected YYYY-MM-DD".to_string()))?;

    let routes = route::Entity::find()
        .filter(route::Column::Source.eq(&params.source))
        .filter(route::Column::Destination.eq(&params.destination))
        .all(state.db.as_ref())
        .await?;

    if routes.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let route_ids: Vec<i32> = routes.iter().map(|r| r.id).collect();
    let schedules = schedule::Entity::find()
        .filter(schedule::Column::RouteId.is_in(route_ids))
        .filter(schedule::Column::AvailableSeats.gt(0))
        .all(state.db.as_ref())
        .await?;

    let buses = bus::Entity::find().all(state.db.as_ref()).await?;

    let mut results = Vec::new();
    for s in schedules {
        if s.departure_time.date_naive() != date {
            continue;
        }

        let bus = buses.iter().find(|b| b.id == s.bus_id);
        let route = routes.iter().find(|r| r.id == s.route_id);
        if bus.is_none() || route.is_none() {
            continue;
        }

        let bus = bus.unwrap();
        let route = route.unwrap();

        results.push(SearchResult {
            schedule_id: s.id,
            reg_number: bus.reg_number.clone(),
            bus_type: bus.bus_type.clone(),
            source: route.source.clone(),
            destination: route.destination.clone(),
            departure_time: s.departure_time.with_timezone(&Utc),
            arrival_time: s.arrival_time.with_timezone(&Utc),
            fare: s.fare,
            available_seats: s.available_seats,
        });
    }

    Ok(Json(results))
}

// ============ Booking ============

#[derive(Debug, Deserialize)]
pub struct PassengerInfo {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
pub struct BookTicketRequest {
    pub user_id: Uuid,
    pub schedule_id: i32,
    pub num_of_seats: i32,
    pub passengers: Vec<PassengerInfo>,
}

#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub booking_id: Uuid,
    pub num_of_seats: i32,
    pub total_amount: f64,
    pub status: BookingStatus,
}

/// Book seats on a schedule for the logged-in user
pub async fn book_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BookTicketRequest>,
) -> AppResult<Json<BookingSummary>> {
    if claims.sub != payload.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to book for this user".to_string(),
        ));
    }

    if payload.num_of_seats < 1 {
        return Err(AppError::BadRequest("Must book at least 1 seat".to_string()));
    }

    if payload.passengers.len() != payload.num_of_seats as usize {
        return Err(AppError::BadRequest(
            "Number of seats does not match number of passengers".to_string(),
        ));
    }

    for p in &payload.passengers {
        if p.name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Passenger name must not be empty".to_string(),
            ));
        }
    }

    let txn = state.db.begin().await?;

    // Re-read the seat count under a row lock; concurrent bookings on the
    // same schedule serialize here, so the last seats cannot be sold twice.
    let schedule = schedule::Entity::find_by_id(payload.schedule_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    if schedule.available_seats < payload.num_of_seats {
        txn.rollback().await?;
        return Err(AppError::Conflict("Not enough seats available".to_string()));
    }

    let bus = bus::Entity::find_by_id(schedule.bus_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Bus not found for schedule".to_string()))?;

    let fare = schedule.fare;
    let seats_left = schedule.available_seats - payload.num_of_seats;
    // Seats are handed out sequentially; the first free one follows the
    // already-sold block.
    let first_seat = bus.capacity - schedule.available_seats + 1;

    let mut active: schedule::ActiveModel = schedule.into();
    active.available_seats = Set(seats_left);
    active.update(&txn).await?;

    let total_amount = fare * payload.num_of_seats as f64;
    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        schedule_id: Set(payload.schedule_id),
        num_of_seats: Set(payload.num_of_seats),
        total_amount: Set(total_amount),
        status: Set(BookingStatus::Confirmed),
        booking_date: Set(Utc::now().into()),
    };
    let created = new_booking.insert(&txn).await?;

    for (i, p) in payload.passengers.iter().enumerate() {
        let new_passenger = passenger::ActiveModel {
            booking_id: Set(created.id),
            name: Set(p.name.clone()),
            age: Set(p.age),
            gender: Set(p.gender.clone()),
            seat_number: Set(first_seat + i as i32),
            ..Default::default()
        };
        new_passenger.insert(&txn).await?;
    }

    txn.commit().await?;

    Ok(Json(BookingSummary {
        booking_id: created.id,
        num_of_seats: created.num_of_seats,
        total_amount: created.total_amount,
        status: created.status,
    }))
}

// ============ Booking history ============

#[derive(Debug, Serialize)]
pub struct BookingHistoryItem {
    pub booking_id: Uuid,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub num_of_seats: i32,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

/// List the logged-in user's bookings, most recent departure first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<BookingHistoryItem>>> {
    if claims.sub != user_id {
        return Err(AppError::Forbidden(
            "Not authorized to view bookings for this user".to_string(),
        ));
    }

    let bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .all(state.db.as_ref())
        .await?;

    if bookings.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let schedule_ids: Vec<i32> = bookings.iter().map(|b| b.schedule_id).collect();
    let schedules = schedule::Entity::find()
        .filter(schedule::Column::Id.is_in(schedule_ids))
        .all(state.db.as_ref())
        .await?;

    let routes = route::Entity::find().all(state.db.as_ref()).await?;

    let mut responses = Vec::new();
    for b in bookings {
        let schedule = schedules.iter().find(|s| s.id == b.schedule_id);
        if schedule.is_none() {
            continue;
        }
        let schedule = schedule.unwrap();
        let route = routes.iter().find(|r| r.id == schedule.route_id);

        responses.push(BookingHistoryItem {
            booking_id: b.id,
            source: route.map(|r| r.source.clone()).unwrap_or_default(),
            destination: route.map(|r| r.destination.clone()).unwrap_or_default(),
            departure_time: schedule.departure_time.with_timezone(&Utc),
            num_of_seats: b.num_of_seats,
            total_amount: b.total_amount,
            status: b.status,
            booking_date: b.booking_date.with_timezone(&Utc),
        });
    }

    responses.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));

    Ok(Json(responses))
}

// ============ Booking details ============

#[derive(Debug, Serialize)]
pub struct BookingDetails {
    pub booking_id: Uuid,
    pub num_of_seats: i32,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub fare: f64,
    pub source: String,
    pub destination: String,
    pub reg_number: String,
    pub bus_type: String,
}

#[derive(Debug, Serialize)]
pub struct PassengerDetails {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub seat_number: i32,
}

#[derive(Debug, Serialize)]
pub struct BookingDetailsResponse {
    pub details: BookingDetails,
    pub passengers: Vec<PassengerDetails>,
}

/// Full details for one of the logged-in user's bookings
pub async fn booking_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingDetailsResponse>> {
    let found = booking::Entity::find_by_id(booking_id).one(state.db.as_ref()).await?;

    // A missing booking and someone else's booking look the same to the caller
    let booking = match found {
        Some(b) if b.user_id == claims.sub => b,
        _ => return Err(AppError::NotFound("Booking not found".to_string())),
    };

    let schedule = schedule::Entity::find_by_id(booking.schedule_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Internal("Schedule missing for booking".to_string()))?;

    let route = route::Entity::find_by_id(schedule.route_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Internal("Route missing for schedule".to_string()))?;

    let bus = bus::Entity::find_by_id(schedule.bus_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Internal("Bus missing for schedule".to_string()))?;

    let passengers = passenger::Entity::find()
        .filter(passenger::Column::BookingId.eq(booking.id))
        .all(state.db.as_ref())
        .await?;

    Ok(Json(BookingDetailsResponse {
        details: BookingDetails {
            booking_id: booking.id,
            num_of_seats: booking.num_of_seats,
            total_amount: booking.total_amount,
            status: booking.status,
            booking_date: booking.booking_date.with_timezone(&Utc),
            departure_time: schedule.departure_time.with_timezone(&Utc),
            arrival_time: schedule.arrival_time.with_timezone(&Utc),
            fare: schedule.fare,
            source: route.source,
            destination: route.destination,
            reg_number: bus.reg_number,
            bus_type: bus.bus_type,
        },
        passengers: passengers
            .into_iter()
            .map(|p| PassengerDetails {
                name: p.name,
                age: p.age,
                gender: p.gender,
                seat_number: p.seat_number,
            })
            .collect(),
    }))
}

// ============ Cancellation ============

#[derive(Debug, Deserialize)]
pub struct CancelTicketRequest {
    pub booking_id: Uuid,
}

/// Cancel a booking and restore its seats to the schedule
pub async fn cancel_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CancelTicketRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let txn = state.db.begin().await?;

    let booking = booking::Entity::find_by_id(payload.booking_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Cancelling twice is a no-op; seats are only restored once
    if booking.status == BookingStatus::Cancelled {
        txn.rollback().await?;
        return Ok(Json(
            serde_json::json!({ "message": "Booking was already cancelled" }),
        ));
    }

    let schedule = schedule::Entity::find_by_id(booking.schedule_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Schedule missing for booking".to_string()))?;

    let restored = schedule.available_seats + booking.num_of_seats;
    let mut schedule_active: schedule::ActiveModel = schedule.into();
    schedule_active.available_seats = Set(restored);
    schedule_active.update(&txn).await?;

    let mut booking_active: booking::ActiveModel = booking.into();
    booking_active.status = Set(BookingStatus::Cancelled);
    booking_active.update(&txn).await?;

    txn.commit().await?;

    Ok(Json(
        serde_json::json!({ "message": "Booking cancelled successfully" }),
    ))
}

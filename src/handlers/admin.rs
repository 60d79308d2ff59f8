use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::entities::{booking, bus, route, schedule};
use crate::error::{AppError, AppResult};
use crate::utils::time::parse_client_datetime;

// ============ Bus Management ============

#[derive(Debug, Deserialize)]
pub struct CreateBusRequest {
    pub reg_number: String,
    pub capacity: i32,
    pub bus_type: String,
}

/// Add a new bus (admin)
pub async fn add_bus(
    State(state): State<AppState>,
    Json(payload): Json<CreateBusRequest>,
) -> AppResult<(StatusCode, Json<bus::Model>)> {
    if payload.reg_number.trim().is_empty() || payload.bus_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please provide all bus details".to_string(),
        ));
    }

    if payload.capacity < 1 {
        return Err(AppError::BadRequest(
            "Capacity must be at least 1".to_string(),
        ));
    }

    let new_bus = bus::ActiveModel {
        reg_number: Set(payload.reg_number.clone()),
        capacity: Set(payload.capacity),
        bus_type: Set(payload.bus_type.clone()),
        ..Default::default()
    };

    let created = new_bus.insert(state.db.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all buses (admin)
pub async fn list_buses(State(state): State<AppState>) -> AppResult<Json<Vec<bus::Model>>> {
    let buses = bus::Entity::find()
        .order_by_desc(bus::Column::Id)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(buses))
}

// ============ Route Management ============

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub source: String,
    pub destination: String,
}

/// Add a new route (admin)
pub async fn add_route(
    State(state): State<AppState>,
    Json(payload): Json<CreateRouteRequest>,
) -> AppResult<(StatusCode, Json<route::Model>)> {
    if payload.source.trim().is_empty() || payload.destination.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please provide source and destination".to_string(),
        ));
    }

    let new_route = route::ActiveModel {
        source: Set(payload.source.clone()),
        destination: Set(payload.destination.clone()),
        ..Default::default()
    };

    let created = new_route.insert(state.db.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all routes (admin)
pub async fn list_routes(State(state): State<AppState>) -> AppResult<Json<Vec<route::Model>>> {
    let routes = route::Entity::find()
        .order_by_desc(route::Column::Id)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(routes))
}

// ============ Schedule Management ============

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub bus_id: i32,
    pub route_id: i32,
    pub departure_time: String,
    pub arrival_time: String,
    pub fare: f64,
    pub available_seats: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub fare: Option<f64>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub available_seats: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: i32,
    pub bus_id: i32,
    pub route_id: i32,
    pub reg_number: String,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub fare: f64,
    pub available_seats: i32,
}

fn validate_seats(available_seats: i32, capacity: i32) -> AppResult<()> {
    if available_seats < 0 {
        return Err(AppError::BadRequest(
            "Available seats must not be negative".to_string(),
        ));
    }
    if available_seats > capacity {
        return Err(AppError::BadRequest(
            "Available seats cannot exceed bus capacity".to_string(),
        ));
    }
    Ok(())
}

/// Add a new schedule (admin)
pub async fn add_schedule(
    State(state): State<AppState>,
    Json(payload): Json<CreateScheduleRequest>,
) -> AppResult<(StatusCode, Json<schedule::Model>)> {
    let bus = bus::Entity::find_by_id(payload.bus_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid bus".to_string()))?;

    route::Entity::find_by_id(payload.route_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid route".to_string()))?;

    let departure_time = parse_client_datetime(&payload.departure_time)?;
    let arrival_time = parse_client_datetime(&payload.arrival_time)?;

    if payload.fare <= 0.0 {
        return Err(AppError::BadRequest("Fare must be positive".to_string()));
    }

    validate_seats(payload.available_seats, bus.capacity)?;

    let new_schedule = schedule::ActiveModel {
        bus_id: Set(payload.bus_id),
        route_id: Set(payload.route_id),
        departure_time: Set(departure_time.into()),
        arrival_time: Set(arrival_time.into()),
        fare: Set(payload.fare),
        available_seats: Set(payload.available_seats),
        ..Default::default()
    };

    let created = new_schedule.insert(state.db.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all schedules joined with bus and route info (admin)
pub async fn list_schedules(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ScheduleResponse>>> {
    let schedules = schedule::Entity::find().all(state.db.as_ref()).await?;
    let buses = bus::Entity::find().all(state.db.as_ref()).await?;
    let routes = route::Entity::find().all(state.db.as_ref()).await?;

    let mut responses = Vec::new();
    for s in schedules {
        let bus = buses.iter().find(|b| b.id == s.bus_id);
        let route = routes.iter().find(|r| r.id == s.route_id);

        responses.push(ScheduleResponse {
            id: s.id,
            bus_id: s.bus_id,
            route_id: s.route_id,
            reg_number: bus.map(|b| b.reg_number.clone()).unwrap_or_default(),
            source: route.map(|r| r.source.clone()).unwrap_or_default(),
            destination: route.map(|r| r.destination.clone()).unwrap_or_default(),
            departure_time: s.departure_time.with_timezone(&Utc),
            arrival_time: s.arrival_time.with_timezone(&Utc),
            fare: s.fare,
            available_seats: s.available_seats,
        });
    }

    responses.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));

    Ok(Json(responses))
}

/// Update a schedule (admin); all fields are required
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> AppResult<Json<schedule::Model>> {
    let (Some(fare), Some(departure_raw), Some(arrival_raw), Some(available_seats)) = (
        payload.fare,
        payload.departure_time,
        payload.arrival_time,
        payload.available_seats,
    ) else {
        return Err(AppError::BadRequest(
            "All fields are required to update".to_string(),
        ));
    };

    let schedule = schedule::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let bus = bus::Entity::find_by_id(schedule.bus_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Internal("Bus missing for schedule".to_string()))?;

    let departure_time = parse_client_datetime(&departure_raw)?;
    let arrival_time = parse_client_datetime(&arrival_raw)?;

    if fare <= 0.0 {
        return Err(AppError::BadRequest("Fare must be positive".to_string()));
    }

    validate_seats(available_seats, bus.capacity)?;

    let mut active: schedule::ActiveModel = schedule.into();
    active.fare = Set(fare);
    active.departure_time = Set(departure_time.into());
    active.arrival_time = Set(arrival_time.into());
    active.available_seats = Set(available_seats);

    let updated = active.update(state.db.as_ref()).await?;
    Ok(Json(updated))
}

// ============ Cascade deletes ============

/// Delete a schedule and all bookings referencing it (admin).
/// Passenger rows go with their bookings via the FK cascade.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let txn = state.db.begin().await?;

    booking::Entity::delete_many()
        .filter(booking::Column::ScheduleId.eq(id))
        .exec(&txn)
        .await?;

    let result = schedule::Entity::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }

    txn.commit().await?;

    Ok(Json(serde_json::json!({
        "message": "Schedule and all associated bookings deleted"
    })))
}

/// Delete a bus together with its schedules and their bookings (admin)
pub async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let txn = state.db.begin().await?;

    let schedules = schedule::Entity::find()
        .filter(schedule::Column::BusId.eq(id))
        .all(&txn)
        .await?;

    let schedule_ids: Vec<i32> = schedules.iter().map(|s| s.id).collect();
    if !schedule_ids.is_empty() {
        booking::Entity::delete_many()
            .filter(booking::Column::ScheduleId.is_in(schedule_ids))
            .exec(&txn)
            .await?;

        schedule::Entity::delete_many()
            .filter(schedule::Column::BusId.eq(id))
            .exec(&txn)
            .await?;
    }

    let result = bus::Entity::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound("Bus not found".to_string()));
    }

    txn.commit().await?;

    Ok(Json(serde_json::json!({
        "message": "Bus and all related schedules/bookings deleted"
    })))
}

/// Delete a route together with its schedules and their bookings (admin)
pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let txn = state.db.begin().await?;

    let schedules = schedule::Entity::find()
        .filter(schedule::Column::RouteId.eq(id))
        .all(&txn)
        .await?;

    let schedule_ids: Vec<i32> = schedules.iter().map(|s| s.id).collect();
    if !schedule_ids.is_empty() {
        booking::Entity::delete_many()
            .filter(booking::Column::ScheduleId.is_in(schedule_ids))
            .exec(&txn)
            .await?;

        schedule::Entity::delete_many()
            .filter(schedule::Column::RouteId.eq(id))
            .exec(&txn)
            .await?;
    }

    let result = route::Entity::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::NotFound("Route not found".to_string()));
    }

    txn.commit().await?;

    Ok(Json(serde_json::json!({
        "message": "Route and all related schedules/bookings deleted"
    })))
}

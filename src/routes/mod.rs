use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::AppState;
use crate::handlers::{admin, auth, booking};
use crate::middleware::auth::{auth_middleware, require_admin};

async fn health() -> &'static str {
    "Bus Ticket Booking API is running"
}

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let public_routes = Router::new().route("/search", get(booking::search_buses));

    // Booking routes (requires auth)
    let booking_routes = Router::new()
        .route("/book", post(booking::book_ticket))
        .route("/bookings/{user_id}", get(booking::my_bookings))
        .route("/booking/{booking_id}", get(booking::booking_details))
        .route("/cancel", post(booking::cancel_ticket))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Bus management
        .route("/bus", post(admin::add_bus))
        .route("/bus", get(admin::list_buses))
        .route("/bus/{id}", delete(admin::delete_bus))
        // Route management
        .route("/route", post(admin::add_route))
        .route("/route", get(admin::list_routes))
        .route("/route/{id}", delete(admin::delete_route))
        // Schedule management
        .route("/schedule", post(admin::add_schedule))
        .route("/schedule", get(admin::list_schedules))
        .route("/schedule/{id}", put(admin::update_schedule))
        .route("/schedule/{id}", delete(admin::delete_schedule))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .route("/", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(booking_routes))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}

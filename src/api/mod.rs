pub mod admin;
pub mod auth;
pub mod bookings;
pub mod checkins;
pub mod checkouts;
pub mod contracts;
pub mod maintenance;
pub mod notifications;
pub mod payments;
pub mod rooms;
pub mod tenants;
pub mod utility_bills;

use crate::middleware::AppState;
use axum::Router;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .nest("/rooms", rooms::routes())
        .nest("/bookings", bookings::routes())
        .nest("/tenants", tenants::routes())
        .nest("/contracts", contracts::routes())
        .nest("/utility-bills", utility_bills::routes())
        .nest("/payments", payments::routes())
        .nest("/maintenance", maintenance::routes())
        .nest("/checkins", checkins::routes())
        .nest("/checkouts", checkouts::routes())
        .nest("/notifications", notifications::routes())
        .nest("/admin", admin::routes())
}

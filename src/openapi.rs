use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roomly API",
        version = "1.0.0",
        description = "Backend API for Roomly - property and room rental management platform",
        contact(
            name = "Roomly Team"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "rooms", description = "Room listing and management"),
        (name = "bookings", description = "Booking intake and processing"),
        (name = "notifications", description = "User notifications"),
        (name = "admin", description = "Admin dashboard, reports and backups")
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        // Rooms
        crate::api::rooms::list_rooms,
        crate::api::rooms::get_room,
        crate::api::rooms::create_room,
        crate::api::rooms::delete_room,
        // Bookings
        crate::api::bookings::create_booking,
        crate::api::bookings::list_bookings,
        // Notifications
        crate::api::notifications::list_notifications,
        // Admin
        crate::api::admin::get_dashboard,
    ),
    components(
        schemas(
            // Auth
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::LoginResponse,
            crate::models::UserPublic,
            crate::models::UserRole,
            // Rooms
            crate::models::RoomResponse,
            crate::models::RoomStatus,
            crate::models::UpdateRoomRequest,
            crate::models::UpdateRoomStatusRequest,
            crate::services::room_state::RoomTransition,
            // Bookings
            crate::models::BookingWithRoom,
            crate::models::BookingStatus,
            crate::models::CreateBookingRequest,
            crate::models::UpdateBookingStatusRequest,
            // Notifications
            crate::models::Notification,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

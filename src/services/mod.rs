pub mod auth_service;
pub mod backup_service;
pub mod file_service;
pub mod notification_service;
pub mod provisioning;
pub mod room_state;

pub use auth_service::{AuthService, Claims};
pub use file_service::FileService;
pub use room_state::{InvalidTransition, RoomTransition};

pub mod booking;
pub mod checkin;
pub mod contract;
pub mod maintenance;
pub mod notification;
pub mod payment;
pub mod report;
pub mod room;
pub mod tenant;
pub mod user;
pub mod utility_bill;

pub use booking::*;
pub use checkin::*;
pub use contract::*;
pub use maintenance::*;
pub use notification::*;
pub use payment::*;
pub use report::*;
pub use room::*;
pub use tenant::*;
pub use user::*;
pub use utility_bill::*;

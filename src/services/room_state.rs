use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::RoomStatus;

/// Named room status transitions. Handlers go through [`apply`] instead of
/// writing status strings inline, and persist the result with a
/// compare-and-set update so concurrent writers cannot race past the guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomTransition {
    Reserve,
    Occupy,
    Vacate,
    CancelReservation,
    BeginMaintenance,
    EndMaintenance,
}

impl std::fmt::Display for RoomTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoomTransition::Reserve => "reserve",
            RoomTransition::Occupy => "occupy",
            RoomTransition::Vacate => "vacate",
            RoomTransition::CancelReservation => "cancel the reservation of",
            RoomTransition::BeginMaintenance => "begin maintenance on",
            RoomTransition::EndMaintenance => "end maintenance on",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {transition} a room that is {from}")]
pub struct InvalidTransition {
    pub from: RoomStatus,
    pub transition: RoomTransition,
}

pub fn apply(status: RoomStatus, transition: RoomTransition) -> Result<RoomStatus, InvalidTransition> {
    use RoomStatus::*;
    use RoomTransition::*;

    let next = match (status, transition) {
        (Available, Reserve) => Reserved,
        (Available, Occupy) | (Reserved, Occupy) => Occupied,
        (Occupied, Vacate) => Available,
        (Reserved, CancelReservation) => Available,
        (Available, BeginMaintenance) | (Reserved, BeginMaintenance) => Maintenance,
        (Maintenance, EndMaintenance) => Available,
        (from, transition) => return Err(InvalidTransition { from, transition }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomStatus::*;
    use RoomTransition::*;

    #[test]
    fn test_booking_reserves_available_room() {
        assert_eq!(apply(Available, Reserve), Ok(Reserved));
    }

    #[test]
    fn test_cannot_reserve_non_available_room() {
        assert!(apply(Reserved, Reserve).is_err());
        assert!(apply(Occupied, Reserve).is_err());
        assert!(apply(Maintenance, Reserve).is_err());
    }

    #[test]
    fn test_contract_occupies_available_or_reserved() {
        assert_eq!(apply(Available, Occupy), Ok(Occupied));
        assert_eq!(apply(Reserved, Occupy), Ok(Occupied));
        assert!(apply(Occupied, Occupy).is_err());
        assert!(apply(Maintenance, Occupy).is_err());
    }

    #[test]
    fn test_checkout_vacates_occupied_room() {
        assert_eq!(apply(Occupied, Vacate), Ok(Available));
        assert!(apply(Available, Vacate).is_err());
    }

    #[test]
    fn test_cancellation_releases_reservation() {
        assert_eq!(apply(Reserved, CancelReservation), Ok(Available));
        assert!(apply(Occupied, CancelReservation).is_err());
    }

    #[test]
    fn test_maintenance_cycle() {
        assert_eq!(apply(Available, BeginMaintenance), Ok(Maintenance));
        assert_eq!(apply(Reserved, BeginMaintenance), Ok(Maintenance));
        assert!(apply(Occupied, BeginMaintenance).is_err());
        assert_eq!(apply(Maintenance, EndMaintenance), Ok(Available));
        assert!(apply(Available, EndMaintenance).is_err());
    }

    #[test]
    fn test_error_message_names_both_sides() {
        let err = apply(Occupied, Reserve).unwrap_err();
        assert_eq!(err.to_string(), "cannot reserve a room that is occupied");
    }
}

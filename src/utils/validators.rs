use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static ROOM_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9/-]{1,16}$").unwrap());

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap());

pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn validate_room_number(room_number: &str) -> bool {
    ROOM_NUMBER_REGEX.is_match(room_number)
}

pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Visually unambiguous characters: no 0/O, 1/I/L.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid room code: {0:?}")]
pub struct InvalidRoomCode(pub String);

/// Short human-typable key a room is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Accepts user input: surrounding whitespace and case are forgiven.
    pub fn parse(input: &str) -> Result<Self, InvalidRoomCode> {
        let code = input.trim().to_uppercase();
        let valid = code.len() == ROOM_CODE_LENGTH
            && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b));

        if valid {
            Ok(Self(code))
        } else {
            Err(InvalidRoomCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = InvalidRoomCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

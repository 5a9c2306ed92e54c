//! Typed identifiers.
//!
//! Users and posts are keyed by positive 64-bit snowflakes. Wrapping them in
//! distinct types keeps a post id from ever being compared against a user id,
//! and keeps path strings from being compared against either.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a path segment is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} id", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.parse::<i64>() {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(ParseIdError { kind: $kind }),
                }
            }
        }
    };
}

typed_id!(
    /// Primary identifier of a user account; also the subject of a session token.
    UserId,
    "user"
);

typed_id!(
    /// Primary identifier of a post.
    PostId,
    "post"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        assert_eq!("14".parse::<UserId>(), Ok(UserId::new(14)));
        assert_eq!("3".parse::<PostId>(), Ok(PostId::new(3)));
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        for bad in ["", "abc", "14a", " 14", "0", "-5", "1.5"] {
            assert!(bad.parse::<UserId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_error_names_the_kind() {
        let err = "x".parse::<PostId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid post id");
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(back, UserId::new(42));
    }
}

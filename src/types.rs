//! Newtype wrappers for improved type safety and domain modeling.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A board seen from the acting player's side.
///
/// Each cell holds `+1` for the acting player's piece, `-1` for the
/// opponent's piece and `0` for an empty cell. The same physical position
/// reached by X and by O (with colours swapped) yields the same value, which
/// lets a single Q-table serve both seats.
///
/// The textual key is the comma-joined cell values, e.g. `1,0,-1,0,0,0,0,0,0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalState([i8; 9]);

impl CanonicalState {
    /// Build a state from already-signed values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateKey`] if any value lies outside `{-1, 0, 1}`.
    pub fn new(values: [i8; 9]) -> Result<Self, Error> {
        if let Some(bad) = values.iter().find(|v| !(-1..=1).contains(*v)) {
            return Err(Error::InvalidStateKey {
                key: Self(values).key(),
                reason: format!("cell value {bad} is not one of -1, 0, 1"),
            });
        }
        Ok(Self(values))
    }

    /// Crate-internal constructor for values produced from `Cell::value`.
    pub(crate) fn from_signed(values: [i8; 9]) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self([0; 9])
    }

    pub fn values(&self) -> &[i8; 9] {
        &self.0
    }

    /// Empty cells in ascending order. On a non-terminal state these are the
    /// legal actions.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// The same position seen by the other player.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self(self.0.map(|v| -v))
    }

    pub fn key(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a key produced by [`CanonicalState::key`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateKey`] for anything other than nine
    /// comma-separated values in `{-1, 0, 1}`.
    pub fn parse(key: &str) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidStateKey {
            key: key.to_string(),
            reason,
        };

        let parts: Vec<&str> = key.split(',').map(str::trim).collect();
        if parts.len() != 9 {
            return Err(invalid(format!("expected 9 cells, found {}", parts.len())));
        }

        let mut values = [0i8; 9];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<i8>()
                .map_err(|e| invalid(format!("'{part}': {e}")))?;
        }
        Self::new(values).map_err(|_| invalid("cell values must be -1, 0 or 1".to_string()))
    }
}

impl fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for CanonicalState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CanonicalState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for CanonicalState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Self::parse(&key).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let state = CanonicalState::new([1, 0, -1, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(state.key(), "1,0,-1,0,0,0,0,0,0");
        assert_eq!(state.to_string(), state.key());
    }

    #[test]
    fn test_parse_roundtrip() {
        let state = CanonicalState::new([1, -1, 0, 0, 1, 0, -1, 0, 0]).unwrap();
        let parsed: CanonicalState = state.key().parse().unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert!(CanonicalState::parse("1,0,0").is_err());
        assert!(CanonicalState::parse("1,0,0,0,0,0,0,0,2").is_err());
        assert!(CanonicalState::parse("a,0,0,0,0,0,0,0,0").is_err());
        assert!(CanonicalState::parse("").is_err());
    }

    #[test]
    fn test_flipped_is_involution() {
        let state = CanonicalState::new([1, -1, 0, 0, 1, 0, -1, 0, 0]).unwrap();
        assert_eq!(state.flipped().flipped(), state);
        assert_eq!(state.flipped().values()[0], -1);
    }

    #[test]
    fn test_empty_cells() {
        let state = CanonicalState::new([1, -1, 0, 0, 1, 0, -1, 0, 0]).unwrap();
        assert_eq!(state.empty_cells(), vec![2, 3, 5, 7, 8]);
        assert_eq!(CanonicalState::empty().empty_cells().len(), 9);
    }

    #[test]
    fn test_serde_as_string() {
        let state = CanonicalState::new([0, 0, 0, 0, 1, 0, 0, 0, -1]).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "\"0,0,0,0,1,0,0,0,-1\"");
        let back: CanonicalState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

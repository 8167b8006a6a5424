use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitIdError {
    #[error("unit numbers start at 1")]
    Zero,

    #[error("invalid unit number: {0}")]
    Invalid(String),
}

/// Positive number identifying a unit in the catalog.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new `UnitId`.
    ///
    /// # Errors
    ///
    /// Returns `UnitIdError::Zero` for `0`.
    pub fn new(value: u32) -> Result<Self, UnitIdError> {
        if value == 0 {
            return Err(UnitIdError::Zero);
        }
        Ok(Self(value))
    }

    /// Returns the underlying unit number.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for UnitId {
    type Err = UnitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| UnitIdError::Invalid(s.to_owned()))?;
        Self::new(value)
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Selector ──────────────────────────────────────────────────────────────────

/// Which phrases a session draws from: one unit or the union of every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitSelector {
    Unit(UnitId),
    All,
}

impl UnitSelector {
    /// Returns the selected unit, or `None` for `All`.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            UnitSelector::Unit(id) => Some(*id),
            UnitSelector::All => None,
        }
    }

    /// Whether a phrase from `unit` belongs to this selection.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        match self {
            UnitSelector::Unit(id) => *id == unit,
            UnitSelector::All => true,
        }
    }
}

impl From<UnitId> for UnitSelector {
    fn from(id: UnitId) -> Self {
        UnitSelector::Unit(id)
    }
}

impl fmt::Display for UnitSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSelector::Unit(id) => write!(f, "Unit {id}"),
            UnitSelector::All => write!(f, "All units"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(UnitId::new(0), Err(UnitIdError::Zero));
        assert_eq!("0".parse::<UnitId>(), Err(UnitIdError::Zero));
    }

    #[test]
    fn parses_from_text() {
        assert_eq!("12".parse::<UnitId>().unwrap().value(), 12);
        assert!("twelve".parse::<UnitId>().is_err());
    }

    #[test]
    fn selector_contains() {
        let three = UnitId::new(3).unwrap();
        let four = UnitId::new(4).unwrap();
        assert!(UnitSelector::Unit(three).contains(three));
        assert!(!UnitSelector::Unit(three).contains(four));
        assert!(UnitSelector::All.contains(four));
        assert_eq!(UnitSelector::All.to_string(), "All units");
        assert_eq!(UnitSelector::Unit(three).to_string(), "Unit 3");
    }
}

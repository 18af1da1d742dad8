//! Argument-list violation kinds

use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::sentinel::{
    ERR_INVALID_ARGUMENT_TYPE, ERR_MISPLACED_ERROR, ERR_MISSING_SENTINEL, ERR_ODD_KEY_VALUE_COUNT,
    ERR_TRAILING_KEY, Sentinel,
};

/// The kind of problem found in a malformed argument list.
///
/// Every kind maps onto one built-in [`Sentinel`], which is what callers
/// match against on the returned error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display, EnumIter)]
#[non_exhaustive]
pub enum ViolationKind {
    /// No leading sentinel, or an empty argument list
    MissingSentinel,

    /// A string key is the final argument
    TrailingKey,

    /// An error value sits where neither a sentinel nor a cause is accepted
    MisplacedError,

    /// A non-string, non-error value sits at a key position
    InvalidArgumentType,

    /// The key/value tags cannot be paired
    OddKeyValueCount,
}

impl ViolationKind {
    /// Returns the violation kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// The built-in sentinel reported for this kind.
    pub fn sentinel(&self) -> &'static Sentinel {
        match self {
            ViolationKind::MissingSentinel => &ERR_MISSING_SENTINEL,
            ViolationKind::TrailingKey => &ERR_TRAILING_KEY,
            ViolationKind::MisplacedError => &ERR_MISPLACED_ERROR,
            ViolationKind::InvalidArgumentType => &ERR_INVALID_ARGUMENT_TYPE,
            ViolationKind::OddKeyValueCount => &ERR_ODD_KEY_VALUE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_violation_kind_display() {
        assert_eq!(ViolationKind::TrailingKey.to_string(), "TrailingKey");
        assert_eq!(
            ViolationKind::InvalidArgumentType.as_str(),
            "InvalidArgumentType"
        );
    }

    #[test]
    fn test_sentinel_mapping() {
        assert_eq!(
            ViolationKind::MissingSentinel.sentinel(),
            &ERR_MISSING_SENTINEL
        );
        assert_eq!(
            ViolationKind::OddKeyValueCount.sentinel(),
            &ERR_ODD_KEY_VALUE_COUNT
        );
        assert_ne!(
            ViolationKind::TrailingKey.sentinel(),
            ViolationKind::MisplacedError.sentinel()
        );
    }

    #[test]
    fn test_every_kind_maps_to_distinct_sentinel() {
        let sentinels: Vec<&'static Sentinel> = ViolationKind::iter().map(|k| k.sentinel()).collect();
        assert_eq!(sentinels.len(), 5);
        for (i, a) in sentinels.iter().enumerate() {
            for b in &sentinels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

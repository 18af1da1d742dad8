//! Sentinel error identities.

use std::fmt;

/// A stable error identity used to tag a class or layer of failure.
///
/// Sentinels are declared once as `static` items (see [`sentinel!`])
/// and compared by address. Two sentinels that happen to share a name are
/// still distinct identities.
pub struct Sentinel {
    name: &'static str,
}

impl Sentinel {
    /// Create a sentinel. Only meaningful when stored in a `static`.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Get the sentinel name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Sentinel {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Sentinel {}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentinel({:?})", self.name)
    }
}

impl std::error::Error for Sentinel {}

/// Declare a `static` [`Sentinel`].
///
/// ```rust
/// errtree::sentinel!(pub ERR_DRIVER = "driver");
/// errtree::sentinel!(ERR_REPOSITORY = "repository");
///
/// assert_ne!(&ERR_DRIVER, &ERR_REPOSITORY);
/// ```
#[macro_export]
macro_rules! sentinel {
    ($(#[$meta:meta])* $vis:vis $ident:ident = $name:expr) => {
        $(#[$meta])*
        $vis static $ident: $crate::Sentinel = $crate::Sentinel::new($name);
    };
}

// =========================================================================
// Built-in sentinels
// =========================================================================

sentinel!(
    /// The argument list carried no leading sentinel error.
    pub ERR_MISSING_SENTINEL = "missing sentinel error"
);

sentinel!(
    /// A string key was the last argument, with no value after it.
    pub ERR_TRAILING_KEY = "trailing key without value"
);

sentinel!(
    /// An error value appeared where it is not accepted.
    pub ERR_MISPLACED_ERROR = "misplaced error argument"
);

sentinel!(
    /// A value that is neither a string key nor an error appeared at a key position.
    pub ERR_INVALID_ARGUMENT_TYPE = "invalid argument type"
);

sentinel!(
    /// The key/value portion of the argument list could not be paired.
    pub ERR_ODD_KEY_VALUE_COUNT = "odd number of key/value arguments"
);

sentinel!(
    /// An entry built by a different engine copy was enriched.
    pub ERR_CROSS_PACKAGE_ERROR = "error from a different engine copy"
);

#[cfg(test)]
mod tests {
    use super::*;

    sentinel!(FIRST = "same");
    sentinel!(SECOND = "same");

    #[test]
    fn identity_is_by_address_not_name() {
        assert_eq!(FIRST.name(), SECOND.name());
        assert_ne!(&FIRST, &SECOND);
        assert_eq!(&FIRST, &FIRST);
    }

    #[test]
    fn builtin_sentinels_are_distinct() {
        let all: [&Sentinel; 6] = [
            &ERR_MISSING_SENTINEL,
            &ERR_TRAILING_KEY,
            &ERR_MISPLACED_ERROR,
            &ERR_INVALID_ARGUMENT_TYPE,
            &ERR_ODD_KEY_VALUE_COUNT,
            &ERR_CROSS_PACKAGE_ERROR,
        ];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                assert_eq!(i == j, a == b, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(ERR_TRAILING_KEY.to_string(), "trailing key without value");
        assert_eq!(format!("{:?}", FIRST), "Sentinel(\"same\")");
    }
}

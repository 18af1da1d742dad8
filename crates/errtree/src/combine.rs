//! Joining independent errors.

use crate::Error;
use crate::entry::Combined;

/// Join independent errors into one, in input order.
///
/// Absent entries are dropped. Returns `None` when nothing is left and the
/// single survivor itself when exactly one is left; otherwise a combined
/// error whose branches are the survivors. Nothing is deduplicated or
/// flattened.
pub fn combine<I, E>(errors: I) -> Option<Error>
where
    I: IntoIterator<Item = E>,
    E: Into<Option<Error>>,
{
    let mut children: Vec<Error> = errors.into_iter().filter_map(Into::into).collect();
    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(Error::from_combined(Combined::new(children))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel;

    sentinel!(ERR_A = "a");
    sentinel!(ERR_B = "b");

    #[test]
    fn drops_absent_and_keeps_order() {
        let a = Error::from(&ERR_A);
        let b = Error::from(&ERR_B);
        let joined = combine([None, Some(a.clone()), None, Some(b.clone())]).expect("joined");

        let branches = joined.branches();
        assert_eq!(branches.len(), 2);
        assert!(branches[0].ptr_eq(&a));
        assert!(branches[1].ptr_eq(&b));
        assert_eq!(joined.to_string(), "a\nb");
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        assert!(combine(Vec::<Option<Error>>::new()).is_none());
        assert!(combine([None::<Error>]).is_none());
        assert!(combine([None::<Error>, None]).is_none());
    }

    #[test]
    fn single_survivor_is_returned_as_is() {
        let a = Error::from(&ERR_A);
        let joined = combine([None, Some(a.clone())]).expect("joined");
        assert!(joined.ptr_eq(&a));
    }

    #[test]
    fn accepts_plain_errors() {
        let joined = combine(vec![Error::from(&ERR_A), Error::from(&ERR_A)]).expect("joined");
        assert_eq!(joined.branches().len(), 2);
        assert!(joined.is(&ERR_A));
        assert!(!joined.is(&ERR_B));
    }

    #[test]
    fn nested_combinations_are_not_flattened() {
        let inner = combine([Error::from(&ERR_A), Error::from(&ERR_B)]).expect("inner");
        let outer = combine([Some(inner.clone()), Some(Error::from(&ERR_A))]).expect("outer");
        assert_eq!(outer.branches().len(), 2);
        assert!(outer.branches()[0].ptr_eq(&inner));
        assert!(outer.is(&ERR_B));
    }
}

//! Reading metadata, children and typed values back out of an error.

use std::error::Error as StdError;

use crate::entry::{Branches, Entry};
use crate::{Error, Kv};

/// The first entry at the top of `err` or among its direct branches.
fn first_entry(err: &Error) -> Option<&Entry> {
    err.as_entry()
        .or_else(|| err.branches().iter().find_map(Error::as_entry))
}

/// Metadata of the first entry within one level of `err`, in insertion
/// order. Empty when there is none.
pub fn meta(err: &Error) -> Vec<Kv> {
    first_entry(err)
        .map(|entry| entry.metadata().to_vec())
        .unwrap_or_default()
}

/// Sentinels followed by the cause of the first entry within one level of
/// `err`. Empty when there is none.
pub fn children(err: &Error) -> Vec<Error> {
    first_entry(err)
        .map(|entry| entry.branches().to_vec())
        .unwrap_or_default()
}

/// First value of type `T` anywhere in `err`. See [`Error::find`].
pub fn find<T>(err: &Error) -> Option<&T>
where
    T: StdError + 'static,
{
    err.find::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arg, construct, enrich, sentinel};

    sentinel!(ERR_TEST = "test");

    #[test]
    fn meta_reads_top_level_entry() {
        let err = construct(vec![
            Arg::from(&ERR_TEST),
            Arg::from("a"),
            Arg::from(1),
            Arg::from("b"),
            Arg::from("two"),
        ]);
        let kvs = meta(&err);
        assert_eq!(kvs, vec![Kv::new("a", 1), Kv::new("b", "two")]);
    }

    #[test]
    fn meta_reads_first_entry_one_level_down() {
        let io = Error::external(std::io::Error::other("io"));
        let err = enrich(Some(&io), vec![Arg::from("k"), Arg::from(1)]);
        assert_eq!(meta(&err), vec![Kv::new("k", 1)]);
    }

    #[test]
    fn meta_of_non_entries_is_empty() {
        assert!(meta(&Error::from(&ERR_TEST)).is_empty());
        assert!(meta(&Error::external(std::io::Error::other("io"))).is_empty());
        assert!(children(&Error::from(&ERR_TEST)).is_empty());
    }

    #[test]
    fn children_lists_sentinels_then_cause() {
        let cause = Error::external(std::io::Error::other("cause"));
        let err = construct(vec![
            Arg::from(&ERR_TEST),
            Arg::from("k"),
            Arg::from(1),
            Arg::from(cause.clone()),
        ]);
        let kids = children(&err);
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].sentinel(), Some(&ERR_TEST));
        assert!(kids[1].ptr_eq(&cause));
    }
}

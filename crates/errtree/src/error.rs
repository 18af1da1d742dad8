//! The opaque error handle shared by every operation.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::engine::OriginId;
use crate::entry::{Branches, Combined, Entry, External};
use crate::Sentinel;

/// An immutable, cheaply clonable error value.
///
/// Every operation in the crate consumes and returns this handle. It may be
/// a sentinel, a structured entry, a combination of independent errors, or
/// an arbitrary external error; callers inspect it through [`Error::is`],
/// [`Error::contains`], [`Error::find`] and [`Error::branches`] rather than
/// through its concrete shape.
#[derive(Clone)]
pub struct Error {
    node: Arc<Node>,
}

pub(crate) enum Node {
    Sentinel(&'static Sentinel),
    Entry(Entry),
    Combined(Combined),
    External(External),
}

impl Error {
    /// Wrap an arbitrary error.
    ///
    /// Wrapping an [`Error`] returns the same handle instead of nesting it.
    pub fn external<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = Box::new(err);
        Self::from_boxed(boxed)
    }

    /// Wrap an already boxed error.
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        match err.downcast::<Error>() {
            Ok(handle) => *handle,
            Err(err) => Self::from_node(Node::External(External::new(err))),
        }
    }

    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn from_entry(entry: Entry) -> Self {
        Self::from_node(Node::Entry(entry))
    }

    pub(crate) fn from_combined(combined: Combined) -> Self {
        Self::from_node(Node::Combined(combined))
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn as_entry(&self) -> Option<&Entry> {
        match self.node() {
            Node::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    /// The sentinel this handle stands for, if it is a bare sentinel.
    pub fn sentinel(&self) -> Option<&'static Sentinel> {
        match self.node() {
            Node::Sentinel(sentinel) => Some(*sentinel),
            _ => None,
        }
    }

    /// Origin of the top-level entry, if this handle is an entry.
    pub fn origin(&self) -> Option<OriginId> {
        self.as_entry().map(Entry::origin)
    }

    /// Ordered direct children: sentinels then cause for an entry, the joined
    /// values for a combined error, nothing for leaves.
    pub fn branches(&self) -> &[Error] {
        match self.node() {
            Node::Sentinel(_) => &[],
            Node::Entry(entry) => entry.branches(),
            Node::Combined(combined) => combined.branches(),
            Node::External(external) => external.branches(),
        }
    }

    /// Whether two handles share the same underlying value.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Whether `sentinel` appears anywhere in this error tree.
    pub fn is(&self, sentinel: &Sentinel) -> bool {
        self.search(&mut |err| {
            err.downcast_ref::<Sentinel>()
                .is_some_and(|found| std::ptr::eq(found, sentinel))
                .then_some(())
        })
        .is_some()
    }

    /// Whether `target` appears anywhere in this error tree.
    ///
    /// Sentinel targets match by sentinel identity, everything else by
    /// handle identity.
    pub fn contains(&self, target: &Error) -> bool {
        if let Some(sentinel) = target.sentinel() {
            return self.is(sentinel);
        }
        self.search(&mut |err| {
            err.downcast_ref::<Error>()
                .is_some_and(|found| found.ptr_eq(target))
                .then_some(())
        })
        .is_some()
    }

    /// First value of type `T` in a depth-first walk of the whole tree,
    /// including the `source()` chains of external errors.
    pub fn find<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.search(&mut |err| err.downcast_ref::<T>())
    }

    /// Pre-order walk. Every node is offered to `probe` as itself; sentinel
    /// nodes are also offered as the `Sentinel`, external nodes as each link
    /// of their `source()` chain.
    fn search<'a, R>(
        &'a self,
        probe: &mut impl FnMut(&'a (dyn StdError + 'static)) -> Option<R>,
    ) -> Option<R> {
        if let Some(found) = probe(self) {
            return Some(found);
        }

        match self.node() {
            Node::Sentinel(sentinel) => probe(*sentinel),
            Node::Entry(_) | Node::Combined(_) => {
                for child in self.branches() {
                    if let Some(found) = child.search(&mut *probe) {
                        return Some(found);
                    }
                }
                None
            }
            Node::External(external) => {
                let mut current = Some(external.as_dyn());
                while let Some(err) = current {
                    if let Some(handle) = err.downcast_ref::<Error>() {
                        return handle.search(&mut *probe);
                    }
                    if let Some(found) = probe(err) {
                        return Some(found);
                    }
                    current = err.source();
                }
                None
            }
        }
    }
}

impl From<&'static Sentinel> for Error {
    fn from(sentinel: &'static Sentinel) -> Self {
        Self::from_node(Node::Sentinel(sentinel))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Sentinel(sentinel) => write!(f, "{sentinel}"),
            Node::Entry(entry) => write!(f, "{entry}"),
            Node::Combined(combined) => write!(f, "{combined}"),
            Node::External(external) => write!(f, "{}", external.as_dyn()),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug_tree(f, 0)
    }
}

impl Error {
    fn debug_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "    ".repeat(depth);
        match self.node() {
            Node::Sentinel(sentinel) => writeln!(f, "{pad}Sentinel: {sentinel}"),
            Node::External(external) => writeln!(f, "{pad}External: {:?}", external.as_dyn()),
            Node::Combined(combined) => {
                writeln!(f, "{pad}Combined")?;
                for child in combined.branches() {
                    child.debug_tree(f, depth + 1)?;
                }
                Ok(())
            }
            Node::Entry(entry) => {
                writeln!(f, "{pad}Entry ({})", entry.origin())?;
                for sentinel in entry.sentinels() {
                    sentinel.debug_tree(f, depth + 1)?;
                }
                if !entry.metadata().is_empty() {
                    writeln!(f, "{pad}    Metadata:")?;
                    for kv in entry.metadata() {
                        writeln!(f, "{pad}        {}: {:?}", kv.key(), kv.value())?;
                    }
                }
                if let Some(cause) = entry.cause() {
                    writeln!(f, "{pad}    Cause:")?;
                    cause.debug_tree(f, depth + 2)?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.node() {
            Node::Entry(entry) => entry.cause().map(|cause| cause as &(dyn StdError + 'static)),
            Node::Combined(combined) => combined
                .branches()
                .last()
                .map(|child| child as &(dyn StdError + 'static)),
            Node::External(external) => external.as_dyn().source(),
            Node::Sentinel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel;

    sentinel!(ERR_TEST = "test");
    sentinel!(ERR_OTHER = "other");

    #[derive(Debug)]
    struct Wrapper {
        inner: std::io::Error,
    }

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.inner)
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn sentinel_handle_matches_itself_only() {
        let err = Error::from(&ERR_TEST);
        assert!(err.is(&ERR_TEST));
        assert!(!err.is(&ERR_OTHER));
        assert_eq!(err.sentinel(), Some(&ERR_TEST));
        assert!(err.branches().is_empty());
        assert_eq!(err.to_string(), "test");
    }

    #[test]
    fn external_wraps_and_unwraps() {
        let err = Error::external(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "disk full");
        assert!(err.find::<std::io::Error>().is_some());
        assert!(err.sentinel().is_none());

        let again = Error::external(err.clone());
        assert!(again.ptr_eq(&err));
    }

    #[test]
    fn find_follows_external_source_chain() {
        let err = Error::external(Wrapper {
            inner: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        let io = err.find::<std::io::Error>().expect("io error in chain");
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
        assert!(err.find::<std::fmt::Error>().is_none());
    }

    #[test]
    fn contains_uses_handle_identity() {
        let a = Error::external(std::io::Error::other("same"));
        let b = Error::external(std::io::Error::other("same"));
        assert!(a.contains(&a.clone()));
        assert!(!a.contains(&b));
        assert!(Error::from(&ERR_TEST).contains(&Error::from(&ERR_TEST)));
    }

    #[test]
    fn combined_source_is_last_child() {
        let last = Error::external(std::io::Error::other("last"));
        let joined = Error::from_combined(Combined::new(vec![Error::from(&ERR_TEST), last]));
        assert_eq!(joined.source().map(|s| s.to_string()), Some("last".to_string()));
        assert!(Error::from(&ERR_TEST).source().is_none());
    }
}

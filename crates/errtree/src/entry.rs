//! Structural nodes behind [`Error`]: entries and combined values.

use std::fmt;

use crate::engine::OriginId;
use crate::{Error, Kv};

const ENTRY_SEPARATOR: &str = "; ";
const COMBINED_SEPARATOR: &str = "\n";

/// Capability of exposing ordered direct children.
///
/// This is the single traversal contract every search in the crate is built
/// on. Leaves report an empty slice.
pub(crate) trait Branches {
    fn branches(&self) -> &[Error];
}

/// The node produced by one construction or enrichment call.
///
/// `children` holds the sentinels followed by the optional cause. Nothing
/// here is mutated after construction; enrichment goes through
/// [`Entry::with_metadata`], which allocates fresh lists.
pub(crate) struct Entry {
    children: Vec<Error>,
    has_cause: bool,
    metadata: Vec<Kv>,
    origin: OriginId,
}

impl Entry {
    pub(crate) fn new(
        sentinels: Vec<Error>,
        metadata: Vec<Kv>,
        cause: Option<Error>,
        origin: OriginId,
    ) -> Self {
        let has_cause = cause.is_some();
        let mut children = sentinels;
        children.extend(cause);
        Self {
            children,
            has_cause,
            metadata,
            origin,
        }
    }

    /// A metadata-only node with no sentinels and no cause.
    pub(crate) fn bare(metadata: Vec<Kv>, origin: OriginId) -> Self {
        Self::new(Vec::new(), metadata, None, origin)
    }

    pub(crate) fn sentinels(&self) -> &[Error] {
        let end = self.children.len() - usize::from(self.has_cause);
        &self.children[..end]
    }

    pub(crate) fn cause(&self) -> Option<&Error> {
        if self.has_cause {
            self.children.last()
        } else {
            None
        }
    }

    pub(crate) fn metadata(&self) -> &[Kv] {
        &self.metadata
    }

    pub(crate) fn origin(&self) -> OriginId {
        self.origin
    }

    /// Copy of this entry with `extra` appended after the existing metadata.
    pub(crate) fn with_metadata(&self, extra: Vec<Kv>) -> Self {
        let mut metadata = Vec::with_capacity(self.metadata.len() + extra.len());
        metadata.extend_from_slice(&self.metadata);
        metadata.extend(extra);
        Self {
            children: self.children.clone(),
            has_cause: self.has_cause,
            metadata,
            origin: self.origin,
        }
    }
}

impl Branches for Entry {
    fn branches(&self) -> &[Error] {
        &self.children
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str(ENTRY_SEPARATOR)
            }
        };

        for sentinel in self.sentinels() {
            sep(f)?;
            write!(f, "{sentinel}")?;
        }
        for kv in &self.metadata {
            sep(f)?;
            write!(f, "{kv}")?;
        }
        if let Some(cause) = self.cause() {
            sep(f)?;
            write!(f, "{cause}")?;
        }
        Ok(())
    }
}

/// A composite of independent error values, with no metadata of its own.
pub(crate) struct Combined {
    children: Vec<Error>,
}

impl Combined {
    pub(crate) fn new(children: Vec<Error>) -> Self {
        Self { children }
    }
}

impl Branches for Combined {
    fn branches(&self) -> &[Error] {
        &self.children
    }
}

impl fmt::Display for Combined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(COMBINED_SEPARATOR)?;
            }
            write!(f, "{child}")?;
        }
        Ok(())
    }
}

/// An arbitrary error from outside the crate. Its own `source()` chain is
/// followed by deep searches, but it exposes no branches.
pub(crate) struct External {
    inner: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl External {
    pub(crate) fn new(inner: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self { inner }
    }

    pub(crate) fn as_dyn(&self) -> &(dyn std::error::Error + 'static) {
        self.inner.as_ref()
    }
}

impl Branches for External {
    fn branches(&self) -> &[Error] {
        &[]
    }
}

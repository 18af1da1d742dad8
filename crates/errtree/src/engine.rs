//! The construction and enrichment engine.
//!
//! An [`Engine`] stamps every entry it builds with its [`OriginId`]. The
//! process-wide engine behind the free functions is created once, on first
//! use, and its origin never changes afterwards. A separately constructed
//! engine stands for a separately compiled copy of this crate: enriching one
//! engine's entries with another engine is detected and flagged with
//! [`ERR_CROSS_PACKAGE_ERROR`].

use std::fmt;
use std::sync::LazyLock;

use uuid::Uuid;

use crate::entry::{Branches, Combined, Entry};
use crate::error::Node;
use crate::parse::{Grammar, Parsed, Plan, Violation, parse};
use crate::sentinel::ERR_CROSS_PACKAGE_ERROR;
use crate::{Arg, Error, Kv};

static GLOBAL: LazyLock<Engine> = LazyLock::new(Engine::new);

/// Identity of one engine copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginId(Uuid);

impl OriginId {
    /// A fresh random origin.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Use an existing uuid as the origin.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Options for building an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineOption {
    /// Pin the origin instead of generating one.
    pub origin: Option<OriginId>,
    /// Label reported in tracing output.
    pub name: Option<&'static str>,
}

impl EngineOption {
    /// Options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the origin
    pub fn with_origin(mut self, origin: OriginId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set the tracing label
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }
}

/// Builds and enriches error entries on behalf of one origin.
#[derive(Debug)]
pub struct Engine {
    origin: OriginId,
    name: &'static str,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with a freshly generated origin.
    pub fn new() -> Self {
        Self::with_option(EngineOption::default())
    }

    /// An engine built from `option`; unset fields get a fresh origin and the
    /// `errtree` label.
    pub fn with_option(option: EngineOption) -> Self {
        Self {
            origin: option.origin.unwrap_or_else(OriginId::generate),
            name: option.name.unwrap_or("errtree"),
        }
    }

    /// The process-wide engine used by the free functions.
    pub fn global() -> &'static Engine {
        &GLOBAL
    }

    /// Get the engine origin
    pub fn origin(&self) -> OriginId {
        self.origin
    }

    /// Get the engine label
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `err` is an entry built by this engine.
    pub fn owns(&self, err: &Error) -> bool {
        err.origin() == Some(self.origin)
    }

    /// Build an entry from `sentinels..., key, value, ..., cause?`.
    ///
    /// A malformed argument list still yields an entry: it carries the
    /// matching validation sentinel first, then the caller's sentinels,
    /// the well-formed metadata, diagnostics and the cause if one was found.
    #[tracing::instrument(skip_all, fields(engine = self.name))]
    pub fn construct(&self, args: Vec<Arg>) -> Error {
        let Parsed { plan, violation } = parse(args, Grammar::Construct);
        match violation {
            None => Error::from_entry(Entry::new(
                plan.sentinels,
                plan.metadata,
                plan.cause,
                self.origin,
            )),
            Some(violation) => self.reject(plan, violation),
        }
    }

    /// Add `key, value, ...` pairs to the most recent entry of this engine
    /// reachable from the top of `prior`, or to a new bare entry.
    ///
    /// Enrichment never adds a sentinel or adopts a cause. An error passed in
    /// `args` is rejected with a misplaced-error entry that keeps it as its
    /// cause; that entry is joined next to the enriched value.
    #[tracing::instrument(skip_all, fields(engine = self.name))]
    pub fn enrich(&self, prior: Option<&Error>, args: Vec<Arg>) -> Error {
        let Parsed { plan, violation } = parse(args, Grammar::Enrich);
        let Plan {
            metadata, cause, ..
        } = plan;

        let rejected = violation.map(|violation| {
            let misplaced = Plan {
                cause: cause.map(|err| self.guard(err)),
                ..Plan::default()
            };
            self.reject(misplaced, violation)
        });

        let enriched = match prior {
            Some(prior) if metadata.is_empty() => Some(prior.clone()),
            Some(prior) => Some(self.merge(prior, metadata)),
            None if metadata.is_empty() && rejected.is_some() => None,
            None => Some(Error::from_entry(Entry::bare(metadata, self.origin))),
        };

        match (enriched, rejected) {
            (Some(enriched), Some(rejected)) => append(&enriched, rejected),
            (Some(enriched), None) => enriched,
            (None, Some(rejected)) => rejected,
            (None, None) => Error::from_entry(Entry::bare(Vec::new(), self.origin)),
        }
    }

    fn reject(&self, plan: Plan, violation: Violation) -> Error {
        tracing::debug!(
            kind = %violation.kind(),
            position = violation.position(),
            "argument list rejected"
        );

        let mut sentinels = Vec::with_capacity(plan.sentinels.len() + 1);
        sentinels.push(Error::from(violation.kind().sentinel()));
        sentinels.extend(plan.sentinels);

        let mut metadata = plan.metadata;
        metadata.extend(violation.into_details());

        Error::from_entry(Entry::new(sentinels, metadata, plan.cause, self.origin))
    }

    /// One-level merge of `metadata` into `prior`.
    fn merge(&self, prior: &Error, metadata: Vec<Kv>) -> Error {
        match prior.node() {
            Node::Entry(entry) if entry.origin() == self.origin => {
                tracing::trace!("merging into top-level entry");
                Error::from_entry(entry.with_metadata(metadata))
            }
            Node::Entry(entry) => self.cross_origin(prior, entry.origin(), metadata),
            Node::Combined(combined) => {
                let children = combined.branches();
                let target = children
                    .iter()
                    .enumerate()
                    .rev()
                    .find_map(|(index, child)| child.as_entry().map(|entry| (index, entry)));

                match target {
                    Some((index, entry)) if entry.origin() == self.origin => {
                        tracing::trace!("merging into combined child {}", index);
                        let mut children = children.to_vec();
                        children[index] = Error::from_entry(entry.with_metadata(metadata));
                        Error::from_combined(Combined::new(children))
                    }
                    Some((_, entry)) => self.cross_origin(prior, entry.origin(), metadata),
                    None => append(prior, self.bare(metadata)),
                }
            }
            Node::Sentinel(_) | Node::External(_) => append(prior, self.bare(metadata)),
        }
    }

    /// Flag a foreign value and join the new metadata beside it.
    fn cross_origin(&self, foreign: &Error, foreign_origin: OriginId, metadata: Vec<Kv>) -> Error {
        let flagged = self.flag(foreign.clone(), foreign_origin);
        Error::from_combined(Combined::new(vec![flagged, self.bare(metadata)]))
    }

    /// Flag `err` if it is an entry from another engine.
    fn guard(&self, err: Error) -> Error {
        match err.origin() {
            Some(origin) if origin != self.origin => self.flag(err, origin),
            _ => err,
        }
    }

    fn flag(&self, foreign: Error, foreign_origin: OriginId) -> Error {
        tracing::debug!(
            origin_id = %foreign_origin,
            expected_id = %self.origin,
            "entry from a different engine copy"
        );
        Error::from_entry(Entry::new(
            vec![Error::from(&ERR_CROSS_PACKAGE_ERROR)],
            vec![
                Kv::new("origin_id", foreign_origin.to_string()),
                Kv::new("expected_id", self.origin.to_string()),
            ],
            Some(foreign),
            self.origin,
        ))
    }

    fn bare(&self, metadata: Vec<Kv>) -> Error {
        Error::from_entry(Entry::bare(metadata, self.origin))
    }
}

/// Add `node` as the last element of `base`, flattening one combined level.
fn append(base: &Error, node: Error) -> Error {
    let mut children = match base.node() {
        Node::Combined(combined) => combined.branches().to_vec(),
        _ => vec![base.clone()],
    };
    children.push(node);
    Error::from_combined(Combined::new(children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ERR_MISPLACED_ERROR, meta, sentinel};

    sentinel!(ERR_TEST = "test");

    #[test]
    fn pinned_origin_is_kept() {
        let origin = OriginId::generate();
        let engine = Engine::with_option(EngineOption::new().with_origin(origin).with_name("pinned"));
        assert_eq!(engine.origin(), origin);
        assert_eq!(engine.name(), "pinned");
        assert!(engine.owns(&engine.construct(vec![Arg::from(&ERR_TEST)])));
    }

    #[test]
    fn separate_engines_have_separate_origins() {
        assert_ne!(Engine::new().origin(), Engine::new().origin());
        assert_eq!(Engine::global().origin(), Engine::global().origin());
    }

    #[test]
    fn origin_display_is_hyphenated_uuid() {
        let uuid = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(
            OriginId::from_uuid(uuid).to_string(),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
    }

    #[test]
    fn merge_targets_rightmost_entry_of_combined() {
        let engine = Engine::new();
        let left = engine.construct(vec![Arg::from(&ERR_TEST), Arg::from("side"), Arg::from("left")]);
        let right = engine.construct(vec![Arg::from(&ERR_TEST), Arg::from("side"), Arg::from("right")]);
        let io = Error::external(std::io::Error::other("io"));
        let joined = Error::from_combined(Combined::new(vec![left.clone(), right, io]));

        let enriched = engine.enrich(Some(&joined), vec![Arg::from("extra"), Arg::from(1)]);
        let branches = enriched.branches();
        assert_eq!(branches.len(), 3);
        assert!(branches[0].ptr_eq(&left));

        let kvs = meta(&branches[1]);
        assert_eq!(kvs.len(), 2);
        assert_eq!(kvs[0].value().as_str(), Some("right"));
        assert_eq!(kvs[1].key(), "extra");

        let untouched = meta(&joined.branches()[1]);
        assert_eq!(untouched.len(), 1);
        assert_eq!(untouched[0].value().as_str(), Some("right"));
        assert_eq!(joined.branches().len(), 3);
    }

    #[test]
    fn merge_never_descends_past_one_level() {
        let engine = Engine::new();
        let inner = engine.construct(vec![Arg::from(&ERR_TEST), Arg::from("depth"), Arg::from(2)]);
        let outer = Error::from_combined(Combined::new(vec![
            Error::from_combined(Combined::new(vec![inner.clone(), Error::from(&ERR_TEST)])),
            Error::from(&ERR_TEST),
        ]));

        let enriched = engine.enrich(Some(&outer), vec![Arg::from("k"), Arg::from(1)]);
        let branches = enriched.branches();
        assert_eq!(branches.len(), 3, "bare node appended at the top level");
        assert!(branches[0].branches()[0].ptr_eq(&inner));
        assert_eq!(meta(&branches[2])[0].key(), "k");
    }

    #[test]
    fn misplaced_cause_is_flagged_when_foreign() {
        let ours = Engine::new();
        let theirs = Engine::new();
        let foreign = theirs.construct(vec![Arg::from(&ERR_TEST)]);

        let result = ours.enrich(None, vec![Arg::from("k"), Arg::from(1), Arg::from(&foreign)]);
        assert!(result.is(&ERR_MISPLACED_ERROR));
        assert!(result.is(&ERR_CROSS_PACKAGE_ERROR));
        assert!(result.contains(&foreign));
    }
}

//! Argument-list grammar.
//!
//! Parsing happens in two passes over a single grammar:
//!
//! 1. [`classify`] tags every argument greedily, left to right, as a
//!    [`Tag::Sentinel`], [`Tag::Key`], [`Tag::Value`], [`Tag::Cause`] or
//!    [`Tag::Stray`] (something sitting at a key position that cannot be a
//!    key).
//! 2. [`validate`] checks the tag sequence against
//!    `Sentinel* (Key Value)* Cause?` and reports the first violation.
//!
//! Violations are checked in this order: a missing sentinel, then each tag
//! left to right. A stray is reported by its type (misplaced error or
//! invalid argument type) before any arity problem, so a dangling non-string
//! value is an `InvalidArgumentType`, a dangling string is a `TrailingKey`,
//! and `OddKeyValueCount` covers any other sequence that cannot be paired.

use crate::kind::ViolationKind;
use crate::{Arg, Error, Kv, Value};

/// Which variant of the grammar applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    /// At least one leading sentinel, optional trailing cause.
    Construct,
    /// Pairs only; no sentinels and no cause.
    Enrich,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Sentinel,
    Key,
    Value,
    Cause,
    Stray,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    tag: Tag,
    arg: Arg,
}

impl Token {
    pub(crate) fn new(tag: Tag, arg: Arg) -> Self {
        Self { tag, arg }
    }
}

/// A rejected argument list.
#[derive(Debug, Clone)]
pub(crate) struct Violation {
    kind: ViolationKind,
    position: usize,
    details: Vec<Kv>,
}

impl Violation {
    fn new(kind: ViolationKind, position: usize) -> Self {
        Self {
            kind,
            position,
            details: Vec::new(),
        }
    }

    fn with_detail(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.details.push(Kv::new(key, value));
        self
    }

    pub(crate) fn kind(&self) -> ViolationKind {
        self.kind
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Diagnostic metadata: the kind-specific details followed by `position`.
    pub(crate) fn into_details(self) -> Vec<Kv> {
        let mut details = self.details;
        details.push(Kv::new("position", self.position));
        details
    }
}

/// Everything recoverable from an argument list, valid or not.
#[derive(Debug, Default)]
pub(crate) struct Plan {
    pub(crate) sentinels: Vec<Error>,
    pub(crate) metadata: Vec<Kv>,
    pub(crate) cause: Option<Error>,
}

pub(crate) struct Parsed {
    pub(crate) plan: Plan,
    pub(crate) violation: Option<Violation>,
}

/// Tag every argument. Never fails; all judgement is left to [`validate`].
pub(crate) fn classify(args: Vec<Arg>, grammar: Grammar) -> Vec<Token> {
    let len = args.len();
    let mut tokens = Vec::with_capacity(len);
    let mut args = args.into_iter().peekable();

    if grammar == Grammar::Construct {
        while let Some(arg) = args.next_if(|arg| arg.value().is_error()) {
            tokens.push(Token::new(Tag::Sentinel, arg));
        }
    }

    while let Some(arg) = args.next() {
        let position = tokens.len();
        let tag = match arg.value() {
            Value::Str(_) => Tag::Key,
            Value::Error(_) if position + 1 == len => Tag::Cause,
            _ => Tag::Stray,
        };
        tokens.push(Token::new(tag, arg));
        if tag == Tag::Key
            && let Some(value) = args.next()
        {
            tokens.push(Token::new(Tag::Value, value));
        }
    }

    tracing::trace!(
        "classified {} arguments: {:?}",
        tokens.len(),
        tokens.iter().map(|t| t.tag).collect::<Vec<_>>()
    );
    tokens
}

/// Check a tag sequence against the grammar.
pub(crate) fn validate(tokens: &[Token], grammar: Grammar) -> Result<(), Violation> {
    let has_sentinel = tokens.first().is_some_and(|t| t.tag == Tag::Sentinel);
    if grammar == Grammar::Construct && !has_sentinel {
        return Err(Violation::new(ViolationKind::MissingSentinel, 0));
    }

    let mut previous: Option<Tag> = None;
    for (position, token) in tokens.iter().enumerate() {
        let is_last = position + 1 == tokens.len();
        match token.tag {
            Tag::Stray if token.arg.value().is_error() => {
                return Err(
                    Violation::new(ViolationKind::MisplacedError, position)
                        .with_detail("error", token.arg.value().clone()),
                );
            }
            Tag::Stray => {
                return Err(
                    Violation::new(ViolationKind::InvalidArgumentType, position)
                        .with_detail("type", token.arg.type_name())
                        .with_detail("value", token.arg.value().clone()),
                );
            }
            Tag::Sentinel if grammar == Grammar::Enrich => {
                return Err(Violation::new(ViolationKind::MisplacedError, position));
            }
            Tag::Sentinel if !matches!(previous, None | Some(Tag::Sentinel)) => {
                return Err(Violation::new(ViolationKind::OddKeyValueCount, position));
            }
            Tag::Key if is_last => {
                return Err(Violation::new(ViolationKind::TrailingKey, position)
                    .with_detail("key", token.arg.value().clone()));
            }
            Tag::Key if previous == Some(Tag::Key) => {
                return Err(Violation::new(ViolationKind::OddKeyValueCount, position));
            }
            Tag::Value if previous != Some(Tag::Key) => {
                return Err(Violation::new(ViolationKind::OddKeyValueCount, position));
            }
            Tag::Cause if grammar == Grammar::Enrich => {
                return Err(Violation::new(ViolationKind::MisplacedError, position));
            }
            Tag::Cause if !is_last || previous == Some(Tag::Key) => {
                return Err(Violation::new(ViolationKind::OddKeyValueCount, position));
            }
            _ => {}
        }
        previous = Some(token.tag);
    }

    Ok(())
}

/// Collect every well-formed part of the token sequence.
///
/// Sentinels, complete pairs and the cause are kept even when the sequence
/// is invalid, so a rejected list still reports what it could.
fn assemble(tokens: Vec<Token>) -> Plan {
    let mut plan = Plan::default();
    let mut pending_key: Option<String> = None;

    for token in tokens {
        match (token.tag, token.arg.into_value()) {
            (Tag::Sentinel, Value::Error(err)) => plan.sentinels.push(err),
            (Tag::Key, Value::Str(key)) => pending_key = Some(key),
            (Tag::Value, value) => {
                if let Some(key) = pending_key.take() {
                    plan.metadata.push(Kv::new(key, value));
                }
            }
            (Tag::Cause, Value::Error(err)) => plan.cause = Some(err),
            _ => pending_key = None,
        }
    }
    plan
}

/// Classify, validate and assemble an argument list.
pub(crate) fn parse(args: Vec<Arg>, grammar: Grammar) -> Parsed {
    let tokens = classify(args, grammar);
    let violation = validate(&tokens, grammar).err();
    Parsed {
        plan: assemble(tokens),
        violation,
    }
}

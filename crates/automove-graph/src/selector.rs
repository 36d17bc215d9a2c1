// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A small structural selector language over node records.
//!
//! ```text
//! selector := compound ( "," compound )*
//! compound := ( "node" | "*" )? simple*        (at least one part)
//! simple   := "#" ident | "." ident | "[" ident ( "=" value )? "]"
//! value    := '"' any-but-quote* '"' | bare
//! ```
//!
//! There are no combinators: a selector tests a single node.
use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{
    alt, cut_err, delimited, opt, peek, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ModalResult, ParseError};
use winnow::token::{one_of, take_till, take_while};
use winnow::Parser;

use crate::record::NodeRecord;

/// Why a selector failed to parse. Offsets are byte positions in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing to parse where a compound selector was expected.
    #[error("empty selector at offset {at}")]
    Empty {
        /// Byte offset.
        at: usize,
    },
    /// A type other than `node` or `*`.
    #[error("unsupported element type `{name}`")]
    UnknownType {
        /// The type name found.
        name: String,
    },
    /// A name was required after `#`, `.` or `[`.
    #[error("expected a name at offset {at}")]
    ExpectedName {
        /// Byte offset.
        at: usize,
    },
    /// A character that does not fit the grammar.
    #[error("unexpected `{found}` at offset {at}")]
    Unexpected {
        /// Byte offset.
        at: usize,
        /// The offending character.
        found: char,
    },
    /// Input ended inside an attribute test or quoted value.
    #[error("unterminated attribute test")]
    Unterminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    key: String,
    value: Option<String>,
}

enum Part {
    Id(String),
    Class(String),
    Attr(AttrTest),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn with(mut self, part: Part) -> Self {
        match part {
            Part::Id(id) => self.id = Some(id),
            Part::Class(class) => self.classes.push(class),
            Part::Attr(attr) => self.attrs.push(attr),
        }
        self
    }

    fn matches(&self, node: &NodeRecord) -> bool {
        self.id.as_deref().is_none_or(|id| node.key() == id)
            && self.classes.iter().all(|c| node.has_class(c))
            && self.attrs.iter().all(|a| match (&a.value, node.data(&a.key)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(want), Some(have)) => want == have,
            })
    }
}

/// A parsed selector: a node matches if any comma group matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Compound>,
}

impl Selector {
    /// Parses `text`.
    ///
    /// # Errors
    /// Returns [`SelectorError`] describing the first problem found.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        groups
            .parse(text)
            .map(|groups| Self { groups })
            .map_err(|err| diagnose(text, &err))
    }

    /// Returns `true` if `node` satisfies any group.
    pub fn matches(&self, node: &NodeRecord) -> bool {
        self.groups.iter().any(|g| g.matches(node))
    }
}

impl core::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Compound,
    Type,
    Name,
    Close,
}

type PResult<O> = ModalResult<O, ContextError<Expect>>;

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn diagnose(text: &str, err: &ParseError<&str, ContextError<Expect>>) -> SelectorError {
    let at = err.offset();
    let rest = text.get(at..).unwrap_or_default();
    match err.inner().context().next() {
        Some(Expect::Compound) => SelectorError::Empty { at },
        Some(Expect::Type) => SelectorError::UnknownType {
            name: rest.chars().take_while(|&c| is_name_char(c)).collect(),
        },
        Some(Expect::Name) => SelectorError::ExpectedName { at },
        Some(Expect::Close) | None => match rest.chars().next() {
            Some(found) => SelectorError::Unexpected { at, found },
            None => SelectorError::Unterminated,
        },
    }
}

fn groups(input: &mut &str) -> PResult<Vec<Compound>> {
    separated(1.., delimited(multispace0, compound, multispace0), ',').parse_next(input)
}

fn compound(input: &mut &str) -> PResult<Compound> {
    cut_err(peek(one_of(|c: char| {
        matches!(c, '*' | '#' | '.' | '[') || c.is_ascii_alphabetic()
    })))
    .context(Expect::Compound)
    .parse_next(input)?;
    opt(element_type).parse_next(input)?;
    let parts: Vec<Part> = repeat(0.., part).parse_next(input)?;
    Ok(parts.into_iter().fold(Compound::default(), Compound::with))
}

/// `*` or `node`; any other leading name is rejected outright.
fn element_type(input: &mut &str) -> PResult<()> {
    alt((
        '*'.void(),
        preceded(
            peek(one_of(|c: char| c.is_ascii_alphabetic())),
            cut_err(
                take_while(1.., is_name_char)
                    .verify(|name: &str| name == "node")
                    .context(Expect::Type),
            ),
        )
        .void(),
    ))
    .parse_next(input)
}

fn part(input: &mut &str) -> PResult<Part> {
    alt((
        preceded('#', cut_err(name)).map(Part::Id),
        preceded('.', cut_err(name)).map(Part::Class),
        preceded('[', cut_err(attr)).map(Part::Attr),
    ))
    .parse_next(input)
}

fn name(input: &mut &str) -> PResult<String> {
    take_while(1.., is_name_char)
        .map(String::from)
        .context(Expect::Name)
        .parse_next(input)
}

fn attr(input: &mut &str) -> PResult<AttrTest> {
    let key = delimited(multispace0, name, multispace0).parse_next(input)?;
    let value = opt(preceded(('=', multispace0), cut_err(value))).parse_next(input)?;
    (multispace0, ']').context(Expect::Close).parse_next(input)?;
    Ok(AttrTest { key, value })
}

fn value(input: &mut &str) -> PResult<String> {
    alt((
        preceded(
            '"',
            cut_err(terminated(take_till(0.., '"'), '"'.context(Expect::Close))),
        ),
        take_while(1.., |c: char| !c.is_whitespace() && c != ']' && c != '"')
            .context(Expect::Name),
    ))
    .map(String::from)
    .parse_next(input)
}

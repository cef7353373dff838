//! The reader hierarchy.
//!
//! Each reader handles one grammar construct. The facade keeps the active
//! readers on a stack and calls the top one; a reader answers with a
//! [`Transition`] instead of recursing into its children, so every reader
//! can be resumed after a child finishes and closed early through
//! [`Reader::handle_reader_interrupt`] when the input ends.

mod anchor;
mod block_scalar;
mod comment;
mod directive;
mod document;
mod explicit_key;
mod flow_map;
mod flow_sequence;
mod indent;
mod map;
mod node;
mod plain;
mod quoted;
mod sequence;
mod tag;

use alloc::string::String;

use crate::state::ReaderState;
use crate::{Result, Token};

pub(crate) use self::document::DocumentReader;
use self::explicit_key::ExplicitMapKeyReader;
use self::flow_map::FlowMapReader;
use self::flow_sequence::FlowSequenceReader;
use self::map::MapItemsReader;
use self::node::LineReader;
use self::sequence::SequenceItemsReader;

pub(crate) enum Reader {
    Document(DocumentReader),
    Line(LineReader),
    SequenceItems(SequenceItemsReader),
    MapItems(MapItemsReader),
    ExplicitMapKey(ExplicitMapKeyReader),
    FlowSequence(FlowSequenceReader),
    FlowMap(FlowMapReader),
}

/// What the facade does after calling a reader.
pub(crate) enum Transition {
    /// Call the same reader again.
    Continue,
    /// Push a child reader and run it until it is done.
    Child(Reader),
    /// Swap this reader for one that finishes the same node.
    Replace(Reader),
    /// Pop this reader and report to its parent.
    Done(ChildOutcome),
}

/// What a finished reader tells its parent.
#[derive(Debug)]
pub(crate) enum ChildOutcome {
    /// A complete node was emitted.
    Node,
    /// A mapping key was emitted and its `:` consumed.
    Key(KeyName),
    /// A `?` key was emitted; its `:` has not been looked for yet.
    ExplicitKey(KeyName),
}

/// A mapping key, as far as duplicate detection is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum KeyName {
    Simple(Option<String>),
    Merge,
    Complex,
}

impl KeyName {
    /// The token naming a field with this key; `None` for complex keys,
    /// which are bracketed by their own tokens.
    pub(crate) fn field_token(&self) -> Option<Token> {
        match self {
            KeyName::Simple(name) => Some(Token::FieldName(name.clone())),
            KeyName::Merge => Some(Token::MergeFieldName),
            KeyName::Complex => None,
        }
    }
}

impl Reader {
    pub(crate) fn document() -> Self {
        Reader::Document(DocumentReader::new())
    }

    /// Whether this reader stands for an open collection.
    pub(crate) fn is_collection(&self) -> bool {
        matches!(
            self,
            Reader::SequenceItems(_)
                | Reader::MapItems(_)
                | Reader::FlowSequence(_)
                | Reader::FlowMap(_)
        )
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Reader::Document(_) => "document",
            Reader::Line(_) => "line",
            Reader::SequenceItems(_) => "sequence items",
            Reader::MapItems(_) => "map items",
            Reader::ExplicitMapKey(_) => "explicit map key",
            Reader::FlowSequence(_) => "flow sequence",
            Reader::FlowMap(_) => "flow map",
        }
    }

    /// Consume input until this reader emits a token, needs a child, or is
    /// done. Only called while input remains.
    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self {
            Reader::Document(reader) => reader.read_until_token(state),
            Reader::Line(reader) => reader.read_until_token(state),
            Reader::SequenceItems(reader) => reader.read_until_token(state),
            Reader::MapItems(reader) => reader.read_until_token(state),
            Reader::ExplicitMapKey(reader) => reader.read_until_token(state),
            Reader::FlowSequence(reader) => reader.read_until_token(state),
            Reader::FlowMap(reader) => reader.read_until_token(state),
        }
    }

    /// Close whatever this reader has open because the input ended.
    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        match self {
            Reader::Document(reader) => reader.handle_reader_interrupt(state),
            Reader::Line(reader) => reader.handle_reader_interrupt(state),
            Reader::SequenceItems(reader) => reader.handle_reader_interrupt(state),
            Reader::MapItems(reader) => reader.handle_reader_interrupt(state),
            Reader::ExplicitMapKey(reader) => reader.handle_reader_interrupt(state),
            Reader::FlowSequence(reader) => reader.handle_reader_interrupt(state),
            Reader::FlowMap(reader) => reader.handle_reader_interrupt(state),
        }
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        state: &mut ReaderState<'_>,
        outcome: ChildOutcome,
    ) -> Result<()> {
        match self {
            Reader::Document(reader) => reader.child_is_done_reading(state, outcome),
            Reader::Line(reader) => reader.child_is_done_reading(state, outcome),
            Reader::SequenceItems(reader) => reader.child_is_done_reading(state, outcome),
            Reader::MapItems(reader) => reader.child_is_done_reading(state, outcome),
            Reader::ExplicitMapKey(reader) => reader.child_is_done_reading(state, outcome),
            Reader::FlowSequence(reader) => reader.child_is_done_reading(state, outcome),
            Reader::FlowMap(reader) => reader.child_is_done_reading(state, outcome),
        }
    }
}

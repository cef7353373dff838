use alloc::vec::Vec;

use crate::chars::{is_blankz, is_flow_indicator};
use crate::state::ReaderState;
use crate::{Result, TagType, Token};

use super::node::{
    at_flow_value, emit_flow_key, emit_flow_value, read_flow_entry, skip_flow_space, FlowEntry,
};
use super::{ChildOutcome, Transition};

enum Phase {
    /// On the `[`.
    Start,
    Item,
    /// A nested collection was read with its tokens held, since a `:` after
    /// it turns it into the key of a single-pair mapping.
    Nested,
    /// The collection key of a `? ` pair was read.
    PairKeyNested,
    /// Looking for the `:` of a `? ` pair.
    PairColon,
    PairValue,
    /// The collection value of a pair was read.
    PairEnd,
    Separator,
}

/// `[a, b, c]`, including the single-pair mappings `[a: b]` and `[? a]`.
pub(crate) struct FlowSequenceReader {
    tag: Option<TagType>,
    phase: Phase,
}

impl FlowSequenceReader {
    pub(crate) fn new(tag: Option<TagType>) -> Self {
        FlowSequenceReader {
            tag,
            phase: Phase::Start,
        }
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Start => {
                state.emit(Token::start_array(self.tag.take()));
                state.skip()?;
                self.phase = Phase::Item;
                Ok(Transition::Continue)
            }
            Phase::Item => self.read_item(state),
            Phase::Nested => {
                let held = state.end_deferral();
                skip_flow_space(state)?;
                if at_flow_value(state, true) {
                    let recorded = held.len();
                    let mut tokens = Vec::with_capacity(recorded + 3);
                    tokens.push(Token::SimpleStartObject);
                    tokens.push(Token::StartComplexFieldName);
                    tokens.extend(held);
                    tokens.push(Token::EndComplexFieldName);
                    state.emit_rewritten(recorded, tokens, None);
                    state.skip()?;
                    self.phase = Phase::PairValue;
                } else {
                    state.flush(held);
                    self.phase = Phase::Separator;
                }
                Ok(Transition::Continue)
            }
            Phase::PairKeyNested => {
                state.emit(Token::EndComplexFieldName);
                self.phase = Phase::PairColon;
                Ok(Transition::Continue)
            }
            Phase::PairColon => {
                skip_flow_space(state)?;
                if at_flow_value(state, true) {
                    state.skip()?;
                    self.phase = Phase::PairValue;
                } else {
                    state.emit(Token::null());
                    state.emit(Token::EndObject);
                    self.phase = Phase::Separator;
                }
                Ok(Transition::Continue)
            }
            Phase::PairValue => {
                skip_flow_space(state)?;
                let entry = read_flow_entry(state)?;
                if let Some(reader) = emit_flow_value(state, entry)? {
                    self.phase = Phase::PairEnd;
                    return Ok(Transition::Child(reader));
                }
                state.emit(Token::EndObject);
                self.phase = Phase::Separator;
                Ok(Transition::Continue)
            }
            Phase::PairEnd => {
                state.emit(Token::EndObject);
                self.phase = Phase::Separator;
                Ok(Transition::Continue)
            }
            Phase::Separator => {
                skip_flow_space(state)?;
                match state.ch() {
                    Some(',') => {
                        state.skip()?;
                        self.phase = Phase::Item;
                        Ok(Transition::Continue)
                    }
                    Some(']') => self.close(state),
                    _ => state.error("did not find expected ',' or ']'"),
                }
            }
        }
    }

    fn read_item(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        skip_flow_space(state)?;
        let next = state.peek(1);
        match state.ch() {
            Some(']') => return self.close(state),
            Some(',') => return state.error("did not find expected node content"),
            Some('?') if is_blankz(next) || is_flow_indicator(next) => {
                state.skip()?;
                skip_flow_space(state)?;
                state.emit(Token::SimpleStartObject);
                let entry = read_flow_entry(state)?;
                return Ok(match emit_flow_key(state, entry)? {
                    (_, Some(reader)) => {
                        self.phase = Phase::PairKeyNested;
                        Transition::Child(reader)
                    }
                    (_, None) => {
                        self.phase = Phase::PairColon;
                        Transition::Continue
                    }
                });
            }
            _ => {}
        }
        let entry = read_flow_entry(state)?;
        if let FlowEntry::Collection(anchor, reader) = entry {
            state.begin_deferral();
            if let Some(name) = anchor {
                state.begin_capture(name);
            }
            self.phase = Phase::Nested;
            return Ok(Transition::Child(reader));
        }
        let adjacent = entry.is_json_like();
        skip_flow_space(state)?;
        if at_flow_value(state, adjacent) {
            state.emit(Token::SimpleStartObject);
            emit_flow_key(state, entry)?;
            state.skip()?;
            self.phase = Phase::PairValue;
            return Ok(Transition::Continue);
        }
        if entry.is_bare() {
            return state.error("did not find expected node content");
        }
        emit_flow_value(state, entry)?;
        self.phase = Phase::Separator;
        Ok(Transition::Continue)
    }

    fn close(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        state.skip()?;
        state.emit(Token::EndArray);
        Ok(Transition::Done(ChildOutcome::Node))
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        state.error("found unexpected end of stream inside a flow collection")
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        _outcome: ChildOutcome,
    ) -> Result<()> {
        Ok(())
    }
}

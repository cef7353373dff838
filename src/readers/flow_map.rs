use crate::chars::{is_blankz, is_flow_indicator};
use crate::state::ReaderState;
use crate::{Result, TagType, Token};

use super::map::FieldNames;
use super::node::{
    at_flow_value, emit_flow_key, emit_flow_value, read_flow_entry, skip_flow_space,
};
use super::{ChildOutcome, Transition};

enum Phase {
    /// On the `{`.
    Start,
    Key,
    /// A collection key was read.
    KeyNested,
    /// Looking for the `:` after a key.
    Colon { adjacent: bool },
    Value,
    Separator,
}

/// `{a: 1, b: 2}`. Keys may be any node; an entry without `:` has a null
/// value.
pub(crate) struct FlowMapReader {
    tag: Option<TagType>,
    phase: Phase,
    field_names: FieldNames,
}

impl FlowMapReader {
    pub(crate) fn new(tag: Option<TagType>) -> Self {
        FlowMapReader {
            tag,
            phase: Phase::Start,
            field_names: FieldNames::default(),
        }
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Start => {
                state.emit(Token::start_object(self.tag.take()));
                state.skip()?;
                self.phase = Phase::Key;
                Ok(Transition::Continue)
            }
            Phase::Key => self.read_key(state),
            Phase::KeyNested => {
                state.emit(Token::EndComplexFieldName);
                self.phase = Phase::Colon { adjacent: true };
                Ok(Transition::Continue)
            }
            Phase::Colon { adjacent } => {
                skip_flow_space(state)?;
                if at_flow_value(state, adjacent) {
                    state.skip()?;
                    self.phase = Phase::Value;
                    return Ok(Transition::Continue);
                }
                if !matches!(state.ch(), Some(',' | '}')) {
                    return state.error("did not find expected ',' or '}'");
                }
                state.emit(Token::null());
                self.phase = Phase::Separator;
                Ok(Transition::Continue)
            }
            Phase::Value => {
                skip_flow_space(state)?;
                let entry = read_flow_entry(state)?;
                self.phase = Phase::Separator;
                Ok(match emit_flow_value(state, entry)? {
                    Some(reader) => Transition::Child(reader),
                    None => Transition::Continue,
                })
            }
            Phase::Separator => {
                skip_flow_space(state)?;
                match state.ch() {
                    Some(',') => {
                        state.skip()?;
                        self.phase = Phase::Key;
                        Ok(Transition::Continue)
                    }
                    Some('}') => self.close(state),
                    _ => state.error("did not find expected ',' or '}'"),
                }
            }
        }
    }

    fn read_key(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        skip_flow_space(state)?;
        let mark = state.mark;
        let next = state.peek(1);
        let explicit = match state.ch() {
            Some('}') => return self.close(state),
            Some(',') => return state.error("did not find expected node content"),
            Some('?') if is_blankz(next) || is_flow_indicator(next) => {
                state.skip()?;
                skip_flow_space(state)?;
                true
            }
            _ => false,
        };
        let entry = read_flow_entry(state)?;
        if !explicit && entry.is_bare() && !state.is(':') {
            return state.error("did not find expected node content");
        }
        let adjacent = entry.is_json_like();
        let (key, nested) = emit_flow_key(state, entry)?;
        self.field_names.note(key, mark)?;
        Ok(match nested {
            Some(reader) => {
                self.phase = Phase::KeyNested;
                Transition::Child(reader)
            }
            None => {
                self.phase = Phase::Colon { adjacent };
                Transition::Continue
            }
        })
    }

    fn close(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        state.skip()?;
        state.emit(Token::EndObject);
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

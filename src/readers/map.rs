use std::collections::HashSet;

use alloc::string::String;

use crate::chars::is_blankz;
use crate::state::ReaderState;
use crate::{Error, Mark, Result, Token};

use super::explicit_key::ExplicitMapKeyReader;
use super::node::{at_value_indicator, LineReader};
use super::{ChildOutcome, KeyName, Reader, Transition};

enum Phase {
    /// At the start of an entry line.
    Key,
    /// A key and its `:` were read; the value comes next.
    Value,
    /// A `?` key was read; its `:` may follow at the mapping's indent.
    AfterExplicitKey,
    AfterValue,
}

/// The entries of a block mapping whose keys start at `indent`.
pub(crate) struct MapItemsReader {
    indent: usize,
    phase: Phase,
    field_names: FieldNames,
    /// Where the key being read starts, for duplicate reports.
    key_mark: Mark,
}

impl MapItemsReader {
    /// A mapping opened by `? ` on its first line.
    pub(crate) fn new(indent: usize) -> Self {
        MapItemsReader {
            indent,
            phase: Phase::Key,
            field_names: FieldNames::default(),
            key_mark: Mark::default(),
        }
    }

    /// A mapping whose first key has already been emitted.
    pub(crate) fn after_key(indent: usize, key: KeyName) -> Self {
        let mut reader = MapItemsReader::new(indent);
        reader.phase = Phase::Value;
        if let KeyName::Simple(name) = key {
            reader.field_names.0.insert(name);
        }
        reader
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Key => {
                self.key_mark = state.mark;
                let next = state.peek(1);
                match state.ch() {
                    Some('?') if is_blankz(next) => {
                        state.skip()?;
                        self.phase = Phase::AfterExplicitKey;
                        Ok(Transition::Child(Reader::ExplicitMapKey(ExplicitMapKeyReader::new(
                            self.indent,
                        ))))
                    }
                    Some(':') if is_blankz(next) => {
                        self.field_names.note(KeyName::Simple(None), self.key_mark)?;
                        state.emit(Token::FieldName(None));
                        state.skip()?;
                        self.phase = Phase::Value;
                        Ok(Transition::Continue)
                    }
                    Some('-') if is_blankz(next) => {
                        state.error("found a sequence item where a map was established")
                    }
                    _ => {
                        self.phase = Phase::Value;
                        Ok(Transition::Child(Reader::Line(LineReader::key(self.indent))))
                    }
                }
            }
            Phase::Value => {
                self.phase = Phase::AfterValue;
                Ok(Transition::Child(Reader::Line(LineReader::value(self.indent))))
            }
            Phase::AfterExplicitKey => {
                if state.column() == self.indent
                    && state.at_document_marker().is_none()
                    && at_value_indicator(state)
                {
                    state.skip()?;
                    self.phase = Phase::AfterValue;
                    return Ok(Transition::Child(Reader::Line(LineReader::explicit_value(
                        self.indent,
                    ))));
                }
                state.emit(Token::null());
                self.phase = Phase::AfterValue;
                Ok(Transition::Continue)
            }
            Phase::AfterValue => {
                let column = state.column();
                if state.at_document_marker().is_some() || column < self.indent {
                    state.emit(Token::EndObject);
                    return Ok(Transition::Done(ChildOutcome::Node));
                }
                if column > self.indent {
                    return state.error("bad indentation of a mapping entry");
                }
                self.phase = Phase::Key;
                Ok(Transition::Continue)
            }
        }
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        if matches!(self.phase, Phase::Value | Phase::AfterExplicitKey) {
            state.emit(Token::null());
        }
        state.emit(Token::EndObject);
        Ok(Transition::Done(ChildOutcome::Node))
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        outcome: ChildOutcome,
    ) -> Result<()> {
        match outcome {
            ChildOutcome::Key(key) | ChildOutcome::ExplicitKey(key) => {
                self.field_names.note(key, self.key_mark)
            }
            ChildOutcome::Node => Ok(()),
        }
    }
}

/// The scalar keys seen so far in one mapping.
#[derive(Default)]
pub(crate) struct FieldNames(HashSet<Option<String>>);

impl FieldNames {
    /// Remember a key, rejecting a scalar key seen before. Merge keys and
    /// complex keys are exempt.
    pub(crate) fn note(&mut self, key: KeyName, mark: Mark) -> Result<()> {
        let KeyName::Simple(name) = key else {
            return Ok(());
        };
        if self.0.contains(&name) {
            let shown = name.as_deref().unwrap_or("");
            return Error::invalid(format!("found duplicate key '{shown}'"), mark);
        }
        self.0.insert(name);
        Ok(())
    }
}

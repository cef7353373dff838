use crate::chars::is_blankz;
use crate::state::ReaderState;
use crate::{Result, Token};

use super::node::LineReader;
use super::{ChildOutcome, Reader, Transition};

enum Phase {
    /// On the `-` of an entry.
    Entry,
    AfterEntry,
}

/// The entries of a block sequence whose `-` indicators sit at `indent`.
pub(crate) struct SequenceItemsReader {
    indent: usize,
    phase: Phase,
}

impl SequenceItemsReader {
    pub(crate) fn new(indent: usize) -> Self {
        SequenceItemsReader {
            indent,
            phase: Phase::Entry,
        }
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Entry => {
                state.skip()?;
                self.phase = Phase::AfterEntry;
                Ok(Transition::Child(Reader::Line(LineReader::entry(self.indent))))
            }
            Phase::AfterEntry => {
                let column = state.column();
                if state.at_document_marker().is_some() || column < self.indent {
                    return self.close(state);
                }
                if column > self.indent {
                    return state.error("bad indentation of a sequence entry");
                }
                if !state.is('-') || !is_blankz(state.peek(1)) {
                    return self.close(state);
                }
                self.phase = Phase::Entry;
                Ok(Transition::Continue)
            }
        }
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        self.close(state)
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        _outcome: ChildOutcome,
    ) -> Result<()> {
        Ok(())
    }

    fn close(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        state.emit(Token::EndArray);
        Ok(Transition::Done(ChildOutcome::Node))
    }
}

use crate::chars::is_blankz;
use crate::state::ReaderState;
use crate::{Result, Token};

use super::node::{key_tokens, LineReader};
use super::{ChildOutcome, KeyName, Reader, Transition};

enum Phase {
    /// Right after the `?`.
    Started,
    /// The key node is being read into a held buffer.
    Reading,
}

/// The node after a `? ` indicator.
///
/// The node is read like any other and its tokens held back; once complete,
/// a lone scalar becomes a plain field name and anything else is wrapped as
/// a complex key.
pub(crate) struct ExplicitMapKeyReader {
    indent: usize,
    phase: Phase,
}

impl ExplicitMapKeyReader {
    pub(crate) fn new(indent: usize) -> Self {
        ExplicitMapKeyReader {
            indent,
            phase: Phase::Started,
        }
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Started => {
                state.skip_blanks()?;
                if state.is('?') && is_blankz(state.peek(1)) {
                    return state.error("found two consecutive explicit keys");
                }
                state.begin_deferral();
                self.phase = Phase::Reading;
                Ok(Transition::Child(Reader::Line(LineReader::explicit_key(self.indent))))
            }
            Phase::Reading => self.finish(state),
        }
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        match self.phase {
            Phase::Started => {
                state.emit(Token::FieldName(None));
                Ok(Transition::Done(ChildOutcome::ExplicitKey(KeyName::Simple(None))))
            }
            Phase::Reading => self.finish(state),
        }
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        _outcome: ChildOutcome,
    ) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        let held = state.end_deferral();
        let recorded = held.len();
        let (key, tokens) = key_tokens(held, state.take_scalar_key());
        state.emit_rewritten(recorded, tokens, None);
        Ok(Transition::Done(ChildOutcome::ExplicitKey(key)))
    }
}

use crate::state::{DocumentMarker, ReaderState};
use crate::{Result, Token};

use super::directive::read_directive;
use super::indent::{finish_line, skip_to_content};
use super::node::LineReader;
use super::{ChildOutcome, Reader, Transition};

enum Phase {
    /// Between documents, or before the first one.
    Between,
    /// Directives were read; `---` must follow.
    Directives,
    /// The root node was read.
    Content,
}

/// The bottom of the reader stack: directives, document markers and the
/// root node of every document in the stream.
pub(crate) struct DocumentReader {
    phase: Phase,
    documents: usize,
}

impl DocumentReader {
    pub(crate) fn new() -> Self {
        DocumentReader {
            phase: Phase::Between,
            documents: 0,
        }
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match self.phase {
            Phase::Between => {
                skip_to_content(state)?;
                if state.at_end() {
                    return Ok(Transition::Continue);
                }
                if state.column() == 0 && state.is('%') {
                    read_directive(state)?;
                    self.phase = Phase::Directives;
                    return Ok(Transition::Continue);
                }
                match state.at_document_marker() {
                    Some(DocumentMarker::Start) => self.start_explicit(state),
                    Some(DocumentMarker::End) => {
                        skip_marker(state)?;
                        finish_line(state, false)?;
                        Ok(Transition::Continue)
                    }
                    None => {
                        self.start(state);
                        state.document_indent = Some(state.column());
                        Ok(Transition::Child(Reader::Line(LineReader::root(false))))
                    }
                }
            }
            Phase::Directives => {
                skip_to_content(state)?;
                if state.at_end() {
                    return Ok(Transition::Continue);
                }
                if state.column() == 0 && state.is('%') {
                    read_directive(state)?;
                    return Ok(Transition::Continue);
                }
                if state.at_document_marker() == Some(DocumentMarker::Start) {
                    return self.start_explicit(state);
                }
                state.error("did not find expected <document start>")
            }
            Phase::Content => match state.at_document_marker() {
                Some(DocumentMarker::End) => {
                    self.end(state);
                    skip_marker(state)?;
                    finish_line(state, false)?;
                    Ok(Transition::Continue)
                }
                Some(DocumentMarker::Start) => {
                    self.end(state);
                    Ok(Transition::Continue)
                }
                None => {
                    let below = state
                        .document_indent
                        .map_or(false, |indent| state.column() < indent);
                    if below {
                        state.error("indentation dropped below document start")
                    } else {
                        state.error("found content after the document root node")
                    }
                }
            },
        }
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        match self.phase {
            Phase::Between => {}
            Phase::Directives => return state.error("did not find expected <document start>"),
            Phase::Content => self.end(state),
        }
        tracing::debug!(documents = self.documents, "stream end");
        Ok(Transition::Done(ChildOutcome::Node))
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        _outcome: ChildOutcome,
    ) -> Result<()> {
        Ok(())
    }

    fn start_explicit(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        skip_marker(state)?;
        self.start(state);
        Ok(Transition::Child(Reader::Line(LineReader::root(true))))
    }

    fn start(&mut self, state: &mut ReaderState<'_>) {
        self.documents += 1;
        tracing::debug!(document = self.documents, line = state.mark.line + 1, "document start");
        state.emit(Token::StartDocument);
        self.phase = Phase::Content;
    }

    fn end(&mut self, state: &mut ReaderState<'_>) {
        tracing::debug!(document = self.documents, "document end");
        state.emit(Token::EndDocument);
        state.end_document();
        self.phase = Phase::Between;
    }
}

fn skip_marker(state: &mut ReaderState<'_>) -> Result<()> {
    for _ in 0..3 {
        state.skip()?;
    }
    Ok(())
}

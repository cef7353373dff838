use std::io::BufRead;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::readers::{Reader, Transition};
use crate::state::ReaderState;
use crate::{
    CharSource, ReadSource, ReaderOptions, Result, StrSource, TagResolver, Token, VersionDirective,
};

/// The streaming tokenizer.
///
/// Pulls characters from a [`CharSource`] and produces [`Token`]s one at a
/// time. The reader holds no more of the input than a few characters of
/// lookahead plus whatever tokens are waiting on a key/value decision.
///
/// ```
/// use yaml_token_reader::{ScalarValue, Token, ValueType, YamlReader};
///
/// let tokens = YamlReader::from_str("answer: 42")
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::StartDocument,
///         Token::SimpleStartObject,
///         Token::FieldName(Some("answer".into())),
///         Token::Value(ScalarValue::Int(42), ValueType::Int),
///         Token::EndObject,
///         Token::EndDocument,
///     ]
/// );
/// ```
pub struct YamlReader<'a> {
    state: ReaderState<'a>,
    /// The reader stack; the top reader is driven.
    readers: Vec<Reader>,
    /// Number of collections on the stack.
    depth: usize,
    primed: bool,
    failed: bool,
}

impl<'a> YamlReader<'a> {
    /// Create a reader over any character source.
    pub fn new(source: impl CharSource + 'a) -> Self {
        YamlReader {
            state: ReaderState::new(Box::new(source)),
            readers: vec![Reader::document()],
            depth: 0,
            primed: false,
            failed: false,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Self::new(StrSource::new(input))
    }

    /// Read UTF-8 text from a buffered reader.
    pub fn from_read<R: BufRead + 'a>(reader: R) -> Self {
        Self::new(ReadSource::new(reader))
    }

    /// Map custom tags to semantic types. Tags the resolver declines stay
    /// [`TagType::Generic`](crate::TagType::Generic).
    #[must_use]
    pub fn with_tag_resolver(mut self, resolver: impl TagResolver + 'a) -> Self {
        self.state.set_resolver(Box::new(resolver));
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.state.options = options;
        self
    }

    /// The `%YAML` directive seen so far in the stream, if any.
    pub fn version(&self) -> Option<VersionDirective> {
        self.state.version
    }

    /// Produce the next token, or `None` at the end of the stream.
    ///
    /// After an error the reader stays at the end of the stream.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.failed {
            return Ok(None);
        }
        match self.advance() {
            Ok(token) => Ok(token),
            Err(err) => {
                tracing::debug!(error = %err, "tokenizing failed");
                self.failed = true;
                self.readers.clear();
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Token>> {
        if !self.primed {
            self.state.fill()?;
            self.primed = true;
        }
        loop {
            if let Some(token) = self.state.next_pending() {
                return Ok(Some(token));
            }
            let Some(reader) = self.readers.last_mut() else {
                return Ok(None);
            };
            let transition = if self.state.at_end() {
                reader.handle_reader_interrupt(&mut self.state)?
            } else {
                reader.read_until_token(&mut self.state)?
            };
            self.apply(transition)?;
        }
    }

    fn apply(&mut self, transition: Transition) -> Result<()> {
        match transition {
            Transition::Continue => {}
            Transition::Child(child) => self.push(child)?,
            Transition::Replace(reader) => {
                self.pop();
                self.push(reader)?;
            }
            Transition::Done(outcome) => {
                self.pop();
                if let Some(parent) = self.readers.last_mut() {
                    parent.child_is_done_reading(&mut self.state, outcome)?;
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, reader: Reader) -> Result<()> {
        if reader.is_collection() {
            self.depth += 1;
            let max = self.state.options.max_depth;
            if self.depth > max {
                return self.state.error(format!("exceeded the maximum nesting depth of {max}"));
            }
        }
        tracing::trace!(reader = reader.name(), depth = self.readers.len(), "push");
        self.readers.push(reader);
        Ok(())
    }

    fn pop(&mut self) {
        if let Some(reader) = self.readers.pop() {
            tracing::trace!(reader = reader.name(), depth = self.readers.len(), "pop");
            if reader.is_collection() {
                self.depth -= 1;
            }
        }
    }
}

impl Iterator for YamlReader<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl core::iter::FusedIterator for YamlReader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScalarValue, ValueType};

    #[test]
    fn empty_input_has_no_documents() {
        let mut reader = YamlReader::from_str("");
        assert_eq!(reader.next_token().unwrap(), None);
        let mut reader = YamlReader::from_str("# only a comment\n\n");
        assert_eq!(reader.next_token().unwrap(), None);
    }

    #[test]
    fn fused_after_error() {
        let mut reader = YamlReader::from_str("a: [1, 2");
        let mut tokens = 0;
        let err = loop {
            match reader.next_token() {
                Ok(Some(_)) => tokens += 1,
                Ok(None) => panic!("expected an error"),
                Err(err) => break err,
            }
        };
        assert!(tokens > 0);
        assert_eq!(
            err.problem(),
            Some("found unexpected end of stream inside a flow collection")
        );
        assert_eq!(reader.next_token().unwrap(), None);
        assert!(reader.next().is_none());
    }

    #[test]
    fn version_directive_is_visible_once_read() {
        let mut reader = YamlReader::from_str("%YAML 1.1\n---\na\n");
        assert_eq!(reader.version(), None);
        assert_eq!(reader.next_token().unwrap(), Some(Token::StartDocument));
        assert_eq!(reader.version(), Some(VersionDirective { major: 1, minor: 1 }));
    }

    #[test]
    fn nesting_limit() {
        let options = ReaderOptions {
            max_depth: 3,
            ..ReaderOptions::default()
        };
        let result = YamlReader::from_str("[[[[1]]]]")
            .with_options(options)
            .collect::<Result<Vec<_>>>();
        assert_eq!(
            result.unwrap_err().problem(),
            Some("exceeded the maximum nesting depth of 3")
        );
        let tokens = YamlReader::from_str("[[[1]]]")
            .with_options(options)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn reads_from_buffered_input() {
        let input: &[u8] = b"- 1\r\n- two\r\n";
        let tokens = YamlReader::from_read(input)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::StartDocument,
                Token::SimpleStartArray,
                Token::Value(ScalarValue::Int(1), ValueType::Int),
                Token::Value(ScalarValue::String("two".into()), ValueType::String),
                Token::EndArray,
                Token::EndDocument,
            ]
        );
    }
}

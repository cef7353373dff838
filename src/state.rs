use std::collections::HashMap;

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::chars::is_blankz;
use crate::readers::KeyName;
use crate::{
    CharSource, Error, Mark, ReaderOptions, Result, TagResolver, TagType, Token,
    VersionDirective, YAML_TAG_PREFIX,
};

/// How many characters the engine keeps buffered ahead of the cursor.
const LOOKAHEAD: usize = 4;

/// A token sub-sequence being recorded for an `&anchor`.
struct AnchorCapture {
    name: String,
    depth: usize,
    tokens: Vec<Token>,
}

impl AnchorCapture {
    fn new(name: String) -> Self {
        AnchorCapture {
            name,
            depth: 0,
            tokens: Vec::new(),
        }
    }

    fn push(&mut self, token: &Token) {
        if token.is_start() {
            self.depth += 1;
        } else if token.is_end() {
            self.depth = self.depth.saturating_sub(1);
        }
        self.tokens.push(token.clone());
    }
}

/// The tokens of an anchored node. A scalar also keeps the key its source
/// text makes, so an alias used as a key is named like the original.
struct Anchored {
    tokens: Vec<Token>,
    key: Option<KeyName>,
}

/// State shared by every reader of one stream.
pub(crate) struct ReaderState<'a> {
    source: Box<dyn CharSource + 'a>,
    window: VecDeque<char>,
    source_done: bool,
    after_cr: bool,
    pub(crate) mark: Mark,
    /// Tokens ready for the consumer.
    pending: VecDeque<Token>,
    /// Token buffers held back until a key/value decision is made.
    deferrals: Vec<Vec<Token>>,
    anchors: HashMap<String, Anchored>,
    captures: Vec<AnchorCapture>,
    /// The key the most recently emitted scalar would make.
    scalar_key: Option<KeyName>,
    alias_tokens: usize,
    tag_handles: HashMap<String, String>,
    resolver: Option<Box<dyn TagResolver + 'a>>,
    pub(crate) version: Option<VersionDirective>,
    /// Column of the first content line of the current document.
    pub(crate) document_indent: Option<usize>,
    pub(crate) options: ReaderOptions,
}

impl<'a> ReaderState<'a> {
    pub(crate) fn new(source: Box<dyn CharSource + 'a>) -> Self {
        ReaderState {
            source,
            window: VecDeque::with_capacity(LOOKAHEAD),
            source_done: false,
            after_cr: false,
            mark: Mark::default(),
            pending: VecDeque::new(),
            deferrals: Vec::new(),
            anchors: HashMap::new(),
            captures: Vec::new(),
            scalar_key: None,
            alias_tokens: 0,
            tag_handles: HashMap::new(),
            resolver: None,
            version: None,
            document_indent: None,
            options: ReaderOptions::default(),
        }
    }

    pub(crate) fn set_resolver(&mut self, resolver: Box<dyn TagResolver + 'a>) {
        self.resolver = Some(resolver);
    }

    /// Top up the lookahead window from the source.
    pub(crate) fn fill(&mut self) -> Result<()> {
        while self.window.len() < LOOKAHEAD && !self.source_done {
            match self.source.next_char()? {
                None => self.source_done = true,
                Some('\r') => {
                    self.after_cr = true;
                    self.window.push_back('\n');
                }
                Some('\n') if self.after_cr => self.after_cr = false,
                Some(ch) => {
                    self.after_cr = false;
                    self.window.push_back(ch);
                }
            }
        }
        Ok(())
    }

    /// The current character, `None` at the end of input.
    pub(crate) fn ch(&self) -> Option<char> {
        self.window.front().copied()
    }

    pub(crate) fn peek(&self, offset: usize) -> Option<char> {
        self.window.get(offset).copied()
    }

    pub(crate) fn is(&self, ch: char) -> bool {
        self.ch() == Some(ch)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.window.is_empty()
    }

    pub(crate) fn column(&self) -> usize {
        self.mark.column
    }

    pub(crate) fn skip(&mut self) -> Result<()> {
        if let Some(ch) = self.window.pop_front() {
            self.mark.index += 1;
            if ch == '\n' {
                self.mark.line += 1;
                self.mark.column = 0;
            } else {
                self.mark.column += 1;
            }
        }
        self.fill()
    }

    /// Move the current character into `out`.
    pub(crate) fn read_into(&mut self, out: &mut String) -> Result<()> {
        if let Some(ch) = self.ch() {
            out.push(ch);
        }
        self.skip()
    }

    pub(crate) fn skip_blanks(&mut self) -> Result<()> {
        while matches!(self.ch(), Some(' ' | '\t')) {
            self.skip()?;
        }
        Ok(())
    }

    /// `---` or `...` followed by a blank, at the start of a line.
    pub(crate) fn at_document_marker(&self) -> Option<DocumentMarker> {
        if self.mark.column != 0 || !is_blankz(self.peek(3)) {
            return None;
        }
        match (self.peek(0), self.peek(1), self.peek(2)) {
            (Some('-'), Some('-'), Some('-')) => Some(DocumentMarker::Start),
            (Some('.'), Some('.'), Some('.')) => Some(DocumentMarker::End),
            _ => None,
        }
    }

    pub(crate) fn error<T>(&self, problem: impl Into<String>) -> Result<T> {
        Error::invalid(problem, self.mark)
    }

    /// Hand a token towards the consumer.
    ///
    /// Open anchor captures record it first; then it goes to the innermost
    /// deferral buffer, or to the consumer queue when nothing is deferred.
    pub(crate) fn emit(&mut self, token: Token) {
        if !self.captures.is_empty() {
            self.record(&token);
        }
        self.push_out(token);
    }

    fn push_out(&mut self, token: Token) {
        match self.deferrals.last_mut() {
            Some(buffer) => buffer.push(token),
            None => self.pending.push_back(token),
        }
    }

    fn record(&mut self, token: &Token) {
        let mut sealed = Vec::new();
        for (index, capture) in self.captures.iter_mut().enumerate() {
            capture.push(token);
            let completes_node = match token {
                Token::FieldName(_)
                | Token::MergeFieldName
                | Token::StartComplexFieldName
                | Token::EndComplexFieldName => false,
                _ => capture.depth == 0,
            };
            if completes_node {
                sealed.push(index);
            }
        }
        for index in sealed.into_iter().rev() {
            let capture = self.captures.remove(index);
            tracing::debug!(anchor = %capture.name, tokens = capture.tokens.len(), "sealed anchor");
            let anchored = Anchored {
                tokens: capture.tokens,
                key: None,
            };
            self.anchors.insert(capture.name, anchored);
        }
    }

    /// Start recording the next node under `name`.
    pub(crate) fn begin_capture(&mut self, name: String) {
        self.captures.push(AnchorCapture::new(name));
    }

    /// Store an anchor whose tokens are already known.
    pub(crate) fn store_anchor(&mut self, name: String, tokens: Vec<Token>) {
        tracing::debug!(anchor = %name, tokens = tokens.len(), "sealed anchor");
        self.anchors.insert(name, Anchored { tokens, key: None });
    }

    /// Store an anchored scalar together with the key its text makes.
    pub(crate) fn store_scalar_anchor(&mut self, name: String, token: Token, key: KeyName) {
        tracing::debug!(anchor = %name, "sealed scalar anchor");
        let anchored = Anchored {
            tokens: vec![token],
            key: Some(key),
        };
        self.anchors.insert(name, anchored);
    }

    pub(crate) fn anchor(&self, name: &str, mark: Mark) -> Result<Vec<Token>> {
        match self.anchors.get(name) {
            Some(anchored) => Ok(anchored.tokens.clone()),
            None => Error::invalid(format!("found undefined alias '{name}'"), mark),
        }
    }

    /// The key an anchored scalar makes; `None` for collections.
    pub(crate) fn anchor_key(&self, name: &str) -> Option<KeyName> {
        self.anchors.get(name).and_then(|anchored| anchored.key.clone())
    }

    /// Replay the tokens captured under `name`.
    pub(crate) fn replay_alias(&mut self, name: &str, mark: Mark) -> Result<()> {
        let tokens = self.anchor(name, mark)?;
        self.count_alias_tokens(tokens.len(), mark)?;
        for token in tokens {
            self.emit(token);
        }
        self.scalar_key = self.anchor_key(name);
        Ok(())
    }

    /// Emit a scalar value, remembering the key its source text makes.
    pub(crate) fn emit_scalar_value(&mut self, token: Token, key: KeyName) {
        self.emit(token);
        self.scalar_key = Some(key);
    }

    pub(crate) fn take_scalar_key(&mut self) -> Option<KeyName> {
        self.scalar_key.take()
    }

    pub(crate) fn count_alias_tokens(&mut self, count: usize, mark: Mark) -> Result<()> {
        self.alias_tokens = self.alias_tokens.saturating_add(count);
        if self.alias_tokens > self.options.max_alias_tokens {
            return Error::invalid("alias expansion exceeds the configured limit", mark);
        }
        Ok(())
    }

    /// Hold back every token emitted from now on.
    pub(crate) fn begin_deferral(&mut self) {
        self.scalar_key = None;
        self.deferrals.push(Vec::new());
    }

    pub(crate) fn end_deferral(&mut self) -> Vec<Token> {
        self.deferrals.pop().unwrap_or_default()
    }

    /// Release held tokens unchanged. They were recorded when emitted.
    pub(crate) fn flush(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            self.push_out(token);
        }
    }

    /// Release `tokens` in place of the last `recorded` held tokens.
    ///
    /// Every open capture saw the held tokens when they were emitted; their
    /// copies are replaced so that replays match what the consumer gets.
    /// `anchor` starts a capture covering the rewritten tokens.
    pub(crate) fn emit_rewritten(
        &mut self,
        recorded: usize,
        tokens: Vec<Token>,
        anchor: Option<String>,
    ) {
        for capture in &mut self.captures {
            let keep = capture.tokens.len().saturating_sub(recorded);
            capture.tokens.truncate(keep);
            for token in &tokens {
                capture.push(token);
            }
        }
        if let Some(name) = anchor {
            let mut capture = AnchorCapture::new(name);
            for token in &tokens {
                capture.push(token);
            }
            self.captures.push(capture);
        }
        self.flush(tokens);
    }

    pub(crate) fn next_pending(&mut self) -> Option<Token> {
        self.pending.pop_front()
    }

    /// Register a `%TAG` handle; `mark` is where the directive starts.
    pub(crate) fn register_tag_handle(
        &mut self,
        handle: String,
        prefix: String,
        mark: Mark,
    ) -> Result<()> {
        if self.tag_handles.contains_key(&handle) {
            let problem = format!("found duplicate %TAG directive for handle '{handle}'");
            return Error::invalid(problem, mark);
        }
        self.tag_handles.insert(handle, prefix);
        Ok(())
    }

    /// The prefix a tag handle expands to.
    pub(crate) fn tag_prefix(&self, handle: &str) -> Option<String> {
        if let Some(prefix) = self.tag_handles.get(handle) {
            return Some(prefix.clone());
        }
        match handle {
            "!" => Some(String::from("!")),
            "!!" => Some(String::from(YAML_TAG_PREFIX)),
            _ => None,
        }
    }

    pub(crate) fn resolve_tag(&self, prefix: &str, name: &str) -> TagType {
        TagType::from_parts(prefix, name, self.resolver.as_deref())
    }

    /// Forget everything scoped to a single document.
    pub(crate) fn end_document(&mut self) {
        self.tag_handles.clear();
        self.anchors.clear();
        self.captures.clear();
        self.document_indent = None;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DocumentMarker {
    /// `---`
    Start,
    /// `...`
    End,
}

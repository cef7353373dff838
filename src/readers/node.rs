//! Node content: properties, scalars and the block-context line reader that
//! decides whether a node is a plain value or the first key of a mapping.

use alloc::string::String;
use alloc::vec::Vec;

use crate::chars::{is_blank, is_blankz, is_breakz, is_flow_indicator};
use crate::state::ReaderState;
use crate::{
    resolve_plain_scalar, resolve_tagged_scalar, Error, Mark, Result, ScalarValue, TagType, Token,
    ValueType,
};

use super::anchor::read_anchor_name;
use super::block_scalar::BlockScalarReader;
use super::comment::read_comment;
use super::flow_map::FlowMapReader;
use super::flow_sequence::FlowSequenceReader;
use super::indent::{continues_below, finish_line, skip_to_content};
use super::map::MapItemsReader;
use super::plain::PlainScalarReader;
use super::quoted::read_quoted;
use super::sequence::SequenceItemsReader;
use super::tag::read_tag;
use super::{ChildOutcome, KeyName, Reader, Transition};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// The text of a scalar before typing.
#[derive(Clone, Debug)]
pub(crate) struct ScalarText {
    pub(crate) text: String,
    pub(crate) style: ScalarStyle,
    /// Whether content from more than one line was folded together.
    pub(crate) multi_line: bool,
    pub(crate) start: Mark,
}

impl ScalarText {
    fn empty(start: Mark) -> Self {
        ScalarText {
            text: String::new(),
            style: ScalarStyle::Plain,
            multi_line: false,
            start,
        }
    }

    fn key_name(&self) -> KeyName {
        if self.style != ScalarStyle::Plain {
            KeyName::Simple(Some(self.text.clone()))
        } else if self.text.is_empty() {
            KeyName::Simple(None)
        } else if self.text == "<<" {
            KeyName::Merge
        } else {
            KeyName::Simple(Some(self.text.clone()))
        }
    }
}

/// The anchor and tag written in front of a node.
#[derive(Clone, Debug, Default)]
pub(crate) struct Props {
    pub(crate) anchor: Option<String>,
    pub(crate) tag: Option<TagType>,
    pub(crate) mark: Option<Mark>,
}

impl Props {
    pub(crate) fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.tag.is_none()
    }

    /// Add properties found on a later line of the same node.
    fn merge(&mut self, other: Props) -> Result<()> {
        let mark = other.mark.unwrap_or_default();
        if let Some(anchor) = other.anchor {
            if self.anchor.is_some() {
                return Error::invalid("found duplicate anchor on a node", mark);
            }
            self.anchor = Some(anchor);
        }
        if let Some(tag) = other.tag {
            if self.tag.is_some() {
                return Error::invalid("found duplicate tag on a node", mark);
            }
            self.tag = Some(tag);
        }
        if self.mark.is_none() {
            self.mark = other.mark;
        }
        Ok(())
    }

    /// Start recording the collection about to open under the anchor.
    pub(crate) fn begin_capture(&mut self, state: &mut ReaderState<'_>) {
        if let Some(name) = self.anchor.take() {
            state.begin_capture(name);
        }
    }
}

/// Read any `&anchor` and `!tag` in front of a node, in either order.
pub(crate) fn read_props(state: &mut ReaderState<'_>, flow: bool) -> Result<Props> {
    let mut props = Props::default();
    loop {
        let mark = state.mark;
        match state.ch() {
            Some('&') => {
                if props.anchor.is_some() {
                    return state.error("found duplicate anchor on a node");
                }
                props.anchor = Some(read_anchor_name(state, false)?);
            }
            Some('!') => {
                if props.tag.is_some() {
                    return state.error("found duplicate tag on a node");
                }
                props.tag = Some(read_tag(state, flow)?);
            }
            _ => return Ok(props),
        }
        if props.mark.is_none() {
            props.mark = Some(mark);
        }
        state.skip_blanks()?;
    }
}

fn scalar_token(props: &Props, scalar: &ScalarText) -> Result<Token> {
    let (value, value_type) = match &props.tag {
        Some(tag) => match resolve_tagged_scalar(tag, &scalar.text) {
            Some(resolved) => resolved,
            None => {
                let problem = match tag {
                    TagType::Core(core) => format!("invalid !!{} value '{}'", core.name(), scalar.text),
                    _ => format!("invalid value '{}' for its tag", scalar.text),
                };
                return Error::invalid(problem, props.mark.unwrap_or(scalar.start));
            }
        },
        None if scalar.style == ScalarStyle::Plain => resolve_plain_scalar(&scalar.text),
        None => (ScalarValue::String(scalar.text.clone()), ValueType::String),
    };
    Ok(Token::Value(value, value_type))
}

pub(crate) fn emit_scalar(
    state: &mut ReaderState<'_>,
    props: Props,
    scalar: &ScalarText,
) -> Result<()> {
    let token = scalar_token(&props, scalar)?;
    let key = scalar.key_name();
    if let Some(name) = props.anchor {
        state.store_scalar_anchor(name, token.clone(), key.clone());
    }
    state.emit_scalar_value(token, key);
    Ok(())
}

/// An absent node: a null carrying whatever properties were written.
pub(crate) fn emit_empty(state: &mut ReaderState<'_>, props: Props, mark: Mark) -> Result<()> {
    emit_scalar(state, props, &ScalarText::empty(mark))
}

/// Emit a scalar as a key. An anchor on an untagged key remembers the key
/// text as a string.
pub(crate) fn emit_scalar_key(
    state: &mut ReaderState<'_>,
    props: Props,
    scalar: &ScalarText,
) -> Result<KeyName> {
    let value = match props.tag {
        Some(_) => scalar_token(&props, scalar)?,
        None => Token::Value(ScalarValue::String(scalar.text.clone()), ValueType::String),
    };
    let key = scalar.key_name();
    if let Some(name) = props.anchor {
        state.store_scalar_anchor(name, value, key.clone());
    }
    if let Some(token) = key.field_token() {
        state.emit(token);
    }
    Ok(key)
}

/// Emit the node behind an alias as a key.
pub(crate) fn emit_alias_key(
    state: &mut ReaderState<'_>,
    name: &str,
    mark: Mark,
) -> Result<KeyName> {
    let tokens = state.anchor(name, mark)?;
    state.count_alias_tokens(tokens.len(), mark)?;
    let (key, tokens) = key_tokens(tokens, state.anchor_key(name));
    for token in tokens {
        state.emit(token);
    }
    Ok(key)
}

/// The key tokens for a node whose tokens are already known.
///
/// A lone scalar is named by `scalar_key`, the key made from its source
/// text, so `? 1.0` and `1.0:` name the same field.
pub(crate) fn key_tokens(
    node: Vec<Token>,
    scalar_key: Option<KeyName>,
) -> (KeyName, Vec<Token>) {
    if let [Token::Value(value, _)] = node.as_slice() {
        let key = scalar_key.unwrap_or_else(|| KeyName::Simple(value.to_text()));
        if let Some(token) = key.field_token() {
            return (key, vec![token]);
        }
    }
    let mut tokens = Vec::with_capacity(node.len() + 2);
    tokens.push(Token::StartComplexFieldName);
    tokens.extend(node);
    tokens.push(Token::EndComplexFieldName);
    (KeyName::Complex, tokens)
}

pub(crate) fn at_value_indicator(state: &ReaderState<'_>) -> bool {
    state.is(':') && is_blankz(state.peek(1))
}

fn reserved<T>(state: &ReaderState<'_>, ch: char) -> Result<T> {
    state.error(format!("found character '{ch}' that cannot start any token"))
}

/// Skip blanks and report whether there were any.
fn skip_separation(state: &mut ReaderState<'_>) -> Result<bool> {
    let separated = is_blank(state.ch());
    state.skip_blanks()?;
    Ok(separated)
}

/// Skip white space, line breaks and comments between flow tokens.
pub(crate) fn skip_flow_space(state: &mut ReaderState<'_>) -> Result<()> {
    loop {
        if state.at_document_marker().is_some() {
            return state.error("found unexpected document indicator inside a flow collection");
        }
        match state.ch() {
            Some(' ' | '\t' | '\n') => state.skip()?,
            Some('#') => read_comment(state)?,
            None => return state.error("found unexpected end of stream inside a flow collection"),
            _ => return Ok(()),
        }
    }
}

/// A `:` ending a key inside a flow collection. After a quoted scalar or a
/// collection the `:` may touch the next token.
pub(crate) fn at_flow_value(state: &ReaderState<'_>, adjacent: bool) -> bool {
    let next = state.peek(1);
    state.is(':') && (adjacent || is_blankz(next) || is_flow_indicator(next))
}

/// One node inside a flow collection, read up to its end.
pub(crate) enum FlowEntry {
    Scalar(Props, ScalarText),
    Alias(String, Mark),
    /// A nested collection to push; its anchor still has to be captured.
    Collection(Option<String>, Reader),
    /// Nothing but properties before `,`, `]`, `}` or `:`.
    Empty(Props, Mark),
}

pub(crate) fn read_flow_entry(state: &mut ReaderState<'_>) -> Result<FlowEntry> {
    let props = read_props(state, true)?;
    if !props.is_empty() {
        skip_flow_space(state)?;
    }
    let mark = state.mark;
    let next = state.peek(1);
    let entry = match state.ch() {
        Some('[') => FlowEntry::Collection(
            props.anchor,
            Reader::FlowSequence(FlowSequenceReader::new(props.tag)),
        ),
        Some('{') => {
            FlowEntry::Collection(props.anchor, Reader::FlowMap(FlowMapReader::new(props.tag)))
        }
        Some('*') => {
            if !props.is_empty() {
                return Error::invalid("found properties on an alias node", mark);
            }
            FlowEntry::Alias(read_anchor_name(state, true)?, mark)
        }
        Some(quote @ ('\'' | '"')) => FlowEntry::Scalar(props, read_quoted(state, quote == '\'')?),
        None | Some(',' | ']' | '}') => FlowEntry::Empty(props, mark),
        Some(':') if is_blankz(next) || is_flow_indicator(next) => FlowEntry::Empty(props, mark),
        Some('-') if is_blankz(next) => {
            return state.error("block sequence entries are not allowed in a flow collection");
        }
        Some('|' | '>') => {
            return state.error("block scalars are not allowed in a flow collection");
        }
        Some(ch @ ('@' | '`' | '%')) => return reserved(state, ch),
        Some(_) => {
            let scalar = PlainScalarReader {
                flow: true,
                parent_indent: -1,
            }
            .read(state)?;
            if scalar.text.is_empty() {
                return Error::invalid("did not find expected node content", mark);
            }
            FlowEntry::Scalar(props, scalar)
        }
    };
    Ok(entry)
}

impl FlowEntry {
    /// Whether a `:` may directly follow this entry.
    pub(crate) fn is_json_like(&self) -> bool {
        match self {
            FlowEntry::Scalar(_, scalar) => scalar.style != ScalarStyle::Plain,
            FlowEntry::Collection(..) => true,
            FlowEntry::Alias(..) | FlowEntry::Empty(..) => false,
        }
    }

    pub(crate) fn is_bare(&self) -> bool {
        matches!(self, FlowEntry::Empty(props, _) if props.is_empty())
    }
}

/// Emit a flow entry as a value. A collection is handed back for the caller
/// to push, with its anchor capture already started.
pub(crate) fn emit_flow_value(state: &mut ReaderState<'_>, entry: FlowEntry) -> Result<Option<Reader>> {
    match entry {
        FlowEntry::Scalar(props, scalar) => emit_scalar(state, props, &scalar)?,
        FlowEntry::Alias(name, mark) => state.replay_alias(&name, mark)?,
        FlowEntry::Empty(props, mark) => emit_empty(state, props, mark)?,
        FlowEntry::Collection(anchor, reader) => {
            if let Some(name) = anchor {
                state.begin_capture(name);
            }
            return Ok(Some(reader));
        }
    }
    Ok(None)
}

/// Emit a flow entry as a key. A collection is opened as a complex key; the
/// caller pushes it and emits the closing [`Token::EndComplexFieldName`].
pub(crate) fn emit_flow_key(
    state: &mut ReaderState<'_>,
    entry: FlowEntry,
) -> Result<(KeyName, Option<Reader>)> {
    match entry {
        FlowEntry::Scalar(props, scalar) => Ok((emit_scalar_key(state, props, &scalar)?, None)),
        FlowEntry::Alias(name, mark) => Ok((emit_alias_key(state, &name, mark)?, None)),
        FlowEntry::Empty(props, mark) => {
            Ok((emit_scalar_key(state, props, &ScalarText::empty(mark))?, None))
        }
        FlowEntry::Collection(anchor, reader) => {
            state.emit(Token::StartComplexFieldName);
            if let Some(name) = anchor {
                state.begin_capture(name);
            }
            Ok((KeyName::Complex, Some(reader)))
        }
    }
}

/// What the node on the current line is allowed to become.
#[derive(Copy, Clone, Debug)]
struct LineContext {
    /// Indent of the enclosing block collection, -1 at the document root.
    parent_indent: isize,
    /// Reading an implicit key of an established mapping.
    key_mode: bool,
    /// Whether the first line may open a mapping.
    keys: bool,
    /// Whether the first line may open a sequence.
    entries: bool,
    /// Whether `- ` at the parent's indent still belongs to this node.
    indentless: bool,
}

/// A flow collection opened on the node's line.
#[derive(Debug)]
struct OpenFlow {
    /// Its tokens are held back because it may turn out to be a key.
    deferred: bool,
    column: usize,
    line: u64,
    /// Properties from earlier lines, claimed by the mapping if it is a key.
    node_props: Props,
    own_anchor: bool,
    /// `node_props.tag` was handed to the collection.
    lent_tag: bool,
}

enum LinePhase {
    Start,
    AfterFlow(OpenFlow),
}

/// The facts of the line a node starts on.
struct NodeLine {
    column: usize,
    keys: bool,
    entries: bool,
    /// Properties from lines above, belonging to the whole node.
    node_props: Props,
    /// Properties in front of the content on this line.
    props: Props,
}

/// Reads one block node, which may start on a later line than its
/// properties. A scalar or flow collection followed by `: ` on the same
/// line becomes the first key of a new mapping.
pub(crate) struct LineReader {
    ctx: LineContext,
    phase: LinePhase,
}

impl LineReader {
    fn with(ctx: LineContext) -> Self {
        LineReader {
            ctx,
            phase: LinePhase::Start,
        }
    }

    /// The root node of a document. After `---` the node shares the marker's
    /// line and may not open a collection there.
    pub(crate) fn root(after_marker: bool) -> Self {
        LineReader::with(LineContext {
            parent_indent: -1,
            key_mode: false,
            keys: !after_marker,
            entries: !after_marker,
            indentless: false,
        })
    }

    /// The node after `- `.
    pub(crate) fn entry(indent: usize) -> Self {
        LineReader::with(LineContext {
            parent_indent: indent as isize,
            key_mode: false,
            keys: true,
            entries: true,
            indentless: false,
        })
    }

    /// The value after `key: `.
    pub(crate) fn value(indent: usize) -> Self {
        LineReader::with(LineContext {
            parent_indent: indent as isize,
            key_mode: false,
            keys: false,
            entries: false,
            indentless: true,
        })
    }

    /// The node after `? `.
    pub(crate) fn explicit_key(indent: usize) -> Self {
        LineReader::with(LineContext {
            parent_indent: indent as isize,
            key_mode: false,
            keys: true,
            entries: true,
            indentless: false,
        })
    }

    /// The value after the `: ` of an explicit key.
    pub(crate) fn explicit_value(indent: usize) -> Self {
        LineReader::with(LineContext {
            parent_indent: indent as isize,
            key_mode: false,
            keys: true,
            entries: true,
            indentless: true,
        })
    }

    /// An implicit key in a mapping whose first key is already read.
    pub(crate) fn key(indent: usize) -> Self {
        LineReader::with(LineContext {
            parent_indent: indent as isize,
            key_mode: true,
            keys: false,
            entries: false,
            indentless: false,
        })
    }

    pub(crate) fn read_until_token(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        match core::mem::replace(&mut self.phase, LinePhase::Start) {
            LinePhase::Start if self.ctx.key_mode => self.read_key(state),
            LinePhase::Start => self.read_node(state),
            LinePhase::AfterFlow(flow) => self.finish_flow(state, flow),
        }
    }

    pub(crate) fn handle_reader_interrupt(
        &mut self,
        state: &mut ReaderState<'_>,
    ) -> Result<Transition> {
        match core::mem::replace(&mut self.phase, LinePhase::Start) {
            LinePhase::Start if self.ctx.key_mode => state.error("could not find expected ':'"),
            LinePhase::Start => {
                let mark = state.mark;
                emit_empty(state, Props::default(), mark)?;
                Ok(Transition::Done(ChildOutcome::Node))
            }
            LinePhase::AfterFlow(flow) => self.finish_flow(state, flow),
        }
    }

    pub(crate) fn child_is_done_reading(
        &mut self,
        _state: &mut ReaderState<'_>,
        _outcome: ChildOutcome,
    ) -> Result<()> {
        Ok(())
    }

    fn continues(&self, state: &ReaderState<'_>) -> bool {
        if continues_below(state, self.ctx.parent_indent) {
            return true;
        }
        self.ctx.indentless
            && !state.at_end()
            && state.column() as isize == self.ctx.parent_indent
            && state.is('-')
            && is_blankz(state.peek(1))
    }

    fn read_node(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        let mut node_props = Props::default();
        let mut first_line = true;
        loop {
            state.skip_blanks()?;
            let column = state.column();
            let props = read_props(state, false)?;
            if !is_breakz(state.ch()) && !state.is('#') {
                if !first_line && self.ctx.parent_indent < 0 && state.document_indent.is_none() {
                    state.document_indent = Some(column);
                }
                let line = NodeLine {
                    column,
                    keys: self.ctx.keys || !first_line,
                    entries: self.ctx.entries || !first_line,
                    node_props,
                    props,
                };
                return self.dispatch(state, line);
            }
            node_props.merge(props)?;
            skip_to_content(state)?;
            if !self.continues(state) {
                let mark = state.mark;
                emit_empty(state, node_props, mark)?;
                return Ok(Transition::Done(ChildOutcome::Node));
            }
            first_line = false;
        }
    }

    fn dispatch(&mut self, state: &mut ReaderState<'_>, line: NodeLine) -> Result<Transition> {
        let mark = state.mark;
        let next = state.peek(1);
        match state.ch() {
            Some('-') if is_blankz(next) => {
                if !line.entries || !line.props.is_empty() {
                    return state.error("block sequence entries are not allowed in this context");
                }
                let mut node_props = line.node_props;
                node_props.begin_capture(state);
                state.emit(Token::start_array(node_props.tag));
                Ok(Transition::Replace(Reader::SequenceItems(SequenceItemsReader::new(
                    line.column,
                ))))
            }
            Some('?') if is_blankz(next) => {
                if !line.keys || !line.props.is_empty() {
                    return state.error("mapping keys are not allowed in this context");
                }
                open_map(state, line.node_props);
                Ok(Transition::Replace(Reader::MapItems(MapItemsReader::new(line.column))))
            }
            Some(':') if is_blankz(next) => {
                if !line.keys {
                    return state.error("mapping values are not allowed in this context");
                }
                open_map(state, line.node_props);
                let key = emit_scalar_key(state, line.props, &ScalarText::empty(mark))?;
                state.skip()?;
                Ok(Transition::Replace(Reader::MapItems(MapItemsReader::after_key(
                    line.column,
                    key,
                ))))
            }
            Some(indicator @ ('|' | '>')) => {
                let mut node_props = line.node_props;
                node_props.merge(line.props)?;
                let scalar = BlockScalarReader {
                    literal: indicator == '|',
                    parent_indent: self.ctx.parent_indent,
                }
                .read(state)?;
                emit_scalar(state, node_props, &scalar)?;
                skip_to_content(state)?;
                Ok(Transition::Done(ChildOutcome::Node))
            }
            Some(quote @ ('\'' | '"')) => {
                let scalar = read_quoted(state, quote == '\'')?;
                let separated = skip_separation(state)?;
                self.scalar_or_key(state, line, scalar, separated)
            }
            Some('*') => {
                if !line.props.is_empty() || !line.node_props.is_empty() {
                    return Error::invalid("found properties on an alias node", mark);
                }
                let name = read_anchor_name(state, true)?;
                let separated = skip_separation(state)?;
                if at_value_indicator(state) {
                    if !line.keys {
                        return state.error("mapping values are not allowed in this context");
                    }
                    open_map(state, Props::default());
                    let key = emit_alias_key(state, &name, mark)?;
                    state.skip()?;
                    return Ok(Transition::Replace(Reader::MapItems(MapItemsReader::after_key(
                        line.column,
                        key,
                    ))));
                }
                state.replay_alias(&name, mark)?;
                finish_line(state, separated)?;
                Ok(Transition::Done(ChildOutcome::Node))
            }
            Some('[' | '{') => self.open_flow(state, line),
            Some(ch @ ('@' | '`' | '%')) => reserved(state, ch),
            Some(ch @ (',' | ']' | '}')) => {
                state.error(format!("found unexpected '{ch}' outside a flow collection"))
            }
            _ => {
                let scalar = PlainScalarReader {
                    flow: false,
                    parent_indent: self.ctx.parent_indent,
                }
                .read(state)?;
                self.scalar_or_key(state, line, scalar, false)
            }
        }
    }

    fn scalar_or_key(
        &mut self,
        state: &mut ReaderState<'_>,
        line: NodeLine,
        scalar: ScalarText,
        separated: bool,
    ) -> Result<Transition> {
        if names_key(state, &scalar) {
            if !line.keys {
                return state.error("mapping values are not allowed in this context");
            }
            if scalar.multi_line {
                return Error::invalid("implicit keys must be on a single line", scalar.start);
            }
            open_map(state, line.node_props);
            let key = emit_scalar_key(state, line.props, &scalar)?;
            state.skip()?;
            return Ok(Transition::Replace(Reader::MapItems(MapItemsReader::after_key(
                line.column,
                key,
            ))));
        }
        let mut node_props = line.node_props;
        node_props.merge(line.props)?;
        emit_scalar(state, node_props, &scalar)?;
        if scalar.style == ScalarStyle::Plain {
            skip_to_content(state)?;
        } else {
            finish_line(state, separated)?;
        }
        Ok(Transition::Done(ChildOutcome::Node))
    }

    fn open_flow(&mut self, state: &mut ReaderState<'_>, line: NodeLine) -> Result<Transition> {
        let NodeLine {
            column,
            keys,
            node_props,
            mut props,
            ..
        } = line;
        let mut flow = OpenFlow {
            deferred: keys,
            column,
            line: state.mark.line,
            node_props: Props::default(),
            own_anchor: props.anchor.is_some(),
            lent_tag: false,
        };
        if keys {
            // Until the rest of the line is seen the collection may be a key.
            if props.tag.is_none() && node_props.tag.is_some() {
                props.tag = node_props.tag.clone();
                flow.lent_tag = true;
            }
            flow.node_props = node_props;
            state.begin_deferral();
        } else {
            props.merge(node_props)?;
        }
        props.begin_capture(state);
        let reader = if state.is('[') {
            Reader::FlowSequence(FlowSequenceReader::new(props.tag))
        } else {
            Reader::FlowMap(FlowMapReader::new(props.tag))
        };
        self.phase = LinePhase::AfterFlow(flow);
        Ok(Transition::Child(reader))
    }

    fn finish_flow(&mut self, state: &mut ReaderState<'_>, flow: OpenFlow) -> Result<Transition> {
        let held = flow.deferred.then(|| state.end_deferral());
        let separated = skip_separation(state)?;
        if at_value_indicator(state) {
            if self.ctx.key_mode {
                state.emit(Token::EndComplexFieldName);
                state.skip()?;
                return Ok(Transition::Done(ChildOutcome::Key(KeyName::Complex)));
            }
            let Some(mut held) = held else {
                return state.error("mapping values are not allowed in this context");
            };
            if state.mark.line != flow.line {
                return state.error("implicit keys must be on a single line");
            }
            if flow.lent_tag {
                if let Some(first) = held.first_mut() {
                    *first = untagged(first);
                }
            }
            let recorded = held.len();
            let mut tokens = Vec::with_capacity(recorded + 3);
            tokens.push(Token::start_object(flow.node_props.tag));
            tokens.push(Token::StartComplexFieldName);
            tokens.extend(held);
            tokens.push(Token::EndComplexFieldName);
            state.emit_rewritten(recorded, tokens, flow.node_props.anchor);
            state.skip()?;
            return Ok(Transition::Replace(Reader::MapItems(MapItemsReader::after_key(
                flow.column,
                KeyName::Complex,
            ))));
        }
        if self.ctx.key_mode {
            return state.error("could not find expected ':'");
        }
        if let Some(held) = held {
            let node_props = flow.node_props;
            if node_props.anchor.is_some() && flow.own_anchor {
                return Error::invalid(
                    "found duplicate anchor on a node",
                    node_props.mark.unwrap_or_default(),
                );
            }
            if node_props.tag.is_some() && !flow.lent_tag {
                return Error::invalid(
                    "found duplicate tag on a node",
                    node_props.mark.unwrap_or_default(),
                );
            }
            if let Some(name) = node_props.anchor {
                state.store_anchor(name, held.clone());
            }
            state.flush(held);
        }
        finish_line(state, separated)?;
        Ok(Transition::Done(ChildOutcome::Node))
    }

    fn read_key(&mut self, state: &mut ReaderState<'_>) -> Result<Transition> {
        let mut props = read_props(state, false)?;
        let mark = state.mark;
        match state.ch() {
            Some(quote @ ('\'' | '"')) => {
                let scalar = read_quoted(state, quote == '\'')?;
                state.skip_blanks()?;
                finish_key(state, props, &scalar)
            }
            Some('*') => {
                if !props.is_empty() {
                    return Error::invalid("found properties on an alias node", mark);
                }
                let name = read_anchor_name(state, true)?;
                state.skip_blanks()?;
                if !at_value_indicator(state) {
                    return state.error("could not find expected ':'");
                }
                let key = emit_alias_key(state, &name, mark)?;
                state.skip()?;
                Ok(Transition::Done(ChildOutcome::Key(key)))
            }
            Some('[' | '{') => {
                state.emit(Token::StartComplexFieldName);
                props.begin_capture(state);
                let reader = if state.is('[') {
                    Reader::FlowSequence(FlowSequenceReader::new(props.tag))
                } else {
                    Reader::FlowMap(FlowMapReader::new(props.tag))
                };
                self.phase = LinePhase::AfterFlow(OpenFlow {
                    deferred: false,
                    column: mark.column,
                    line: mark.line,
                    node_props: Props::default(),
                    own_anchor: false,
                    lent_tag: false,
                });
                Ok(Transition::Child(reader))
            }
            Some(ch @ ('@' | '`' | '%')) => reserved(state, ch),
            Some(ch @ (',' | ']' | '}')) => {
                state.error(format!("found unexpected '{ch}' outside a flow collection"))
            }
            None | Some('\n' | '#' | '|' | '>') => state.error("could not find expected ':'"),
            _ => {
                let scalar = PlainScalarReader {
                    flow: false,
                    parent_indent: self.ctx.parent_indent,
                }
                .read(state)?;
                finish_key(state, props, &scalar)
            }
        }
    }
}

fn finish_key(state: &mut ReaderState<'_>, props: Props, scalar: &ScalarText) -> Result<Transition> {
    if !names_key(state, scalar) {
        return state.error("could not find expected ':'");
    }
    if scalar.multi_line {
        return Error::invalid("implicit keys must be on a single line", scalar.start);
    }
    let key = emit_scalar_key(state, props, scalar)?;
    state.skip()?;
    Ok(Transition::Done(ChildOutcome::Key(key)))
}

/// Whether the `: ` at the cursor follows `scalar`. A plain scalar that
/// ended at a line break leaves the cursor on a later line, where a `:`
/// belongs to the enclosing mapping unless the scalar was folded onto it.
fn names_key(state: &ReaderState<'_>, scalar: &ScalarText) -> bool {
    at_value_indicator(state) && (scalar.multi_line || scalar.start.line == state.mark.line)
}

fn open_map(state: &mut ReaderState<'_>, mut node_props: Props) {
    node_props.begin_capture(state);
    state.emit(Token::start_object(node_props.tag));
}

/// The same collection start without its tag.
fn untagged(token: &Token) -> Token {
    match token {
        Token::StartObject(_) => Token::SimpleStartObject,
        Token::StartArray(_) => Token::SimpleStartArray,
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoreTag, StrSource};

    fn state(input: &str) -> ReaderState<'_> {
        let mut state = ReaderState::new(Box::new(StrSource::new(input)));
        state.fill().unwrap();
        state
    }

    #[test]
    fn props_in_either_order() {
        let mut state = state("!!str &a x");
        let props = read_props(&mut state, false).unwrap();
        assert_eq!(props.anchor.as_deref(), Some("a"));
        assert_eq!(props.tag, Some(TagType::Core(CoreTag::Str)));
        assert_eq!(state.ch(), Some('x'));
    }

    #[test]
    fn second_anchor_is_rejected() {
        let mut state = state("&a &b x");
        let err = read_props(&mut state, false).unwrap_err();
        assert_eq!(err.problem(), Some("found duplicate anchor on a node"));
    }

    #[test]
    fn tagged_scalars_are_validated() {
        let props = Props {
            tag: Some(TagType::Core(CoreTag::Int)),
            ..Props::default()
        };
        let scalar = ScalarText {
            text: "forty".into(),
            style: ScalarStyle::Plain,
            multi_line: false,
            start: Mark::default(),
        };
        let err = scalar_token(&props, &scalar).unwrap_err();
        assert_eq!(err.problem(), Some("invalid !!int value 'forty'"));
    }

    #[test]
    fn quoted_scalars_stay_strings() {
        let scalar = ScalarText {
            text: "42".into(),
            style: ScalarStyle::DoubleQuoted,
            multi_line: false,
            start: Mark::default(),
        };
        assert_eq!(
            scalar_token(&Props::default(), &scalar).unwrap(),
            Token::Value(ScalarValue::String("42".into()), ValueType::String)
        );
    }

    #[test]
    fn single_values_make_simple_keys() {
        let int = Token::Value(ScalarValue::Int(7), ValueType::Int);
        let (key, tokens) = key_tokens(vec![int], None);
        assert_eq!(key, KeyName::Simple(Some("7".into())));
        assert_eq!(tokens, vec![Token::FieldName(Some("7".into()))]);

        let float = Token::Value(ScalarValue::Float(1.0), ValueType::Float);
        let (key, tokens) = key_tokens(vec![float], Some(KeyName::Simple(Some("1.0".into()))));
        assert_eq!(key, KeyName::Simple(Some("1.0".into())));
        assert_eq!(tokens, vec![Token::FieldName(Some("1.0".into()))]);

        let (key, tokens) = key_tokens(vec![Token::SimpleStartArray, Token::EndArray], None);
        assert_eq!(key, KeyName::Complex);
        assert_eq!(
            tokens,
            vec![
                Token::StartComplexFieldName,
                Token::SimpleStartArray,
                Token::EndArray,
                Token::EndComplexFieldName,
            ]
        );
    }

    #[test]
    fn flow_space_skips_comments_and_breaks() {
        let mut state = state("  # note\n\t x");
        skip_flow_space(&mut state).unwrap();
        assert_eq!(state.ch(), Some('x'));
    }

    #[test]
    fn flow_entries() {
        let mut state = state("&a 'q', ]");
        match read_flow_entry(&mut state).unwrap() {
            FlowEntry::Scalar(props, scalar) => {
                assert_eq!(props.anchor.as_deref(), Some("a"));
                assert_eq!(scalar.text, "q");
                assert_eq!(scalar.style, ScalarStyle::SingleQuoted);
            }
            _ => panic!("expected a scalar"),
        }
        state.skip().unwrap();
        state.skip_blanks().unwrap();
        assert!(matches!(read_flow_entry(&mut state).unwrap(), FlowEntry::Empty(..)));
    }
}

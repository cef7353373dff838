use alloc::string::String;

use crate::chars::{is_blank, is_blankz, is_break, is_flow_indicator, is_tab};
use crate::state::ReaderState;
use crate::Result;

use super::node::{ScalarStyle, ScalarText};

/// Reads an unquoted scalar.
///
/// The scalar ends at `: `, at a comment, at a document marker, at a line
/// indented no deeper than the enclosing block (block context) or at a
/// flow indicator (flow context). Line breaks fold like in quoted scalars.
/// Running out of input simply ends the scalar.
pub(crate) struct PlainScalarReader {
    pub(crate) flow: bool,
    /// Indent of the enclosing block collection, -1 at the document root.
    pub(crate) parent_indent: isize,
}

impl PlainScalarReader {
    pub(crate) fn read(&self, state: &mut ReaderState<'_>) -> Result<ScalarText> {
        let start = state.mark;
        let mut text = String::new();
        let mut leading_break = false;
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut multi_line = false;
        let indent = self.parent_indent + 1;

        loop {
            if state.at_document_marker().is_some() || state.is('#') {
                break;
            }
            while !is_blankz(state.ch()) {
                if self.ends_here(state) {
                    break;
                }
                if leading_break {
                    if trailing_breaks.is_empty() {
                        text.push(' ');
                    } else {
                        text.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                    leading_break = false;
                    multi_line = true;
                } else if !whitespaces.is_empty() {
                    text.push_str(&whitespaces);
                    whitespaces.clear();
                }
                state.read_into(&mut text)?;
            }
            if !is_blank(state.ch()) && !is_break(state.ch()) {
                break;
            }
            while is_blank(state.ch()) || is_break(state.ch()) {
                if is_blank(state.ch()) {
                    if leading_break && (state.column() as isize) < indent && is_tab(state.ch()) {
                        return state.error("found a tab character that violates indentation");
                    }
                    if leading_break {
                        state.skip()?;
                    } else {
                        state.read_into(&mut whitespaces)?;
                    }
                } else if leading_break {
                    state.read_into(&mut trailing_breaks)?;
                } else {
                    whitespaces.clear();
                    state.skip()?;
                    leading_break = true;
                }
            }
            if !self.flow && (state.column() as isize) < indent {
                break;
            }
        }

        Ok(ScalarText {
            text,
            style: ScalarStyle::Plain,
            multi_line,
            start,
        })
    }

    fn ends_here(&self, state: &ReaderState<'_>) -> bool {
        let next = state.peek(1);
        if state.is(':') && (is_blankz(next) || self.flow && is_flow_indicator(next)) {
            return true;
        }
        self.flow && is_flow_indicator(state.ch())
    }
}

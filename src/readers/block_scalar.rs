use alloc::string::String;

use crate::chars::{is_blank, is_break, is_breakz};
use crate::state::ReaderState;
use crate::Result;

use super::comment::read_comment;
use super::node::{ScalarStyle, ScalarText};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// Reads a literal (`|`) or folded (`>`) block scalar.
///
/// The cursor starts on the indicator. Afterwards it rests on the first
/// non-space character of the line that ended the scalar, or at the end of
/// input.
pub(crate) struct BlockScalarReader {
    pub(crate) literal: bool,
    /// Indent of the enclosing block collection, -1 at the document root.
    pub(crate) parent_indent: isize,
}

impl BlockScalarReader {
    pub(crate) fn read(&self, state: &mut ReaderState<'_>) -> Result<ScalarText> {
        let start = state.mark;
        state.skip()?;
        let (chomping, increment) = read_header(state)?;

        let mut indent = match increment {
            Some(increment) if self.parent_indent >= 0 => self.parent_indent as usize + increment,
            Some(increment) => increment,
            None => 0,
        };
        let mut text = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut leading_blank = false;

        self.read_breaks(state, &mut indent, &mut trailing_breaks)?;
        while state.column() == indent && !state.at_end() {
            let trailing_blank = is_blank(state.ch());
            if !self.literal && leading_break == "\n" && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    text.push(' ');
                }
            } else {
                text.push_str(&leading_break);
            }
            leading_break.clear();
            text.push_str(&trailing_breaks);
            trailing_breaks.clear();

            leading_blank = is_blank(state.ch());
            while !is_breakz(state.ch()) {
                state.read_into(&mut text)?;
            }
            if is_break(state.ch()) {
                state.read_into(&mut leading_break)?;
            }
            self.read_breaks(state, &mut indent, &mut trailing_breaks)?;
        }

        let ended_early = !state.at_end()
            && !state.is('#')
            && state.at_document_marker().is_none()
            && state.column() as isize > self.parent_indent;
        if ended_early {
            return state.error("found a block scalar line with insufficient indentation");
        }

        match chomping {
            Chomping::Strip => {}
            Chomping::Clip => text.push_str(&leading_break),
            Chomping::Keep => {
                text.push_str(&leading_break);
                text.push_str(&trailing_breaks);
            }
        }

        Ok(ScalarText {
            text,
            style: if self.literal {
                ScalarStyle::Literal
            } else {
                ScalarStyle::Folded
            },
            multi_line: true,
            start,
        })
    }

    /// Consume empty lines and indentation. With `indent == 0` the
    /// indentation is detected from the first content line.
    fn read_breaks(
        &self,
        state: &mut ReaderState<'_>,
        indent: &mut usize,
        breaks: &mut String,
    ) -> Result<()> {
        let mut max_indent = 0;
        loop {
            while (*indent == 0 || state.column() < *indent) && state.is(' ') {
                state.skip()?;
            }
            max_indent = max_indent.max(state.column());
            if (*indent == 0 || state.column() < *indent) && state.is('\t') {
                return state.error("found a tab character where an indentation space is expected");
            }
            if !is_break(state.ch()) {
                break;
            }
            state.read_into(breaks)?;
        }
        if *indent == 0 {
            *indent = max_indent.max((self.parent_indent + 1).max(1) as usize);
        }
        Ok(())
    }
}

/// The indicators after `|` or `>`, in either order, then the rest of the
/// header line.
fn read_header(state: &mut ReaderState<'_>) -> Result<(Chomping, Option<usize>)> {
    let mut chomping = None;
    let mut increment = None;
    loop {
        match state.ch() {
            Some(indicator @ ('+' | '-')) => {
                if chomping.is_some() {
                    return state.error("found duplicate chomping indicator in a block scalar header");
                }
                chomping = Some(if indicator == '+' {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                });
            }
            Some('0') => return state.error("found an indentation indicator equal to 0"),
            Some(digit @ '1'..='9') => {
                if increment.is_some() {
                    return state
                        .error("found duplicate indentation indicator in a block scalar header");
                }
                increment = digit.to_digit(10).map(|digit| digit as usize);
            }
            _ => break,
        }
        state.skip()?;
    }

    state.skip_blanks()?;
    if state.is('#') {
        read_comment(state)?;
    }
    if !is_breakz(state.ch()) {
        return state.error("did not find expected comment or line break after a block scalar header");
    }
    if is_break(state.ch()) {
        state.skip()?;
    }
    Ok((chomping.unwrap_or(Chomping::Clip), increment))
}

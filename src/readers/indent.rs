//! Indentation measurement between block nodes.
//!
//! Block readers never hand each other a counted indent. After a node ends
//! the cursor is left on the first character of the next content line, so
//! the measured indentation is simply the cursor column.

use crate::chars::{is_blank, is_break, is_breakz};
use crate::state::ReaderState;
use crate::Result;

use super::comment::read_comment;

/// Move past blanks, comment lines, empty lines and the indentation of the
/// next content line.
pub(crate) fn skip_to_content(state: &mut ReaderState<'_>) -> Result<()> {
    let mut indenting = state.column() == 0;
    let mut tab = None;
    loop {
        while is_blank(state.ch()) {
            if indenting && state.is('\t') && tab.is_none() {
                tab = Some(state.mark);
            }
            state.skip()?;
        }
        if state.is('#') {
            read_comment(state)?;
        }
        if !is_break(state.ch()) {
            break;
        }
        state.skip()?;
        indenting = true;
        tab = None;
    }
    match tab {
        Some(mark) if !state.at_end() => {
            crate::Error::invalid("found a tab character that violates indentation", mark)
        }
        _ => Ok(()),
    }
}

/// End a line after a node that must not be followed by more content.
/// `separated` tells whether blanks were already skipped after the node.
pub(crate) fn finish_line(state: &mut ReaderState<'_>, separated: bool) -> Result<()> {
    let separated = separated || is_blank(state.ch());
    state.skip_blanks()?;
    if state.is('#') {
        if !separated {
            return state.error("comments must be separated from other tokens by white space");
        }
    } else if !is_breakz(state.ch()) {
        return state.error("did not find expected comment or line break");
    }
    skip_to_content(state)
}

/// Whether a node whose block parent sits at `parent_indent` continues on
/// the current line.
pub(crate) fn continues_below(state: &ReaderState<'_>, parent_indent: isize) -> bool {
    !state.at_end()
        && state.at_document_marker().is_none()
        && state.column() as isize > parent_indent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrSource;

    fn state(input: &str) -> ReaderState<'_> {
        let mut state = ReaderState::new(Box::new(StrSource::new(input)));
        state.fill().unwrap();
        state
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let mut state = state("  # note\n\n   \n    key: value");
        skip_to_content(&mut state).unwrap();
        assert_eq!(state.column(), 4);
        assert_eq!(state.mark.line, 3);
        assert_eq!(state.ch(), Some('k'));
    }

    #[test]
    fn rejects_tab_indentation() {
        let mut state = state("\n\tkey: value");
        let err = skip_to_content(&mut state).unwrap_err();
        assert_eq!(err.problem(), Some("found a tab character that violates indentation"));
    }

    #[test]
    fn tabs_on_blank_lines_are_fine() {
        let mut state = state("\n\t\n  x");
        skip_to_content(&mut state).unwrap();
        assert_eq!(state.ch(), Some('x'));
    }

    #[test]
    fn trailing_content_is_rejected() {
        let mut state = state("x\"y");
        state.skip().unwrap();
        let err = finish_line(&mut state, false).unwrap_err();
        assert_eq!(err.problem(), Some("did not find expected comment or line break"));
    }

    #[test]
    fn comments_need_separation() {
        let mut state = state("x# note\ny");
        state.skip().unwrap();
        let err = finish_line(&mut state, false).unwrap_err();
        assert_eq!(
            err.problem(),
            Some("comments must be separated from other tokens by white space")
        );
        let mut state = self::state("x# note\ny");
        state.skip().unwrap();
        finish_line(&mut state, true).unwrap();
        assert_eq!(state.ch(), Some('y'));
    }

    #[test]
    fn measures_document_markers_as_the_end() {
        let mut state = state("\n---\n");
        skip_to_content(&mut state).unwrap();
        assert!(!continues_below(&state, -1));
    }
}

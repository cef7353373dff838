use alloc::string::String;

use crate::chars::{as_hex, is_blank, is_blankz, is_break, is_hex};
use crate::state::ReaderState;
use crate::Result;

use super::node::{ScalarStyle, ScalarText};

/// Read a single- or double-quoted scalar. The cursor is on the opening
/// quote and ends up after the closing one.
///
/// Input running out before the closing quote is an error: a partial
/// quoted scalar cannot be closed safely.
pub(crate) fn read_quoted(state: &mut ReaderState<'_>, single: bool) -> Result<ScalarText> {
    let start = state.mark;
    let quote = if single { '\'' } else { '"' };
    let mut text = String::new();
    let mut trailing_breaks = String::new();
    let mut whitespaces = String::new();
    let mut multi_line = false;
    state.skip()?;

    loop {
        if state.at_document_marker().is_some() {
            return state.error("found unexpected document indicator inside a quoted scalar");
        }
        if state.at_end() {
            return state.error("found unexpected end of stream inside a quoted scalar");
        }
        let mut leading_blanks = false;
        while !is_blankz(state.ch()) {
            if single && state.is('\'') && state.peek(1) == Some('\'') {
                text.push('\'');
                state.skip()?;
                state.skip()?;
            } else if state.is(quote) {
                break;
            } else if !single && state.is('\\') && is_break(state.peek(1)) {
                state.skip()?;
                state.skip()?;
                leading_blanks = true;
                multi_line = true;
                break;
            } else if !single && state.is('\\') {
                read_escape(state, &mut text)?;
            } else {
                state.read_into(&mut text)?;
            }
        }
        if state.is(quote) {
            break;
        }

        let mut leading_break = false;
        while is_blank(state.ch()) || is_break(state.ch()) {
            if is_blank(state.ch()) {
                if leading_blanks {
                    state.skip()?;
                } else {
                    state.read_into(&mut whitespaces)?;
                }
            } else {
                multi_line = true;
                if leading_blanks {
                    state.read_into(&mut trailing_breaks)?;
                } else {
                    whitespaces.clear();
                    state.skip()?;
                    leading_blanks = true;
                    leading_break = true;
                }
            }
        }
        if leading_blanks {
            if leading_break && trailing_breaks.is_empty() {
                text.push(' ');
            } else {
                text.push_str(&trailing_breaks);
                trailing_breaks.clear();
            }
        } else {
            text.push_str(&whitespaces);
            whitespaces.clear();
        }
    }

    state.skip()?;
    Ok(ScalarText {
        text,
        style: if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        },
        multi_line,
        start,
    })
}

/// Decode one backslash escape. Unknown escapes are kept as written.
fn read_escape(state: &mut ReaderState<'_>, text: &mut String) -> Result<()> {
    let Some(code) = state.peek(1) else {
        return state.error("found unexpected end of stream inside a quoted scalar");
    };
    let decoded = match code {
        '0' => '\0',
        'a' => '\x07',
        'b' => '\x08',
        't' | '\t' => '\t',
        'n' => '\n',
        'v' => '\x0B',
        'f' => '\x0C',
        'r' => '\r',
        'e' => '\x1B',
        ' ' => ' ',
        '"' => '"',
        '/' => '/',
        '\\' => '\\',
        'N' => '\u{0085}',
        '_' => '\u{00A0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        'x' | 'u' | 'U' => {
            state.skip()?;
            state.skip()?;
            let length = match code {
                'x' => 2,
                'u' => 4,
                _ => 8,
            };
            return read_code_point(state, length, text);
        }
        _ => {
            text.push('\\');
            text.push(code);
            state.skip()?;
            return state.skip();
        }
    };
    text.push(decoded);
    state.skip()?;
    state.skip()
}

fn read_code_point(state: &mut ReaderState<'_>, length: usize, text: &mut String) -> Result<()> {
    let mut value = 0u32;
    for _ in 0..length {
        match state.ch() {
            Some(digit) if is_hex(digit) => {
                value = (value << 4) + as_hex(digit);
                state.skip()?;
            }
            _ => return state.error("did not find expected hexadecimal number in an escape"),
        }
    }
    match char::from_u32(value) {
        Some(ch) => {
            text.push(ch);
            Ok(())
        }
        None => state.error("found invalid Unicode character escape code"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrSource;

    fn read(input: &str) -> Result<ScalarText> {
        let mut state = ReaderState::new(Box::new(StrSource::new(input)));
        state.fill()?;
        read_quoted(&mut state, input.starts_with('\''))
    }

    #[test]
    fn single_quotes_only_escape_quotes() {
        let scalar = read(r"'it''s \n'").unwrap();
        assert_eq!(scalar.text, r"it's \n");
        assert!(!scalar.multi_line);
    }

    #[test]
    fn double_quote_escapes() {
        let scalar = read(r#""tab\there \x41☺\U0001F600 \/ \q""#).unwrap();
        assert_eq!(scalar.text, "tab\there A\u{263A}\u{1F600} / \\q");
    }

    #[test]
    fn folds_line_breaks() {
        let scalar = read("\"one\n  two\n\n  three\"").unwrap();
        assert_eq!(scalar.text, "one two\nthree");
        assert!(scalar.multi_line);
    }

    #[test]
    fn escaped_line_break_joins_lines() {
        let scalar = read("\"one\\\n   two\"").unwrap();
        assert_eq!(scalar.text, "onetwo");
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = read("'open").err().unwrap();
        assert_eq!(
            err.problem(),
            Some("found unexpected end of stream inside a quoted scalar")
        );
    }
}

pub(crate) fn is_alpha(ch: impl Into<Option<char>>) -> bool {
    matches!(ch.into(), Some('0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '-'))
}

pub(crate) fn is_digit(ch: impl Into<Option<char>>) -> bool {
    matches!(ch.into(), Some('0'..='9'))
}

pub(crate) fn is_hex(ch: impl Into<Option<char>>) -> bool {
    matches!(ch.into(), Some('0'..='9' | 'A'..='F' | 'a'..='f'))
}

pub(crate) fn as_hex(ch: char) -> u32 {
    ch.to_digit(16).unwrap_or(0)
}

pub(crate) fn is_space(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some(' ')
}

pub(crate) fn is_tab(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some('\t')
}

pub(crate) fn is_blank(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_space(ch) || is_tab(ch)
}

/// Line breaks are normalised to `\n` before any reader sees them.
pub(crate) fn is_break(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some('\n')
}

pub(crate) fn is_breakz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_break(ch) || ch.is_none()
}

pub(crate) fn is_blankz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_blank(ch) || is_breakz(ch)
}

pub(crate) fn is_flow_indicator(ch: impl Into<Option<char>>) -> bool {
    matches!(ch.into(), Some(',' | '[' | ']' | '{' | '}'))
}

/// Characters allowed in a tag suffix or `%TAG` prefix, besides `%xx`
/// escapes.
pub(crate) fn is_uri_char(ch: impl Into<Option<char>>, flow_indicators: bool) -> bool {
    let ch = ch.into();
    is_alpha(ch)
        || matches!(
            ch,
            Some(
                ';' | '/'
                    | '?'
                    | ':'
                    | '@'
                    | '&'
                    | '='
                    | '+'
                    | '$'
                    | '.'
                    | '%'
                    | '!'
                    | '~'
                    | '*'
                    | '\''
                    | '('
                    | ')'
                    | '#'
            )
        )
        || flow_indicators && is_flow_indicator(ch)
}

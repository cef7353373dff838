use alloc::string::String;

use crate::chars::{is_alpha, is_blank, is_blankz, is_breakz, is_digit};
use crate::state::ReaderState;
use crate::{Result, VersionDirective};

use super::comment::read_comment;
use super::tag::{read_tag_handle, read_tag_uri};

const MAX_NUMBER_LENGTH: usize = 9;

/// Read one `%` directive line, including its line break.
pub(crate) fn read_directive(state: &mut ReaderState<'_>) -> Result<()> {
    let start = state.mark;
    state.skip()?;
    let name = read_directive_name(state)?;
    match name.as_str() {
        "YAML" => {
            if state.version.is_some() {
                return crate::Error::invalid("found duplicate %YAML directive", start);
            }
            let version = read_version_directive_value(state)?;
            if version.major != 1 {
                return crate::Error::invalid("found incompatible YAML document", start);
            }
            if version.minor > 2 {
                tracing::warn!(
                    major = version.major,
                    minor = version.minor,
                    "reading a newer YAML version as 1.2"
                );
            }
            tracing::debug!(major = version.major, minor = version.minor, "%YAML directive");
            state.version = Some(version);
        }
        "TAG" => {
            let (handle, prefix) = read_tag_directive_value(state)?;
            tracing::debug!(%handle, %prefix, "%TAG directive");
            state.register_tag_handle(handle, prefix, start)?;
        }
        _ => {
            tracing::warn!(directive = %name, line = start.line + 1, "ignoring unknown directive");
            read_comment(state)?;
        }
    }
    state.skip_blanks()?;
    if state.is('#') {
        read_comment(state)?;
    }
    if !is_breakz(state.ch()) {
        return state.error("did not find expected comment or line break after a directive");
    }
    state.skip()
}

fn read_directive_name(state: &mut ReaderState<'_>) -> Result<String> {
    let mut name = String::new();
    while is_alpha(state.ch()) {
        state.read_into(&mut name)?;
    }
    if name.is_empty() {
        state.error("could not find expected directive name")
    } else if !is_blankz(state.ch()) {
        state.error("found unexpected non-alphabetical character in a directive name")
    } else {
        Ok(name)
    }
}

fn read_version_directive_value(state: &mut ReaderState<'_>) -> Result<VersionDirective> {
    state.skip_blanks()?;
    let major = read_version_number(state)?;
    if !state.is('.') {
        return state.error("did not find expected digit or '.' character");
    }
    state.skip()?;
    let minor = read_version_number(state)?;
    Ok(VersionDirective { major, minor })
}

fn read_version_number(state: &mut ReaderState<'_>) -> Result<u32> {
    let mut value = 0u32;
    let mut length = 0;
    while let Some(digit) = state.ch().filter(|&ch| is_digit(ch)) {
        length += 1;
        if length > MAX_NUMBER_LENGTH {
            return state.error("found extremely long version number");
        }
        value = value * 10 + digit.to_digit(10).unwrap_or(0);
        state.skip()?;
    }
    if length == 0 {
        return state.error("did not find expected version number");
    }
    Ok(value)
}

/// `%TAG handle prefix`, as `(handle, prefix)`.
fn read_tag_directive_value(state: &mut ReaderState<'_>) -> Result<(String, String)> {
    state.skip_blanks()?;
    let handle = read_tag_handle(state, true)?;
    if !is_blank(state.ch()) {
        return state.error("did not find expected whitespace after a %TAG handle");
    }
    state.skip_blanks()?;
    let prefix = read_tag_uri(state, true, true, "")?;
    if prefix.is_empty() {
        return state.error("did not find expected %TAG prefix");
    }
    if !is_blankz(state.ch()) {
        return state.error("did not find expected whitespace or line break after a %TAG prefix");
    }
    Ok((handle, prefix))
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
    fn version_directive() {
        let mut state = state("%YAML 1.2 # comment\n---");
        read_directive(&mut state).unwrap();
        assert_eq!(state.version, Some(VersionDirective { major: 1, minor: 2 }));
        assert_eq!(state.mark.line, 1);
    }

    #[test]
    fn incompatible_version() {
        let mut state = state("%YAML 2.0\n");
        let err = read_directive(&mut state).unwrap_err();
        assert_eq!(err.problem(), Some("found incompatible YAML document"));
    }

    #[test]
    fn tag_directive_registers_handle() {
        let mut state = state("%TAG !e! tag:example.com,2000:app/\n");
        read_directive(&mut state).unwrap();
        assert_eq!(state.tag_prefix("!e!").as_deref(), Some("tag:example.com,2000:app/"));
    }

    #[test]
    fn duplicate_tag_handle_points_at_the_directive() {
        let mut state = state("%TAG !e! a:\n%TAG !e! b:\n");
        read_directive(&mut state).unwrap();
        let err = read_directive(&mut state).unwrap_err();
        assert_eq!(err.problem(), Some("found duplicate %TAG directive for handle '!e!'"));
        let mark = err.mark().unwrap();
        assert_eq!((mark.line, mark.column), (1, 0));
    }

    #[test]
    fn malformed_tag_handle() {
        let mut state = state("%TAG !e tag:example.com,2000:\n");
        let err = read_directive(&mut state).unwrap_err();
        assert_eq!(err.problem(), Some("did not find expected '!' closing the tag handle"));
    }

    #[test]
    fn unknown_directives_are_skipped() {
        let mut state = state("%FOO bar baz\nx");
        read_directive(&mut state).unwrap();
        assert_eq!(state.ch(), Some('x'));
    }
}

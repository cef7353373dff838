use alloc::string::String;
use alloc::vec::Vec;

use crate::chars::{as_hex, is_alpha, is_blankz, is_hex, is_uri_char};
use crate::state::ReaderState;
use crate::{Error, Result, TagType, YAML_TAG_PREFIX};

/// Read a node tag. The cursor is on the `!`.
///
/// Accepts the non-specific tag `!`, the primary (`!name`), secondary
/// (`!!name`) and named (`!handle!name`) shorthands, and verbatim tags
/// (`!<uri>`).
pub(crate) fn read_tag(state: &mut ReaderState<'_>, flow: bool) -> Result<TagType> {
    let start = state.mark;
    let (prefix, suffix) = if state.peek(1) == Some('<') {
        state.skip()?;
        state.skip()?;
        let uri = read_tag_uri(state, true, false, "")?;
        if uri.is_empty() {
            return state.error("did not find expected tag URI");
        }
        if !state.is('>') {
            return state.error("did not find the expected '>'");
        }
        state.skip()?;
        let (prefix, name) = split_verbatim(&uri);
        (String::from(prefix), String::from(name))
    } else {
        let handle = read_tag_handle(state, false)?;
        if handle.len() > 1 && handle.ends_with('!') {
            let suffix = read_tag_uri(state, false, false, "")?;
            if suffix.is_empty() {
                return state.error("did not find expected tag URI");
            }
            let Some(prefix) = state.tag_prefix(&handle) else {
                return Error::invalid(format!("found undefined tag handle '{handle}'"), start);
            };
            (prefix, suffix)
        } else {
            // The characters read after a lone `!` start the suffix.
            let suffix = read_tag_uri(state, false, false, &handle[1..])?;
            if suffix.is_empty() {
                check_terminated(state, flow)?;
                return Ok(TagType::NonSpecific);
            }
            let prefix = state.tag_prefix("!").unwrap_or_else(|| String::from("!"));
            (prefix, suffix)
        }
    };
    if suffix.contains('!') {
        return Error::invalid("found a malformed tag", start);
    }
    check_terminated(state, flow)?;
    Ok(state.resolve_tag(&prefix, &suffix))
}

fn check_terminated(state: &ReaderState<'_>, flow: bool) -> Result<()> {
    if is_blankz(state.ch()) || flow && matches!(state.ch(), Some(',' | ']' | '}')) {
        Ok(())
    } else {
        state.error("did not find expected whitespace or line break after a tag")
    }
}

fn split_verbatim(uri: &str) -> (&str, &str) {
    if let Some(name) = uri.strip_prefix(YAML_TAG_PREFIX) {
        (YAML_TAG_PREFIX, name)
    } else if let Some(name) = uri.strip_prefix('!') {
        ("!", name)
    } else {
        ("", uri)
    }
}

/// `!`, `!!` or `!name!`. In a tag a primary handle also swallows the
/// alphanumerics that follow it.
pub(crate) fn read_tag_handle(state: &mut ReaderState<'_>, directive: bool) -> Result<String> {
    if !state.is('!') {
        return state.error("did not find expected '!'");
    }
    let mut handle = String::new();
    state.read_into(&mut handle)?;
    while is_alpha(state.ch()) {
        state.read_into(&mut handle)?;
    }
    if state.is('!') {
        state.read_into(&mut handle)?;
    } else if directive && handle != "!" {
        return state.error("did not find expected '!' closing the tag handle");
    }
    Ok(handle)
}

/// Read URI characters, decoding `%xx` escapes. `head` is text already
/// consumed that belongs to the result.
pub(crate) fn read_tag_uri(
    state: &mut ReaderState<'_>,
    flow_indicators: bool,
    directive: bool,
    head: &str,
) -> Result<String> {
    let mut uri = String::from(head);
    while is_uri_char(state.ch(), flow_indicators) {
        if state.is('%') {
            read_uri_escapes(state, directive, &mut uri)?;
        } else {
            state.read_into(&mut uri)?;
        }
    }
    Ok(uri)
}

fn read_uri_escapes(state: &mut ReaderState<'_>, directive: bool, uri: &mut String) -> Result<()> {
    let mut octets = Vec::new();
    while state.is('%') {
        let (Some(high), Some(low)) = (state.peek(1), state.peek(2)) else {
            return state.error("did not find URI escaped octet");
        };
        if !is_hex(high) || !is_hex(low) {
            return state.error("did not find URI escaped octet");
        }
        octets.push(((as_hex(high) << 4) + as_hex(low)) as u8);
        state.skip()?;
        state.skip()?;
        state.skip()?;
    }
    match String::from_utf8(octets) {
        Ok(decoded) => {
            uri.push_str(&decoded);
            Ok(())
        }
        Err(_) if directive => state.error("found an invalid UTF-8 sequence in a %TAG prefix"),
        Err(_) => state.error("found an invalid UTF-8 sequence in a tag"),
    }
}

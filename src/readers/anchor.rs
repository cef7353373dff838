use alloc::string::String;

use crate::chars::{is_alpha, is_blankz};
use crate::state::ReaderState;
use crate::Result;

/// Read the name after `&` or `*`. The cursor is on the indicator.
pub(crate) fn read_anchor_name(state: &mut ReaderState<'_>, alias: bool) -> Result<String> {
    state.skip()?;
    let mut name = String::new();
    while is_alpha(state.ch()) {
        state.read_into(&mut name)?;
    }
    let what = if alias { "an alias" } else { "an anchor" };
    if name.is_empty() {
        return state.error(format!("found {what} with an empty name"));
    }
    let terminated = is_blankz(state.ch())
        || matches!(
            state.ch(),
            Some('?' | ':' | ',' | ']' | '}' | '%' | '@' | '`')
        );
    if !terminated {
        return state.error(format!(
            "did not find expected alphabetic or numeric character in {what}"
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrSource;

    fn read(input: &str, alias: bool) -> Result<String> {
        let mut state = ReaderState::new(Box::new(StrSource::new(input)));
        state.fill()?;
        read_anchor_name(&mut state, alias)
    }

    #[test]
    fn reads_names() {
        assert_eq!(read("&anchor_1 value", false).unwrap(), "anchor_1");
        assert_eq!(read("*ref]", true).unwrap(), "ref");
    }

    #[test]
    fn rejects_empty_names() {
        let err = read("& value", false).unwrap_err();
        assert_eq!(err.problem(), Some("found an anchor with an empty name"));
        let err = read("*", true).unwrap_err();
        assert_eq!(err.problem(), Some("found an alias with an empty name"));
    }
}

use crate::chars::is_breakz;
use crate::state::ReaderState;
use crate::Result;

/// Consume a `#` comment up to, not including, the line break.
///
/// Control then goes back through [`skip_to_content`](super::indent::skip_to_content),
/// so comment lines are invisible to every other reader.
pub(crate) fn read_comment(state: &mut ReaderState<'_>) -> Result<()> {
    while !is_breakz(state.ch()) {
        state.skip()?;
    }
    Ok(())
}

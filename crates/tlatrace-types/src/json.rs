use crate::Result;
use crate::state::State;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// Write states as a JSON array.
///
/// `indent` of `None` writes compact JSON; `Some(n)` pretty-prints with `n` spaces.
/// A trailing newline is always written.
pub fn write_states<W: Write>(states: &[State], indent: Option<usize>, mut out: W) -> Result<()> {
    match indent {
        None => serde_json::to_writer(&mut out, states)?,
        Some(width) => {
            let pad = vec![b' '; width];
            let formatter = PrettyFormatter::with_indent(&pad);
            let mut ser = Serializer::with_formatter(&mut out, formatter);
            states.serialize(&mut ser)?;
        }
    }
    out.write_all(b"\n")?;
    Ok(())
}

pub fn states_to_string(states: &[State], indent: Option<usize>) -> Result<String> {
    let mut buf = Vec::new();
    write_states(states, indent, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

//! Line-level vocabulary of trace files.

/// First characters of a trace file; anything else is treated as a raw TLC log
pub const TRACE_MARKER: &str = "--";

/// Prefix of an action annotation line (`\* <Next line 3, col 5 ...>`)
pub const ACTION_MARKER: &str = "\\*";

/// Prefix of a conjunct line holding one variable assignment
pub const CONJUNCT_MARKER: &str = "/\\";

const HEADER_DASHES: usize = 16;

/// `---------------- MODULE <name> ----------------`
pub fn module_header(name: &str) -> String {
    let dashes = "-".repeat(HEADER_DASHES);
    format!("{} MODULE {} {}", dashes, name, dashes)
}

/// Closing line of a module, as wide as its header
pub fn module_footer(width: usize) -> String {
    "=".repeat(width)
}

pub fn state_marker(index: usize) -> String {
    format!("STATE_{} ==", index)
}

pub fn action_annotation(action: &str) -> String {
    format!("{} <{}>", ACTION_MARKER, action)
}

/// Action name in a line like `2: <Next line 10, col 4 to ...>`.
///
/// The name is the text after the first `<`, up to a space, a `>` or the end of line.
pub fn parse_action(line: &str) -> Option<&str> {
    let start = line.find('<')? + 1;
    let rest = &line[start..];
    let end = rest.find([' ', '>']).unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_footer_widths() {
        let header = module_header("MC_trace");
        assert_eq!(header, "---------------- MODULE MC_trace ----------------");
        assert_eq!(module_footer(header.len()), "=".repeat(49));
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("2: <Next line 10, col 4 to line 12>"), Some("Next"));
        assert_eq!(parse_action("1: <Initial predicate>"), Some("Initial"));
        assert_eq!(parse_action("\\* <FillBig>"), Some("FillBig"));
        assert_eq!(parse_action("\\* <Drain"), Some("Drain"));
        assert_eq!(parse_action("STATE_1 =="), None);
        assert_eq!(parse_action("\\* <>"), None);
    }

    #[test]
    fn test_annotation_roundtrip() {
        assert_eq!(parse_action(&action_annotation("EmptyBig")), Some("EmptyBig"));
    }
}

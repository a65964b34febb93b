//! Purpose: Classify raw SQL script lines before replay.
//! Exports: `LineKind`, `classify_line`, `strip_trailing_semicolon`.
//! Role: The RAW -> {COMMENT, STATEMENT, EMPTY} state machine of the script runner.
//! Invariants: Comments always "succeed"; classification never touches the database.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind {
    Comment,
    Statement,
    Empty,
}

/// Classify one raw line and return its executable text (trimmed, with any
/// comment marker stripped). Comment forms, checked on the trimmed line:
/// a `REM`/`rem` prefix (any case), a `--` prefix, or a one-line `/* ... */`
/// block.
pub fn classify_line(line: &str) -> (LineKind, String) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return (LineKind::Empty, String::new());
    }
    if is_comment(trimmed) {
        return (LineKind::Comment, String::new());
    }
    (LineKind::Statement, trimmed.to_string())
}

pub fn strip_trailing_semicolon(statement: &str) -> &str {
    statement
        .strip_suffix(';')
        .map(str::trim_end)
        .unwrap_or(statement)
}

fn is_comment(trimmed: &str) -> bool {
    // get(..3) rather than a byte slice: byte 3 may fall inside a
    // multibyte character, and such a line is a statement, not a comment.
    if trimmed
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rem"))
    {
        return true;
    }
    if trimmed.starts_with("--") {
        return true;
    }
    trimmed.starts_with("/*") && trimmed.ends_with("*/")
}

#[cfg(test)]
mod tests {
    use super::{LineKind, classify_line, strip_trailing_semicolon};

    #[test]
    fn rem_lines_are_comments_in_any_case() {
        for line in ["REM this is a note", "rem note", "Rem note", "  REM indented"] {
            let (kind, text) = classify_line(line);
            assert_eq!(kind, LineKind::Comment, "line: {line}");
            assert!(text.is_empty());
        }
    }

    #[test]
    fn dash_and_block_comments_are_comments() {
        assert_eq!(classify_line("-- drop legacy").0, LineKind::Comment);
        assert_eq!(classify_line("/* one liner */").0, LineKind::Comment);
    }

    #[test]
    fn open_block_without_close_is_a_statement() {
        // Multi-line blocks are not recognized; only one-line /* */ forms are.
        assert_eq!(classify_line("/* spans").0, LineKind::Statement);
    }

    #[test]
    fn multibyte_statements_classify_without_panicking() {
        // 'Ñ' spans bytes 2..4, so a naive three-byte prefix slice would panic.
        let (kind, text) = classify_line("SEÑAL := 1;");
        assert_eq!(kind, LineKind::Statement);
        assert_eq!(text, "SEÑAL := 1;");
        assert_eq!(classify_line("Ñ").0, LineKind::Statement);
        assert_eq!(classify_line("ñu := 2;").0, LineKind::Statement);
    }

    #[test]
    fn statements_keep_their_text() {
        let (kind, text) = classify_line("  SELECT 1 FROM DUAL;  ");
        assert_eq!(kind, LineKind::Statement);
        assert_eq!(text, "SELECT 1 FROM DUAL;");
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(classify_line("   ").0, LineKind::Empty);
        assert_eq!(classify_line("").0, LineKind::Empty);
    }

    #[test]
    fn semicolon_stripping() {
        assert_eq!(
            strip_trailing_semicolon("SELECT 1 FROM DUAL;"),
            "SELECT 1 FROM DUAL"
        );
        assert_eq!(strip_trailing_semicolon("COMMIT"), "COMMIT");
        assert_eq!(strip_trailing_semicolon("END; "), "END; ");
    }
}

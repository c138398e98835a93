//! Quote- and comment-aware query scanning.
//!
//! The statement policy and the injection classifier both need to know which
//! parts of a query are structure and which are string-literal content: a
//! semicolon inside `'a;b'` is data, not a statement separator. This module
//! implements that distinction as an explicit per-character state machine and
//! exposes the two projections of the query the validators match against.

/// Scanning state, advanced one character at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Unquoted,
    InSingleQuote,
    InDoubleQuote,
    InBacktick,
    InLineComment,
    InBlockComment,
}

/// Normalized projections of a raw query.
///
/// Both projections are whitespace-collapsed and trimmed. Quoted-literal
/// contents are removed from both, with the quote delimiters themselves kept
/// so that quote-adjacent structure (e.g. a comment marker immediately after
/// a closing quote) remains visible.
#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    /// Structure-only text with comment markers (`--`, `/* */`) kept but
    /// comment bodies removed. Match surface for the injection classifier.
    pub blanked: String,
    /// Structure-only text with comments removed entirely. Match surface for
    /// the statement policy (leading keyword, statement separators).
    pub stripped: String,
}

impl NormalizedQuery {
    /// Scan a raw query into its normalized projections.
    pub fn new(raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        let mut blanked = String::with_capacity(raw.len());
        let mut stripped = String::with_capacity(raw.len());
        let mut state = ScanState::Unquoted;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match state {
                ScanState::Unquoted => match c {
                    '\'' => {
                        state = ScanState::InSingleQuote;
                        blanked.push(c);
                        stripped.push(c);
                    }
                    '"' => {
                        state = ScanState::InDoubleQuote;
                        blanked.push(c);
                        stripped.push(c);
                    }
                    '`' => {
                        state = ScanState::InBacktick;
                        blanked.push(c);
                        stripped.push(c);
                    }
                    '-' if next == Some('-') => {
                        state = ScanState::InLineComment;
                        blanked.push_str("--");
                        stripped.push(' ');
                        i += 1;
                    }
                    '/' if next == Some('*') => {
                        state = ScanState::InBlockComment;
                        blanked.push_str("/*");
                        stripped.push(' ');
                        i += 1;
                    }
                    _ => {
                        blanked.push(c);
                        stripped.push(c);
                    }
                },
                ScanState::InSingleQuote => match c {
                    '\\' => i += 1,
                    '\'' if next == Some('\'') => i += 1,
                    '\'' => {
                        state = ScanState::Unquoted;
                        blanked.push(c);
                        stripped.push(c);
                    }
                    _ => {}
                },
                ScanState::InDoubleQuote => match c {
                    '\\' => i += 1,
                    '"' if next == Some('"') => i += 1,
                    '"' => {
                        state = ScanState::Unquoted;
                        blanked.push(c);
                        stripped.push(c);
                    }
                    _ => {}
                },
                ScanState::InBacktick => {
                    if c == '`' {
                        state = ScanState::Unquoted;
                        blanked.push(c);
                        stripped.push(c);
                    }
                }
                ScanState::InLineComment => {
                    if c == '\n' {
                        state = ScanState::Unquoted;
                        blanked.push(' ');
                    }
                }
                ScanState::InBlockComment => {
                    if c == '*' && next == Some('/') {
                        state = ScanState::Unquoted;
                        blanked.push_str("*/");
                        i += 1;
                    }
                }
            }

            i += 1;
        }

        Self {
            blanked: collapse_whitespace(&blanked),
            stripped: collapse_whitespace(&stripped),
        }
    }

    /// First keyword of the statement, uppercased.
    pub fn leading_keyword(&self) -> Option<String> {
        self.stripped
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .find(|s| !s.is_empty())
            .map(str::to_uppercase)
    }

    /// True if, after removing a single trailing semicolon, an unquoted
    /// semicolon remains — the stacked-statement indicator.
    pub fn has_stacked_statement(&self) -> bool {
        let body = self.stripped.trim();
        let body = body.strip_suffix(';').unwrap_or(body);
        body.contains(';')
    }
}

/// Collapse runs of whitespace to single spaces and trim.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_contents_removed() {
        let normalized = NormalizedQuery::new("SELECT * FROM t WHERE name = 'a;b'");
        assert_eq!(normalized.stripped, "SELECT * FROM t WHERE name = ''");
        assert!(!normalized.has_stacked_statement());
    }

    #[test]
    fn test_unquoted_semicolon_detected() {
        let normalized = NormalizedQuery::new("SELECT 1; DROP TABLE users");
        assert!(normalized.has_stacked_statement());
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        let normalized = NormalizedQuery::new("SELECT 1;");
        assert!(!normalized.has_stacked_statement());
    }

    #[test]
    fn test_comments_stripped_but_markers_kept() {
        let normalized = NormalizedQuery::new("SELECT 1 -- drop; comment\nFROM t");
        assert_eq!(normalized.stripped, "SELECT 1 FROM t");
        assert!(normalized.blanked.contains("--"));
        assert!(!normalized.blanked.contains("drop"));
    }

    #[test]
    fn test_block_comment_body_removed() {
        let normalized = NormalizedQuery::new("SELECT /* hidden; DELETE */ 1");
        assert_eq!(normalized.stripped, "SELECT 1");
        assert!(normalized.blanked.contains("/**/"));
    }

    #[test]
    fn test_doubled_quote_stays_inside_literal() {
        let normalized = NormalizedQuery::new("SELECT 'it''s; fine'");
        assert_eq!(normalized.stripped, "SELECT ''");
    }

    #[test]
    fn test_backslash_escape_stays_inside_literal() {
        let normalized = NormalizedQuery::new(r"SELECT 'a\'; b'");
        assert!(!normalized.has_stacked_statement());
    }

    #[test]
    fn test_backtick_identifier() {
        let normalized = NormalizedQuery::new("SELECT `weird; name` FROM t");
        assert_eq!(normalized.stripped, "SELECT `` FROM t");
    }

    #[test]
    fn test_leading_keyword() {
        assert_eq!(
            NormalizedQuery::new("  select * from t").leading_keyword(),
            Some("SELECT".into())
        );
        assert_eq!(
            NormalizedQuery::new("/* hint */ WITH cte AS (SELECT 1) SELECT * FROM cte")
                .leading_keyword(),
            Some("WITH".into())
        );
        assert_eq!(NormalizedQuery::new("").leading_keyword(), None);
    }

    #[test]
    fn test_unterminated_literal_swallows_rest() {
        let normalized = NormalizedQuery::new("SELECT 'unterminated; DROP TABLE t");
        assert!(!normalized.has_stacked_statement());
    }
}

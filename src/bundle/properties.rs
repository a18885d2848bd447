//! Java-style `.properties` codec.
//!
//! Reads logical lines with continuations, comments and escapes, and escapes
//! keys and values on the way back out. Decoding bytes into text is the
//! caller's job (see `BundleStore`), this module works on `str`.

use std::collections::BTreeMap;

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn is_separator(c: char) -> bool {
    matches!(c, '=' | ':') || is_blank(c)
}

/// Parse properties text into a key-ordered map. Later duplicates win.
pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::with_capacity(trimmed.len());
        let mut current = trimmed;
        loop {
            if !has_continuation(current) {
                logical.push_str(current);
                break;
            }
            logical.push_str(&current[..current.len() - 1]);
            match lines.next() {
                Some(next) => current = next.trim_start_matches(is_blank),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        map.insert(unescape(key), unescape(value));
    }

    map
}

/// A line continues when it ends with an odd number of backslashes.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split_at = None;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if is_separator(c) {
            split_at = Some(idx);
            break;
        }
    }

    let Some(idx) = split_at else {
        return (line, "");
    };

    let key = &line[..idx];
    let mut rest = line[idx..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let is_hex = hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit());
                match is_hex.then(|| u32::from_str_radix(&hex, 16).ok()).flatten() {
                    Some(code) => {
                        for _ in 0..4 {
                            chars.next();
                        }
                        // Lone surrogates cannot be represented in a String.
                        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    None => {
                        out.push('\\');
                        out.push('u');
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

/// Escape a key for writing. `representable` tells whether the target
/// character set can encode a character as-is.
pub fn escape_key(key: &str, representable: impl Fn(char) -> bool) -> String {
    escape(key, true, representable)
}

/// Escape a value for writing.
pub fn escape_value(value: &str, representable: impl Fn(char) -> bool) -> String {
    escape(value, false, representable)
}

fn escape(text: &str, is_key: bool, representable: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());

    for (idx, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || !representable(c) => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let map = parse("greeting=Hello\nfarewell = Bye\n");
        assert_eq!(map.get("greeting").map(String::as_str), Some("Hello"));
        assert_eq!(map.get("farewell").map(String::as_str), Some("Bye"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let map = parse("# Modified: 2013/01/01 10:00:00\n\n! other\nkey=value\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn test_parse_colon_and_whitespace_separators() {
        let map = parse("a:1\nb 2\nc\t:\t3\nempty\n");
        assert_eq!(map["a"], "1");
        assert_eq!(map["b"], "2");
        assert_eq!(map["c"], "3");
        assert_eq!(map["empty"], "");
    }

    #[test]
    fn test_parse_continuation() {
        let map = parse("long=first \\\n    second\nnext=x");
        assert_eq!(map["long"], "first second");
        assert_eq!(map["next"], "x");
    }

    #[test]
    fn test_parse_escapes() {
        let map = parse("path=C\\:\\\\dir\nnl=a\\nb\nuni=\\u00e4iti\nkey\\ with\\ space=v");
        assert_eq!(map["path"], "C:\\dir");
        assert_eq!(map["nl"], "a\nb");
        assert_eq!(map["uni"], "äiti");
        assert_eq!(map["key with space"], "v");
    }

    #[test]
    fn test_parse_even_backslashes_do_not_continue() {
        let map = parse("a=x\\\\\nb=y");
        assert_eq!(map["a"], "x\\");
        assert_eq!(map["b"], "y");
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let map = parse("k=1\nk=2");
        assert_eq!(map["k"], "2");
    }

    #[test]
    fn test_escape_key_and_value() {
        let ascii = |c: char| c.is_ascii();
        assert_eq!(escape_key("a b=c", ascii), "a\\ b\\=c");
        assert_eq!(escape_value(" lead=ok", ascii), "\\ lead=ok");
        assert_eq!(escape_value("line\nbreak", ascii), "line\\nbreak");
        assert_eq!(escape_value("äiti", ascii), "\\u00E4iti");
        assert_eq!(escape_value("äiti", |_| true), "äiti");
    }

    #[test]
    fn test_escaped_text_parses_back() {
        let any = |_: char| true;
        let key = escape_key("odd key:1", any);
        let value = escape_value(" spaced\tvalue\\", any);
        let map = parse(&format!("{}={}", key, value));
        assert_eq!(map["odd key:1"], " spaced\tvalue\\");
    }
}

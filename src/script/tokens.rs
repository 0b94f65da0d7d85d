//! Line tokenizer for declaration scripts.

use crate::models::Attributes;
use regex::Regex;
use std::sync::OnceLock;

/// One whitespace-separated word: bare runs and quoted runs, in any mix.
static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
/// The pieces of one word; a quote without its partner is kept as text.
static PIECE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#"(?:[^\s'"]+|'[^']*'|"[^"]*"|['"])+"#).expect("Invalid Regex")
    })
}

fn get_piece_regex() -> &'static Regex {
    PIECE_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'|"([^"]*)"|[^'"]+|['"]"#).expect("Invalid Regex")
    })
}

/// Drop a trailing `#` comment.
pub fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

/// Split a line into words the way a POSIX shell does for quoting:
/// `'...'` and `"..."` keep spaces, may appear anywhere in a word and are
/// joined to the text around them, so `role="edge router"` is one word.
pub fn split_and_strip(input: &str) -> Vec<String> {
    get_token_regex()
        .find_iter(input)
        .map(|word| unquote(word.as_str()))
        .collect()
}

fn unquote(word: &str) -> String {
    get_piece_regex()
        .captures_iter(word)
        .map(|piece| match (piece.get(1), piece.get(2)) {
            (Some(single), _) => single.as_str(),
            (None, Some(double)) => double.as_str(),
            (None, None) => piece.get(0).map_or("", |m| m.as_str()),
        })
        .collect()
}

/// Parse `key=value` arguments; a bare `key` means `key=true`.
pub fn to_info<'a, I>(args: I) -> Attributes
where
    I: IntoIterator<Item = &'a str>,
{
    args.into_iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) if !value.is_empty() => (key.to_string(), value.to_string()),
            Some((key, _)) => (key.to_string(), "true".to_string()),
            None => (arg.to_string(), "true".to_string()),
        })
        .collect()
}

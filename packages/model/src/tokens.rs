//! Placeholder token syntax: `{{ $key }}`
//!
//! Whitespace inside the braces is tolerated when reading; tokens are always
//! written in canonical form with single spaces.

use regex::{Captures, Regex};
use std::sync::OnceLock;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches any placeholder token, capturing its key
pub fn token_regex() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*\$([A-Za-z0-9_]+)\s*\}\}").expect("token pattern is valid")
    })
}

pub fn canonical_token(key: &str) -> String {
    format!("{{{{ ${} }}}}", key)
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Keys referenced in `markup`, in first-appearance order without repeats
pub fn extract_keys(markup: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in token_regex().captures_iter(markup) {
        let key = &caps[1];
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Rewrite every token referencing `from` to reference `to`
pub fn rename_tokens(markup: &str, from: &str, to: &str) -> String {
    token_regex()
        .replace_all(markup, |caps: &Captures| {
            if &caps[1] == from {
                canonical_token(to)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_token() {
        assert_eq!(canonical_token("nama"), "{{ $nama }}");
    }

    #[test]
    fn test_extract_tolerates_whitespace() {
        let keys = extract_keys("{{$a}} and {{   $b_2 }} and {{ $a }} but not {{ a }}");
        assert_eq!(keys, vec!["a", "b_2"]);
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("nomor_surat"));
        assert!(is_valid_key("A1"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("nama lengkap"));
        assert!(!is_valid_key("tgl-surat"));
    }

    #[test]
    fn test_rename_tokens_only_touches_matching_key() {
        let out = rename_tokens("<b>{{$nama}}</b> {{ $namaku }}", "nama", "penerima");
        assert_eq!(out, "<b>{{ $penerima }}</b> {{ $namaku }}");
    }
}

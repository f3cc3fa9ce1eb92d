use regex::Regex;
use std::sync::OnceLock;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // runs of 2+ letters, numbers or '_'; single letters ("a", "I") never become terms.
    // Unlike `\w`, combining marks end a token and any numeric (x², ½) belongs to one.
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]{2,}").expect("token pattern compiles"))
}

/// Lowercase and split on non-word boundaries.
pub fn tokenize(s: &str) -> Vec<String> {
    let lower = s.to_lowercase();
    token_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

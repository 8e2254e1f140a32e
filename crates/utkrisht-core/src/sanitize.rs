//! Scrubbing of remote-store error text before it reaches clients or logs.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of sanitized error text, in characters.
pub const MAX_ERROR_TEXT_LEN: usize = 200;

static CREDENTIAL_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(api_key|api_secret|signature)\s*[=:]\s*[^\s&,;]+")
        .expect("credential pattern compiles")
});

static OPAQUE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_\-]{16,}").expect("token pattern compiles"));

/// Keep only the last four characters of a secret.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

/// Mask credential parameters and long opaque tokens, then truncate.
pub fn sanitize_error_text(input: &str) -> String {
    let masked = CREDENTIAL_PARAM.replace_all(input, "$1=****");
    let masked = OPAQUE_TOKEN.replace_all(&masked, |caps: &regex::Captures<'_>| mask_secret(&caps[0]));

    let mut out: String = masked.chars().take(MAX_ERROR_TEXT_LEN).collect();
    if masked.chars().count() > MAX_ERROR_TEXT_LEN {
        out.push('…');
    }
    out
}

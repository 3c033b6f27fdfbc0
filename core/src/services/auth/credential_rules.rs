//! Username and password shape rules
//!
//! Pure functions with no I/O. Both return a plain bool; callers turn a
//! rejection into a single opaque error so clients cannot probe the rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase letters and digits, 5 to 15 characters, starting with a letter
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9]{4,14}$").expect("username pattern is valid")
});

/// Allowed password alphabet and length
static PASSWORD_CHARSET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!@#$%^&*\-+=]{10,50}$").expect("password pattern is valid")
});

static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("digit pattern is valid"));
static LOWER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("lower pattern is valid"));
static UPPER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("upper pattern is valid"));
static SYMBOL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!@#$%^&*\-+=]").expect("symbol pattern is valid"));

/// Check a candidate username
///
/// Accepts only `[a-z0-9]`, 5 to 15 characters, first character a letter.
pub fn validate_username(candidate: &str) -> bool {
    USERNAME_REGEX.is_match(candidate)
}

/// Check a candidate password for `username`
///
/// All of the following must hold:
/// - only `[A-Za-z0-9]` and `!@#$%^&*-+=`, 10 to 50 characters
/// - at least one digit, one lowercase, one uppercase and one symbol
/// - no three-character run (case-insensitive) that ascends by one,
///   descends by one, or repeats the same character
/// - no three consecutive characters of the username, forwards or reversed
pub fn validate_password(username: &str, candidate: &str) -> bool {
    if !PASSWORD_CHARSET_REGEX.is_match(candidate) {
        return false;
    }
    if !(DIGIT_REGEX.is_match(candidate)
        && LOWER_REGEX.is_match(candidate)
        && UPPER_REGEX.is_match(candidate)
        && SYMBOL_REGEX.is_match(candidate))
    {
        return false;
    }

    let password = candidate.to_ascii_lowercase();
    if has_sequential_run(password.as_bytes()) {
        return false;
    }

    !contains_username_fragment(&password, &username.to_lowercase())
}

fn has_sequential_run(password: &[u8]) -> bool {
    password.windows(3).any(|w| {
        let first = w[1] as i16 - w[0] as i16;
        let second = w[2] as i16 - w[1] as i16;
        first == second && (first == 1 || first == -1 || first == 0)
    })
}

fn contains_username_fragment(password: &str, username: &str) -> bool {
    let chars: Vec<char> = username.chars().collect();
    chars.windows(3).any(|w| {
        let forward: String = w.iter().collect();
        let reversed: String = w.iter().rev().collect();
        password.contains(&forward) || password.contains(&reversed)
    })
}

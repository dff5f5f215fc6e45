//! Class name sanitization
//!
//! Turns free-form text (usually an LLM-extracted keyword) into a valid,
//! bounded-length identifier. Never fails.

/// Longest identifier the stores accept before collision suffixes.
pub const MAX_NAME_LEN: usize = 200;

/// Returned when nothing usable is left after cleaning.
pub const UNNAMED_CLASS: &str = "UnnamedClass";

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Sanitize `raw` with the default length limit.
pub fn sanitize(raw: &str) -> String {
    sanitize_with_limit(raw, MAX_NAME_LEN)
}

/// Sanitize `raw`, keeping at most `max_len` characters.
///
/// 1. Drop everything except letters, digits, `_`, `-` and whitespace.
/// 2. Collapse whitespace runs into a single `_`.
/// 3. Prefix `_` unless the name starts with a letter or `_`.
/// 4. Truncate to `max_len` characters.
///
/// An empty result becomes [`UNNAMED_CLASS`].
pub fn sanitize_with_limit(raw: &str, max_len: usize) -> String {
    let mut joined = String::with_capacity(raw.len() + 1);
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if is_name_char(c) {
            if pending_space {
                joined.push('_');
                pending_space = false;
            }
            joined.push(c);
        }
    }
    if pending_space {
        joined.push('_');
    }

    let needs_prefix = match joined.chars().next() {
        None => return UNNAMED_CLASS.to_string(),
        Some(first) => !(first.is_alphabetic() || first == '_'),
    };
    if needs_prefix {
        joined.insert(0, '_');
    }

    let name: String = joined.chars().take(max_len).collect();
    if name.is_empty() {
        UNNAMED_CLASS.to_string()
    } else {
        name
    }
}

/// Token cleaning: strips script syntax decoration from a raw token.

const LEADING_DECORATION: &[char] = &['(', '[', '/'];
const TRAILING_DECORATION: &[char] = &[')', ']'];
const TRAILING_WHITESPACE: &[char] = &[' ', '\r'];

/// Recover the semantic payload of a raw token.
///
/// Strips, in order: leading spaces, one leading `(`, `[` or `/`, trailing
/// spaces and carriage returns, one trailing `)` or `]`. Each step only
/// applies when the character is actually present, so a clean token comes
/// back unchanged. Only one layer of decoration is removed: `([3])`
/// cleans to `[3]`, which the branch grammar relies on.
pub fn clean(token: &str) -> &str {
    let mut s = token.trim_start_matches(' ');
    if let Some(rest) = s.strip_prefix(LEADING_DECORATION) {
        s = rest;
    }
    s = s.trim_end_matches(TRAILING_WHITESPACE);
    if let Some(rest) = s.strip_suffix(TRAILING_DECORATION) {
        s = rest;
    }
    s
}

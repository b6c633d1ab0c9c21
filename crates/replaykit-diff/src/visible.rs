//! Make whitespace and control characters visible.

/// Replace characters that render as nothing (or as layout) with visible
/// stand-ins, so that diffs caused by them can be seen.
///
/// ```
/// use replaykit_diff::visible::make_visible;
///
/// assert_eq!(make_visible("a b\tc\r"), "a·b→c␍");
/// ```
pub fn make_visible(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' => out.push('·'),
            '\t' => out.push('→'),
            '\r' => out.push('␍'),
            '\n' => out.push('↵'),
            '\u{a0}' => out.push('⍽'),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

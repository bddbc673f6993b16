//! Identifier normalization for magic-property names and part keys

fn is_separator(ch: char) -> bool {
    ch == '-' || ch == '_' || ch.is_whitespace()
}

/// Convert a hyphen, underscore, or whitespace delimited identifier to camelCase.
///
/// Runs of separators are dropped and the character following them is
/// upper-cased. A leading ASCII capital is lower-cased. Surrounding whitespace
/// is ignored.
///
/// ```
/// use part_dispatch_core::normalize;
///
/// assert_eq!(normalize("multi-word-component-name"), "multiWordComponentName");
/// assert_eq!(normalize("my_custom part"), "myCustomPart");
/// assert_eq!(normalize("Tabs"), "tabs");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = false;

    for ch in input.trim().chars() {
        if is_separator(ch) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    if let Some(first) = out.chars().next() {
        if first.is_ascii_uppercase() {
            out.replace_range(..1, &first.to_ascii_lowercase().to_string());
        }
    }

    out
}

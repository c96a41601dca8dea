//! Person-name normalization.

/// Characters after which the next letter starts a new capitalized part.
const PART_SEPARATORS: [char; 2] = ['-', '\''];

/// Trims, collapses whitespace, and title-cases every word.
///
/// Hyphenated and apostrophe parts are capitalized separately, so
/// `mary-jane o'neil` becomes `Mary-Jane O'Neil`. Idempotent.
pub fn normalize_name(value: &str) -> String {
    value
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_part_start = true;
    for c in word.chars() {
        if at_part_start {
            push_upper(&mut out, c);
        } else {
            out.extend(c.to_lowercase());
        }
        at_part_start = PART_SEPARATORS.contains(&c);
    }
    out
}

// Characters whose uppercase form expands (e.g. 'ß' -> "SS") are kept as-is,
// otherwise a second pass would lowercase the expansion.
fn push_upper(out: &mut String, c: char) {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => out.push(single),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_collapses_and_title_cases() {
        assert_eq!(normalize_name("  john   doe  "), "John Doe");
        assert_eq!(normalize_name("JOHN DOE"), "John Doe");
        assert_eq!(normalize_name("\tjohn\ndoe"), "John Doe");
    }

    #[test]
    fn capitalizes_hyphen_and_apostrophe_parts() {
        assert_eq!(normalize_name("mary-jane o'neil"), "Mary-Jane O'Neil");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn expanding_uppercase_is_kept() {
        let once = normalize_name("ßtraße");
        assert_eq!(normalize_name(&once), once);
    }
}

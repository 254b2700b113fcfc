/// Splits a file name or query into lowercase terms.
///
/// Alphanumeric runs form one term; each CJK ideograph, kana or hangul
/// syllable is a term of its own; everything else separates terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if is_cjk(c) {
            flush(&mut current, &mut terms);
            terms.push(c.to_string());
        } else if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else {
            flush(&mut current, &mut terms);
        }
    }
    flush(&mut current, &mut terms);

    terms
}

/// Terms joined with spaces, the form stored in the full-text table.
pub fn analyzed_text(text: &str) -> String {
    tokenize(text).join(" ")
}

/// FTS5 query matching any of the terms of `text`. `None` when there is
/// nothing to search for.
pub fn match_expression(text: &str) -> Option<String> {
    let terms = tokenize(text);
    if terms.is_empty() {
        return None;
    }
    let quoted: Vec<String> = terms.iter().map(|t| format!("\"{t}\"")).collect();
    Some(quoted.join(" OR "))
}

pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF      // hiragana, katakana
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xAC00..=0xD7AF    // hangul syllables
        | 0xF900..=0xFAFF    // compatibility ideographs
        | 0x20000..=0x2A6DF) // CJK extension B
}

fn flush(current: &mut String, terms: &mut Vec<String>) {
    if !current.is_empty() {
        terms.push(std::mem::take(current));
    }
}

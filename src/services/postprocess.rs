use std::sync::OnceLock;

use regex_lite::Regex;

use crate::data::tokenizer::is_cjk;

const TRAILING_PUNCTUATION: &[char] = &['.', '。', '!', '！', '?', '？', ',', '，', '、', ';', '；'];

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<\|[^|>]*\|>").expect("tag pattern is valid"))
}

/// Turns raw engine output into plain text suitable for a name query.
///
/// Strips `<|...|>` markup (language, emotion, audio-event and ITN tags),
/// collapses whitespace, drops the spaces the engine leaves between CJK
/// characters and trims trailing sentence punctuation.
pub fn normalize(raw: &str) -> String {
    let stripped = tag_pattern().replace_all(raw, " ");
    let words: Vec<&str> = stripped.split_whitespace().collect();

    let mut text = String::with_capacity(stripped.len());
    for word in words {
        let joins_cjk = matches!(
            (text.chars().last(), word.chars().next()),
            (Some(prev), Some(next)) if is_cjk(prev) && is_cjk(next)
        );
        if !text.is_empty() && !joins_cjk {
            text.push(' ');
        }
        text.push_str(word);
    }

    text.trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
        .to_string()
}

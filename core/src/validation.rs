use crate::constants::{MAX_DESCRIPTION_CHARS, MAX_EMOJI_CHARS, MAX_TITLE_CHARS};
use lazy_static::lazy_static;
use regex::Regex;

/// True iff `emoji` is 1-10 characters and consists solely of emoji /
/// pictographic codepoints. Plain text, digits, punctuation and whitespace
/// are all rejected.
pub fn is_valid_emoji(emoji: &str) -> bool {
    lazy_static! {
        static ref EMOJI_RE: Regex =
            Regex::new(r"^(\p{Emoji_Presentation}|\p{Extended_Pictographic})+$").unwrap();
    }

    let len = emoji.chars().count();
    (1..=MAX_EMOJI_CHARS).contains(&len) && EMOJI_RE.is_match(emoji)
}

/// Titles must be non-blank after trimming and at most 100 characters.
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty() && title.chars().count() <= MAX_TITLE_CHARS
}

/// Descriptions must be non-blank after trimming and at most 500 characters.
pub fn is_valid_description(description: &str) -> bool {
    !description.trim().is_empty() && description.chars().count() <= MAX_DESCRIPTION_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_validation_accepts_pictographs() {
        let samples = ["🚀", "⭐", "📚", "🏃", "🧘", "🔥🔥🔥", "🌅🎵"];
        for emoji in samples {
            assert!(is_valid_emoji(emoji), "expected valid: {emoji}");
        }
    }

    #[test]
    fn emoji_validation_rejects_text_and_mixed_content() {
        let samples = ["", "abc", "🚀x", "x🚀", "12", " ", "🚀 ", ":-)"];
        for sample in samples {
            assert!(!is_valid_emoji(sample), "expected invalid: {sample:?}");
        }
    }

    #[test]
    fn emoji_validation_enforces_the_length_cap() {
        assert!(is_valid_emoji(&"🚀".repeat(10)));
        assert!(!is_valid_emoji(&"🚀".repeat(11)));
    }

    #[test]
    fn title_validation_rejects_blank_and_oversized_titles() {
        assert!(is_valid_title("Morning Exercise"));
        assert!(!is_valid_title(""));
        assert!(!is_valid_title("   "));
        assert!(is_valid_title(&"a".repeat(100)));
        assert!(!is_valid_title(&"a".repeat(101)));
    }

    #[test]
    fn description_validation_rejects_blank_and_oversized_descriptions() {
        assert!(is_valid_description("30 minutes of exercise"));
        assert!(!is_valid_description("  "));
        assert!(is_valid_description(&"d".repeat(500)));
        assert!(!is_valid_description(&"d".repeat(501)));
    }
}

//! Review comment filtering.
//!
//! The catalog service takes the filter as a trait object so the word list
//! can be swapped (or stubbed out in tests) without touching review logic.

/// Masks objectionable words in user-submitted text.
pub trait ProfanityFilter: Send + Sync {
    /// Return `text` with every denylisted word replaced by asterisks.
    fn censor(&self, text: &str) -> String;
}

/// Case-insensitive whole-word denylist filter.
pub struct DenylistFilter {
    words: Vec<String>,
}

impl DenylistFilter {
    /// Build a filter from a word list. Words are matched case-insensitively
    /// and only at word boundaries, so "class" survives a denylisted "ass".
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

impl Default for DenylistFilter {
    fn default() -> Self {
        Self::new(["damn", "hell", "crap", "shit", "fuck", "bastard", "ass"])
    }
}

impl ProfanityFilter for DenylistFilter {
    fn censor(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());

        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 {
                out.push(' ');
            }

            // Compare the alphanumeric core so trailing punctuation doesn't
            // defeat the match.
            let core: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();

            if self.words.iter().any(|w| *w == core) {
                for c in word.chars() {
                    out.push(if c.is_alphanumeric() { '*' } else { c });
                }
            } else {
                out.push_str(word);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_censor_masks_listed_words() {
        let filter = DenylistFilter::default();
        assert_eq!(filter.censor("what the hell"), "what the ****");
    }

    #[test]
    fn test_censor_is_case_insensitive() {
        let filter = DenylistFilter::default();
        assert_eq!(filter.censor("DAMN shoes"), "**** shoes");
    }

    #[test]
    fn test_censor_keeps_punctuation() {
        let filter = DenylistFilter::default();
        assert_eq!(filter.censor("damn! great fit"), "****! great fit");
    }

    #[test]
    fn test_censor_respects_word_boundaries() {
        let filter = DenylistFilter::default();
        assert_eq!(filter.censor("classy shoes"), "classy shoes");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let filter = DenylistFilter::default();
        assert_eq!(
            filter.censor("very comfortable runners"),
            "very comfortable runners"
        );
    }
}

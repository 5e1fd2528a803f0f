use aho_corasick::AhoCorasick;
use rustc_hash::FxHashSet;

/// TLDs whose entire namespace is treated as adult content.
const ADULT_TLDS: &[&str] = &[".xxx", ".adult", ".sex", ".porn", ".sexy"];

/// Labels that are adult on their own. Curated data, not contract.
const EXACT_WORDS: &[&str] = &[
    "porn", "porno", "sex", "xxx", "xvideos", "xnxx", "xhamster", "redtube", "youporn",
    "hentai", "nsfw", "camgirls",
];

/// Words that flag a label when strictly contained inside it
/// (`pornhub` contains `porn`; the label `porn` alone is handled by the
/// exact list).
const SUBSTRING_WORDS: &[&str] = &[
    "porn", "xvideo", "xnxx", "xhamster", "redtube", "hentai", "stripchat", "onlyfans",
    "rule34", "camgirl",
];

/// Lexical fallback for adult domains that no category list covers yet.
pub struct AdultHeuristic {
    exact: FxHashSet<&'static str>,
    substrings: AhoCorasick,
}

impl AdultHeuristic {
    pub fn new() -> Self {
        let substrings = AhoCorasick::new(SUBSTRING_WORDS)
            .expect("substring vocabulary is a small static list");
        Self {
            exact: EXACT_WORDS.iter().copied().collect(),
            substrings,
        }
    }

    /// `domain` must already be normalized (lowercase, no trailing dot).
    pub fn matches(&self, domain: &str) -> bool {
        if ADULT_TLDS.iter().any(|tld| domain.ends_with(tld)) {
            return true;
        }
        for label in domain.split('.') {
            if self.exact.contains(label) {
                return true;
            }
            // Strict containment only: the whole label matching a word is
            // the exact list's business.
            if self
                .substrings
                .find_iter(label)
                .any(|m| m.end() - m.start() < label.len())
            {
                return true;
            }
        }
        false
    }

    /// Root used to memoize a heuristic hit: the last two labels.
    pub fn registrable_root(domain: &str) -> String {
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() >= 2 {
            labels[labels.len() - 2..].join(".")
        } else {
            domain.to_string()
        }
    }
}

impl Default for AdultHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adult_tlds_match() {
        let h = AdultHeuristic::new();
        assert!(h.matches("example.xxx"));
        assert!(h.matches("some.site.porn"));
        assert!(!h.matches("example.com"));
    }

    #[test]
    fn exact_label_matches() {
        let h = AdultHeuristic::new();
        assert!(h.matches("porn.example.com"));
        assert!(h.matches("xvideos.com"));
    }

    #[test]
    fn substring_must_be_strict() {
        let h = AdultHeuristic::new();
        // "pornhub" strictly contains "porn".
        assert!(h.matches("pornhub.com"));
        // Plain words that merely contain innocuous letters do not fire.
        assert!(!h.matches("singapore.com"));
        assert!(!h.matches("sexton.example"));
    }

    #[test]
    fn registrable_root_is_last_two_labels() {
        assert_eq!(
            AdultHeuristic::registrable_root("cdn.pornhub.com"),
            "pornhub.com"
        );
        assert_eq!(AdultHeuristic::registrable_root("localhost"), "localhost");
    }
}

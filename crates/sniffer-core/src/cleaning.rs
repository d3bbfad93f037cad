//! Regex-based post text cleaning.
//!
//! The transforms run in a fixed order: retweet filter, mentions, hashtags,
//! `t.co` links, whitespace collapse.

use std::sync::OnceLock;

use regex::Regex;

/// `@username` preceded by start of text or a character outside
/// `[A-Za-z0-9_.-]`. The preceding character is captured so it survives.
fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^a-zA-Z0-9_.\-])@[A-Za-z]+[A-Za-z0-9_\-]+").expect("regex is valid")
    })
}

/// Start of text or one whitespace char, `#` or full-width `＃` (U+FF03),
/// then word characters.
fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)[\x{FF03}#](\w+)").expect("regex is valid"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://t\.co/[0-9a-zA-Z]+").expect("regex is valid"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,10}").expect("regex is valid"))
}

// ── TextCleaner ───────────────────────────────────────────────────────────────

/// Strips retweets, mentions, hashtags and short links from post text.
pub struct TextCleaner;

impl TextCleaner {
    /// Retweets are recognised by a literal `RT` prefix.
    pub fn is_retweet(text: &str) -> bool {
        text.starts_with("RT")
    }

    pub fn strip_mentions(text: &str) -> String {
        mention_re().replace_all(text, "${1}").into_owned()
    }

    /// Removes hashtags together with the whitespace character before them.
    pub fn strip_hashtags(text: &str) -> String {
        hashtag_re().replace_all(text, "").into_owned()
    }

    pub fn strip_links(text: &str) -> String {
        link_re().replace_all(text, "").into_owned()
    }

    /// Collapse each run of 2 to 10 whitespace characters into one space.
    ///
    /// Longer runs are consumed ten characters at a time.
    pub fn collapse_whitespace(text: &str) -> String {
        whitespace_re().replace_all(text, " ").into_owned()
    }

    /// Run every transform. Returns `None` when the post is a retweet.
    pub fn clean(text: &str) -> Option<String> {
        if Self::is_retweet(text) {
            return None;
        }
        let text = Self::strip_mentions(text);
        let text = Self::strip_hashtags(&text);
        let text = Self::strip_links(&text);
        Some(Self::collapse_whitespace(&text))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

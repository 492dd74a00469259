use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid url regex"));

static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[\p{L}\p{N}_]+").expect("valid hashtag regex"));

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)@[\w.]+").expect("valid mention regex"));

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{2B00}-\x{2BFF}\x{FE0F}\x{200D}\x{20E3}]")
        .expect("valid emoji regex")
});

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x{00A0}]+").expect("valid spaces regex"));

/// Strips social-media noise from a caption while keeping its line
/// structure, so ingredient lists stay one item per line.
pub fn clean_caption(text: &str) -> String {
    // Captions scraped from meta tags are often entity-encoded twice
    let decoded = decode_html_entities(&decode_html_entities(text)).into_owned();

    let without_urls = URL.replace_all(&decoded, "");
    let without_tags = HASHTAG.replace_all(&without_urls, "");
    let without_mentions = MENTION.replace_all(&without_tags, " ");
    let without_emoji = EMOJI.replace_all(&without_mentions, "");

    without_emoji
        .lines()
        .map(|line| SPACES.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_noise() {
        let caption = "Easy garlic pasta 🍝🔥 by @chef.maria\n\n2 cups pasta\n1 tbsp olive oil  \n#pasta #dinner https://example.com/x";
        assert_eq!(
            clean_caption(caption),
            "Easy garlic pasta by\n2 cups pasta\n1 tbsp olive oil"
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(clean_caption("Mac &amp;amp; cheese"), "Mac & cheese");
        assert_eq!(clean_caption("1 &frac12; cups milk"), "1 ½ cups milk");
    }

    #[test]
    fn test_keeps_fractions_and_emails() {
        assert_eq!(clean_caption("⅛ teaspoon turmeric"), "⅛ teaspoon turmeric");
        assert_eq!(clean_caption("email me@example.com"), "email me@example.com");
    }

    #[test]
    fn test_noise_only_is_empty() {
        assert_eq!(clean_caption("#foodtok #fyp 😋 @someone"), "");
        assert_eq!(clean_caption(""), "");
    }
}

//! Text processing and normalization

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    email_regex: Regex,
    phone_regex: Regex,
    profile_url_regex: Regex,
    years_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(
            r"(?:\b(?:\+?1[-. ]?)?\(?[0-9]{3}\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}\b)|(?:\+[0-9]{1,3}[ .-]?[0-9][0-9 .-]{6,14}[0-9])",
        )
        .expect("Invalid phone regex");

        let profile_url_regex = Regex::new(r"(?i)\b(?:linkedin\.com/in/|github\.com/)[^\s]+")
            .expect("Invalid profile URL regex");

        let years_regex = Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b")
            .expect("Invalid years regex");

        Self {
            email_regex,
            phone_regex,
            profile_url_regex,
            years_regex,
        }
    }

    /// Map typographic characters to their ASCII equivalents and drop control characters.
    pub fn normalize_unicode(&self, text: &str) -> String {
        text.chars()
            .filter_map(|c| match c {
                '\u{2018}' | '\u{2019}' => Some('\''),
                '\u{201C}' | '\u{201D}' => Some('"'),
                '\u{2013}' | '\u{2014}' => Some('-'),
                '\u{2026}' => Some('.'),
                '\u{00A0}' | '\t' => Some(' '),
                '\n' => Some('\n'),
                '\r' | '\u{000C}' => Some('\n'),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect()
    }

    /// Collapse runs of spaces inside a line and trim it.
    pub fn normalize_whitespace(&self, line: &str) -> String {
        line.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Lowercased, stemmed terms. `+` and `#` stay attached so that
    /// `c++` and `c#` survive as distinct terms.
    pub fn tokenize_terms(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|token| token.chars().any(|c| c.is_alphanumeric()))
            .map(|token| stem(&token.to_lowercase()))
            .collect()
    }

    /// First word of `text`, lowercased, if it is alphabetic.
    pub fn first_word(&self, text: &str) -> Option<String> {
        text.unicode_words()
            .next()
            .filter(|w| w.chars().all(|c| c.is_alphabetic()))
            .map(|w| w.to_lowercase())
    }

    pub fn has_contact_info(&self, text: &str) -> bool {
        self.email_regex.is_match(text)
            || self.phone_regex.is_match(text)
            || self.profile_url_regex.is_match(text)
    }

    /// Largest "N years" / "N+ yrs" cue in the text.
    pub fn years_of_experience(&self, text: &str) -> Option<u32> {
        self.years_regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1)?.as_str().parse::<u32>().ok())
            .filter(|years| *years <= 50)
            .max()
    }

    /// Remove personal identifiable information before text leaves the process.
    pub fn remove_pii(&self, text: &str) -> String {
        let mut cleaned = self.email_regex.replace_all(text, "[EMAIL REMOVED]").to_string();
        cleaned = self.phone_regex.replace_all(&cleaned, "[PHONE REMOVED]").to_string();
        cleaned = self.profile_url_regex.replace_all(&cleaned, "[PROFILE REMOVED]").to_string();
        cleaned
    }
}

/// Light suffix-stripping stemmer. Only ASCII alphabetic words longer than
/// three characters are touched; everything else is returned as is.
pub fn stem(word: &str) -> String {
    if word.chars().count() <= 3 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return word.to_string();
    }

    let mut stemmed = word.to_string();

    if let Some(base) = stemmed.strip_suffix("ies") {
        if base.len() >= 3 {
            stemmed = format!("{}y", base);
        }
    } else if let Some(base) = stemmed.strip_suffix("ing") {
        if base.len() >= 3 {
            stemmed = undouble(base);
        }
    } else if let Some(base) = stemmed.strip_suffix("ed") {
        if base.len() >= 3 {
            stemmed = undouble(base);
        }
    } else if stemmed.ends_with('s')
        && !stemmed.ends_with("ss")
        && !stemmed.ends_with("is")
        && !stemmed.ends_with("us")
    {
        stemmed.pop();
    }

    if stemmed.len() > 4 && stemmed.ends_with('e') {
        stemmed.pop();
    }

    stemmed
}

fn undouble(base: &str) -> String {
    let bytes = base.as_bytes();
    let n = bytes.len();
    if n >= 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z') {
        let last = bytes[n - 1];
        if !matches!(last, b'a' | b'e' | b'i' | b'o' | b'u') {
            return base[..n - 1].to_string();
        }
    }
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stemming_conflates_inflections() {
        assert_eq!(stem("services"), stem("service"));
        assert_eq!(stem("managed"), stem("manage"));
        assert_eq!(stem("testing"), stem("tests"));
        assert_eq!(stem("technologies"), stem("technology"));
        assert_eq!(stem("planned"), stem("plan"));
        assert_eq!(stem("processes"), stem("process"));
        assert_eq!(stem("apis"), "api");
        assert_eq!(stem("gpus"), "gpu");
    }

    #[test]
    fn test_stemming_leaves_short_and_symbolic_words() {
        assert_eq!(stem("aws"), "aws");
        assert_eq!(stem("c++"), "c++");
        assert_eq!(stem("analysis"), "analysis");
        assert_eq!(stem("k8s"), "k8s");
    }

    #[test]
    fn test_tokenize_terms_keeps_language_symbols() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize_terms("Built C++ and C# services on Node.js, CI/CD");

        assert!(tokens.contains(&"c++".to_string()));
        assert!(tokens.contains(&"c#".to_string()));
        assert!(tokens.contains(&"node".to_string()));
        assert!(tokens.contains(&"js".to_string()));
        assert!(tokens.contains(&stem("services")));
        assert!(tokens.contains(&"ci".to_string()));
    }

    #[test]
    fn test_contact_detection() {
        let processor = TextProcessor::new();
        assert!(processor.has_contact_info("jane.doe@example.com"));
        assert!(processor.has_contact_info("(555) 123-4567"));
        assert!(processor.has_contact_info("+44 20 7946 0958"));
        assert!(processor.has_contact_info("linkedin.com/in/janedoe"));
        assert!(!processor.has_contact_info("Software Engineer"));
    }

    #[test]
    fn test_years_of_experience_takes_largest_cue() {
        let processor = TextProcessor::new();
        let text = "Engineer with 7+ years in backend work, 3 years leading teams";
        assert_eq!(processor.years_of_experience(text), Some(7));
        assert_eq!(processor.years_of_experience("Managed team of 10"), None);
    }

    #[test]
    fn test_unicode_normalization() {
        let processor = TextProcessor::new();
        let normalized = processor.normalize_unicode("\u{201C}Led\u{201D} 2019\u{2013}2021\r\nnext");
        assert_eq!(normalized, "\"Led\" 2019-2021\n\nnext");
    }

    #[test]
    fn test_pii_removal() {
        let processor = TextProcessor::new();
        let cleaned = processor.remove_pii("Reach me at john.doe@company.com or (555) 123-4567");

        assert!(!cleaned.contains("john.doe@company.com"));
        assert!(!cleaned.contains("(555) 123-4567"));
    }

    #[test]
    fn test_first_word() {
        let processor = TextProcessor::new();
        assert_eq!(processor.first_word("Managed team of 10"), Some("managed".to_string()));
        assert_eq!(processor.first_word("2019: shipped"), None);
    }
}

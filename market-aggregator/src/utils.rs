/// Text processing utilities
pub mod text {
    /// Strip markup (HTML or JATS) and collapse whitespace.
    pub fn strip_markup(html: &str) -> String {
        let without_tags = html
            .chars()
            .fold((String::new(), false), |(mut text, in_tag), c| match c {
                '<' => (text, true),
                '>' => {
                    text.push(' ');
                    (text, false)
                }
                _ if !in_tag => {
                    text.push(c);
                    (text, in_tag)
                }
                _ => (text, in_tag),
            })
            .0;

        html_escape::decode_html_entities(&without_tags)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Truncate to at most `max_chars` characters, breaking at a space when possible.
    pub fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let cut: String = text.chars().take(max_chars).collect();
        match cut.rfind(' ') {
            Some(last_space) if last_space > 0 => format!("{}...", &cut[..last_space]),
            _ => format!("{}...", cut),
        }
    }

    /// Lower-case, ASCII-alphanumeric slug used for export file names.
    pub fn slugify(text: &str) -> String {
        let slug = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect::<String>();

        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if slug.is_empty() {
            "search".to_string()
        } else {
            slug
        }
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str).ok().and_then(|url| url.domain().map(|d| d.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let html = r##"<a href="https://x">Acme &amp; Co</a>&nbsp;<font color="#6f6f6f">Reuters</font>"##;
        assert_eq!(text::strip_markup(html), "Acme & Co Reuters");
        assert_eq!(
            text::strip_markup("<jats:p>Hydrogen <jats:italic>storage</jats:italic></jats:p>"),
            "Hydrogen storage"
        );
    }

    #[test]
    fn truncates_on_word_boundary() {
        assert_eq!(text::truncate("short", 10), "short");
        assert_eq!(text::truncate("hydrogen storage vessel", 12), "hydrogen...");
        assert_eq!(text::truncate("ééééé", 3), "ééé...");
    }

    #[test]
    fn slugifies_queries() {
        assert_eq!(text::slugify("Hydrogen Storage!"), "hydrogen-storage");
        assert_eq!(text::slugify("???"), "search");
    }

    #[test]
    fn extracts_domain() {
        assert_eq!(
            super::url::extract_domain("https://www.reuters.com/x"),
            Some("www.reuters.com".to_string())
        );
        assert_eq!(super::url::extract_domain("invalid-url"), None);
    }
}

use std::fmt;

/// Normalized language tag, e.g. `en` or `it-IT`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Parse a language tag. Returns `None` for empty tags and wildcards.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() || tag == "*" {
            return None;
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }

        let mut parts = tag.split(|c: char| c == '-' || c == '_');
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        if language.is_empty() {
            return None;
        }

        let mut normalized = language;
        for part in parts.filter(|p| !p.is_empty()) {
            normalized.push('-');
            if part.len() == 2 {
                normalized.push_str(&part.to_ascii_uppercase());
            } else {
                normalized.push_str(part);
            }
        }

        Some(Self(normalized))
    }

    /// Pick the preferred locale from an `Accept-Language` header value
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut best: Option<(f32, Locale)> = None;

        for entry in header.split(',') {
            let mut pieces = entry.split(';');
            let Some(locale) = pieces.next().and_then(Self::parse) else {
                continue;
            };

            let quality = match pieces.find_map(|p| p.trim().strip_prefix("q=")) {
                Some(q) => match q.trim().parse::<f32>() {
                    Ok(q) if q.is_finite() && (0.0..=1.0).contains(&q) => q,
                    _ => continue,
                },
                None => 1.0,
            };

            if quality == 0.0 {
                continue;
            }
            // First entry wins on equal quality
            if best.as_ref().map_or(true, |(q, _)| quality > *q) {
                best = Some((quality, locale));
            }
        }

        best.map(|(_, locale)| locale)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Tags to try in lookup order, most specific first
    pub fn fallbacks(&self) -> Vec<&str> {
        let mut tags = vec![self.as_str()];
        if self.language() != self.as_str() {
            tags.push(self.language());
        }
        tags
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

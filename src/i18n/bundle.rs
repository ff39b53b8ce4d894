use std::collections::HashMap;
use std::path::Path;

use super::locale::Locale;
use super::{MessageError, MessageSource};

const BUILTIN_BUNDLES: &str = include_str!("../../resources/messages.json");

/// Per-locale code → message tables
#[derive(Debug, Clone)]
pub struct BundleMessageSource {
    bundles: HashMap<String, HashMap<String, String>>,
    default_locale: Locale,
}

impl BundleMessageSource {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            bundles: HashMap::new(),
            default_locale,
        }
    }

    /// Bundles shipped with the crate (`en`, `it`)
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_BUNDLES, Locale::default())
            .expect("built-in message bundles are valid JSON")
    }

    /// Parse bundles from `{"<locale>": {"<code>": "<message>"}}`
    pub fn from_json_str(json: &str, default_locale: Locale) -> Result<Self, MessageError> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;

        let mut source = Self::new(default_locale);
        for (tag, messages) in raw {
            let locale = Locale::parse(&tag).ok_or(MessageError::InvalidLocale(tag))?;
            source.add_bundle(&locale, messages);
        }
        Ok(source)
    }

    pub fn from_json_file(
        path: impl AsRef<Path>,
        default_locale: Locale,
    ) -> Result<Self, MessageError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MessageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json, default_locale)
    }

    /// Add or extend the table of one locale; later entries override earlier ones
    pub fn add_bundle(&mut self, locale: &Locale, messages: HashMap<String, String>) {
        self.bundles
            .entry(locale.as_str().to_string())
            .or_default()
            .extend(messages);
    }

    /// Overlay `other` on top of these bundles, keeping `other`'s default locale
    pub fn merge(mut self, other: BundleMessageSource) -> Self {
        for (tag, messages) in other.bundles {
            self.bundles.entry(tag).or_default().extend(messages);
        }
        self.default_locale = other.default_locale;
        self
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    fn find(&self, tag: &str, code: &str) -> Option<&String> {
        self.bundles.get(tag).and_then(|bundle| bundle.get(code))
    }
}

impl Default for BundleMessageSource {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageSource for BundleMessageSource {
    fn lookup(&self, code: &str, locale: &Locale) -> Result<String, MessageError> {
        locale
            .fallbacks()
            .into_iter()
            .chain(self.default_locale.fallbacks())
            .find_map(|tag| self.find(tag, code))
            .cloned()
            .ok_or_else(|| MessageError::NotFound {
                code: code.to_string(),
                locale: locale.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    #[test]
    fn test_builtin_bundles() {
        let source = BundleMessageSource::builtin();
        assert_eq!(source.lookup("101", &locale("en")).unwrap(), "Validation failed");
        assert_eq!(
            source.lookup("101", &locale("it")).unwrap(),
            "Errore di validazione"
        );
    }

    #[test]
    fn test_lookup_falls_back_to_language_then_default() {
        let source = BundleMessageSource::builtin();
        assert_eq!(
            source.lookup("101", &locale("it-IT")).unwrap(),
            "Errore di validazione"
        );
        assert_eq!(source.lookup("101", &locale("fr")).unwrap(), "Validation failed");
    }

    #[test]
    fn test_lookup_missing_code() {
        let source = BundleMessageSource::builtin();
        let err = source.lookup("999", &locale("en")).unwrap_err();
        assert!(matches!(err, MessageError::NotFound { ref code, .. } if code == "999"));
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let custom = BundleMessageSource::from_json_str(
            r#"{"en": {"101": "Invalid request"}, "de": {"101": "Ungültige Anfrage"}}"#,
            locale("de"),
        )
        .unwrap();
        let source = BundleMessageSource::builtin().merge(custom);

        assert_eq!(source.lookup("101", &locale("en")).unwrap(), "Invalid request");
        assert_eq!(source.lookup("100", &locale("en")).unwrap(), "An unexpected error occurred");
        assert_eq!(source.lookup("101", &locale("fr")).unwrap(), "Ungültige Anfrage");
        assert_eq!(source.default_locale().as_str(), "de");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"es": {{"101": "Error de validación"}}}}"#).unwrap();

        let source = BundleMessageSource::from_json_file(file.path(), locale("es")).unwrap();
        assert_eq!(
            source.lookup("101", &locale("en")).unwrap(),
            "Error de validación"
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            BundleMessageSource::from_json_str("not json", Locale::default()),
            Err(MessageError::Parse(_))
        ));
        assert!(matches!(
            BundleMessageSource::from_json_str(r#"{"*": {}}"#, Locale::default()),
            Err(MessageError::InvalidLocale(_))
        ));
        assert!(matches!(
            BundleMessageSource::from_json_file("/nonexistent/messages.json", Locale::default()),
            Err(MessageError::Io { .. })
        ));
    }
}

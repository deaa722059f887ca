use crate::schema::ReportConfig;

/// Canonical name for every client matched by an internal keyword.
pub const INTERNAL_CLIENT: &str = "Internal";

pub const DEFAULT_INTERNAL_KEYWORDS: [&str; 2] = ["internal", "persuasion"];

/// Collapses internal projects into a single "Internal" client.
///
/// Matching is a case-insensitive substring test against each keyword. Names
/// that match nothing pass through unchanged.
#[derive(Debug, Clone)]
pub struct ClientNormalizer {
    keywords: Vec<String>,
}

impl Default for ClientNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_KEYWORDS.iter().copied())
    }
}

impl ClientNormalizer {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.internal_keywords)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_internal(&self, raw_client: &str) -> bool {
        let lowered = raw_client.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn normalize(&self, raw_client: &str) -> String {
        if self.is_internal(raw_client) {
            INTERNAL_CLIENT.to_string()
        } else {
            raw_client.to_string()
        }
    }
}

/// Normalizes with the default keyword set.
pub fn normalize(raw_client: &str) -> String {
    ClientNormalizer::default().normalize(raw_client)
}

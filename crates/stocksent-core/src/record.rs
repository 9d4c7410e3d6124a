use serde::Serialize;

/// One normalized news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsRecord {
    headline: String,
    published_at: Option<String>,
    description: Option<String>,
}

impl NewsRecord {
    /// Builds a record, returning `None` when the headline is empty or only
    /// whitespace. Blank timestamps and descriptions are stored as `None`.
    #[must_use]
    pub fn new(
        headline: impl Into<String>,
        published_at: Option<String>,
        description: Option<String>,
    ) -> Option<Self> {
        let headline = headline.into();
        if headline.trim().is_empty() {
            return None;
        }
        Some(Self {
            headline,
            published_at: published_at.filter(|p| !p.trim().is_empty()),
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn headline(&self) -> &str {
        &self.headline
    }

    /// Publication timestamp as sent by the provider (ISO-8601), if any.
    #[must_use]
    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>, Option<String>) {
        (self.headline, self.published_at, self.description)
    }
}

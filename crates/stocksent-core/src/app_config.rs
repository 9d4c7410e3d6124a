use chrono::NaiveDate;

/// What the chronological adapter does when a day comes back with a
/// well-formed but empty `articles` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyDayPolicy {
    /// Treat the day as "no news" and move on to the next one.
    #[default]
    Skip,
    /// Stop iterating; the rest of the window is abandoned.
    Stop,
}

impl std::fmt::Display for EmptyDayPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyDayPolicy::Skip => write!(f, "skip"),
            EmptyDayPolicy::Stop => write!(f, "stop"),
        }
    }
}

/// Runtime settings for a pipeline run.
///
/// News provider keys are not part of this struct; they are resolved through
/// [`crate::CredentialProvider`] so a missing key fails before any request.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub lookback_weeks: u32,
    pub apitube_page_size: u32,
    pub apitube_start_date: NaiveDate,
    pub empty_day_policy: EmptyDayPolicy,
    pub classifier_url: String,
    pub classifier_token: Option<String>,
    pub classifier_batch_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("lookback_weeks", &self.lookback_weeks)
            .field("apitube_page_size", &self.apitube_page_size)
            .field("apitube_start_date", &self.apitube_start_date)
            .field("empty_day_policy", &self.empty_day_policy)
            .field("classifier_url", &self.classifier_url)
            .field(
                "classifier_token",
                &self.classifier_token.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_batch_size", &self.classifier_batch_size)
            .finish()
    }
}

use models::RecentAction;

pub const DEFAULT_SUBJECT_ID: &str = "f84d38d4-a949-40fd-a3b2-12f3cdf563e2";

/// Everything since the epoch.
pub const DEFAULT_START_TIMESTAMP: &str = "0";

pub const PLACEHOLDER_AVATAR: &str =
    "https://cdn-userpic.codeforces.com/1856032/avatar/73ea75ced650eedc.jpg";

/// Where a row's avatar image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarSource {
    /// The same image for every row.
    Fixed(String),
}

impl Default for AvatarSource {
    fn default() -> Self {
        Self::Fixed(PLACEHOLDER_AVATAR.to_owned())
    }
}

impl AvatarSource {
    pub fn resolve(&self, _record: &RecentAction) -> String {
        match self {
            Self::Fixed(url) => url.clone(),
        }
    }
}

/// How comment markup from the server is treated before it's rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MarkupPolicy {
    /// Rendered verbatim. Comment text is injected as-is, scripts included.
    #[default]
    Trusted,
    /// Cleaned with ammonia first.
    Sanitized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedConfig {
    pub subject_id: String,
    pub start_timestamp: String,
    pub avatar: AvatarSource,
    pub markup: MarkupPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            subject_id: DEFAULT_SUBJECT_ID.to_owned(),
            start_timestamp: DEFAULT_START_TIMESTAMP.to_owned(),
            avatar: AvatarSource::default(),
            markup: MarkupPolicy::default(),
        }
    }
}

impl FeedConfig {
    pub fn for_subject(subject_id: String) -> Self {
        Self {
            subject_id,
            ..Default::default()
        }
    }
}

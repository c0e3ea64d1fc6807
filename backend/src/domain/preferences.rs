//! User preferences and related domain types.
//!
//! This module defines the `UserPreferences` aggregate, which captures a
//! user's notification channels, display theme and interface language.
//! Preferences support optimistic concurrency via revision numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, choice_enum};

choice_enum! {
    /// Display theme for the web client.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hostel_backend::domain::Theme;
    /// assert_eq!(Theme::default(), Theme::System);
    /// assert_eq!(Theme::Dark.as_str(), "dark");
    /// ```
    pub enum Theme {
        /// Light palette.
        Light => "light",
        /// Dark palette.
        Dark => "dark",
        /// Follow the operating system.
        System => "system",
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::System
    }
}

/// Error returned when a language tag is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("language must be a 2-8 character tag of letters, digits or hyphens")]
pub struct LanguageTagError {
    /// The rejected input.
    pub input: String,
}

/// Interface language tag such as `en` or `hi-IN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Validate a tag.
    pub fn new(raw: impl Into<String>) -> Result<Self, LanguageTagError> {
        let input = raw.into();
        let len = input.chars().count();
        let well_formed = (2..=8).contains(&len)
            && input.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !input.starts_with('-')
            && !input.ends_with('-');
        if well_formed {
            Ok(Self(input))
        } else {
            Err(LanguageTagError { input })
        }
    }

    /// Tag text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self("en".to_owned())
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = LanguageTagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageTag> for String {
    fn from(value: LanguageTag) -> Self {
        value.0
    }
}

/// User preferences for notification channels and display options.
///
/// # Examples
///
/// ```
/// # use hostel_backend::domain::{Theme, UserId, UserPreferences};
/// let prefs = UserPreferences::builder(UserId::random())
///     .theme(Theme::Dark)
///     .build();
///
/// assert_eq!(prefs.revision, 1);
/// assert!(prefs.email_notifications);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// The user these preferences belong to.
    pub user_id: UserId,
    /// Send notifications by email.
    pub email_notifications: bool,
    /// Send notifications by SMS.
    pub sms_notifications: bool,
    /// Send push notifications.
    pub push_notifications: bool,
    /// Display theme.
    pub theme: Theme,
    /// Interface language.
    pub language: LanguageTag,
    /// Revision number for optimistic concurrency.
    pub revision: u32,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update for preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    /// New email toggle.
    pub email_notifications: Option<bool>,
    /// New SMS toggle.
    pub sms_notifications: Option<bool>,
    /// New push toggle.
    pub push_notifications: Option<bool>,
    /// New theme.
    pub theme: Option<Theme>,
    /// New language.
    pub language: Option<LanguageTag>,
    /// Revision the client last saw.
    pub expected_revision: Option<u32>,
}

impl UserPreferences {
    /// Create a new preferences instance with default values stamped `now`.
    pub fn new_default(user_id: UserId, now: DateTime<Utc>) -> Self {
        UserPreferencesBuilder::new(user_id).updated_at(now).build()
    }

    /// Create a builder for constructing preferences incrementally.
    pub fn builder(user_id: UserId) -> UserPreferencesBuilder {
        UserPreferencesBuilder::new(user_id)
    }

    /// Apply `patch`, bumping the revision.
    pub fn apply(&mut self, patch: PreferencesPatch, now: DateTime<Utc>) {
        if let Some(value) = patch.email_notifications {
            self.email_notifications = value;
        }
        if let Some(value) = patch.sms_notifications {
            self.sms_notifications = value;
        }
        if let Some(value) = patch.push_notifications {
            self.push_notifications = value;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        self.revision += 1;
        self.updated_at = now;
    }
}

/// Builder for constructing [`UserPreferences`] incrementally.
#[derive(Debug, Clone)]
pub struct UserPreferencesBuilder {
    user_id: UserId,
    email_notifications: bool,
    sms_notifications: bool,
    push_notifications: bool,
    theme: Theme,
    language: LanguageTag,
    revision: u32,
    updated_at: Option<DateTime<Utc>>,
}

impl UserPreferencesBuilder {
    /// Create a new builder for the given user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            theme: Theme::default(),
            language: LanguageTag::default(),
            revision: 1,
            updated_at: None,
        }
    }

    /// Set the email toggle.
    pub fn email_notifications(mut self, enabled: bool) -> Self {
        self.email_notifications = enabled;
        self
    }

    /// Set the SMS toggle.
    pub fn sms_notifications(mut self, enabled: bool) -> Self {
        self.sms_notifications = enabled;
        self
    }

    /// Set the push toggle.
    pub fn push_notifications(mut self, enabled: bool) -> Self {
        self.push_notifications = enabled;
        self
    }

    /// Set the theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the language.
    pub fn language(mut self, language: LanguageTag) -> Self {
        self.language = language;
        self
    }

    /// Set the revision number.
    pub fn revision(mut self, rev: u32) -> Self {
        self.revision = rev;
        self
    }

    /// Set the updated timestamp.
    pub fn updated_at(mut self, ts: DateTime<Utc>) -> Self {
        self.updated_at = Some(ts);
        self
    }

    /// Build the final [`UserPreferences`] instance.
    pub fn build(self) -> UserPreferences {
        UserPreferences {
            user_id: self.user_id,
            email_notifications: self.email_notifications,
            sms_notifications: self.sms_notifications,
            push_notifications: self.push_notifications,
            theme: self.theme,
            language: self.language,
            revision: self.revision,
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case::light("light", Theme::Light)]
    #[case::dark("dark", Theme::Dark)]
    #[case::system("system", Theme::System)]
    fn theme_parses_valid_strings(#[case] input: &str, #[case] expected: Theme) {
        let parsed: Theme = input.parse().expect("valid theme");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case::unknown("sepia")]
    #[case::empty("")]
    #[case::capitalised("Dark")]
    fn theme_rejects_invalid_strings(#[case] input: &str) {
        assert!(input.parse::<Theme>().is_err());
    }

    #[rstest]
    #[case::short("en", true)]
    #[case::region("hi-IN", true)]
    #[case::single("e", false)]
    #[case::long("abcdefghi", false)]
    #[case::space("en US", false)]
    #[case::dangling("en-", false)]
    fn language_tags_are_validated(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(LanguageTag::new(input).is_ok(), valid);
    }

    #[rstest]
    fn user_preferences_new_default() {
        let user_id = UserId::random();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid time");
        let prefs = UserPreferences::new_default(user_id, now);

        assert_eq!(prefs.user_id, user_id);
        assert!(prefs.email_notifications);
        assert!(!prefs.sms_notifications);
        assert!(prefs.push_notifications);
        assert_eq!(prefs.theme, Theme::System);
        assert_eq!(prefs.language.as_str(), "en");
        assert_eq!(prefs.revision, 1);
        assert_eq!(prefs.updated_at, now);
    }

    #[rstest]
    fn patch_changes_only_provided_fields() {
        let mut prefs = UserPreferences::builder(UserId::random()).build();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("valid time");
        prefs.apply(
            PreferencesPatch {
                theme: Some(Theme::Dark),
                sms_notifications: Some(true),
                ..PreferencesPatch::default()
            },
            now,
        );

        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.sms_notifications);
        assert!(prefs.email_notifications);
        assert_eq!(prefs.revision, 2);
        assert_eq!(prefs.updated_at, now);
    }

    #[rstest]
    fn preferences_serialise_camel_case() {
        let prefs = UserPreferences::builder(UserId::random()).build();
        let json = serde_json::to_value(&prefs).expect("serialise");
        assert_eq!(json["emailNotifications"], true);
        assert_eq!(json["theme"], "system");
        assert_eq!(json["language"], "en");
    }
}

//! Client identities used to impersonate the different YouTube front-ends.
//!
//! Which identity gets a direct, non-ciphered audio URL changes over time, so
//! the order is a tunable policy: [`ClientCatalog::from_names`] builds it from
//! configuration, [`ClientCatalog::default`] uses [`DEFAULT_PRIORITY`].

pub mod android;
pub mod ios;
pub mod tv_embedded;
pub mod web;

use std::collections::BTreeMap;

use serde_json::Value;

/// Default attempt order: mobile music first, embedded players next, general
/// mobile/web identities after, the VR identity last.
pub const DEFAULT_PRIORITY: &[&str] = &[
    android::MUSIC_CLIENT_NAME,
    tv_embedded::CLIENT_NAME,
    ios::CLIENT_NAME,
    android::TESTSUITE_CLIENT_NAME,
    android::ANDROID_CLIENT_NAME,
    web::WEB_CLIENT_NAME,
    web::CREATOR_CLIENT_NAME,
    web::MWEB_CLIENT_NAME,
    android::VR_CLIENT_NAME,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ClientProfile {
    /// InnerTube `clientName`.
    pub name: String,
    pub version: String,
    /// Numeric id sent as `X-YouTube-Client-Name`.
    pub client_id: u32,
    /// Overrides the fetcher's browser identity when set.
    pub user_agent: Option<String>,
    /// Extra keys merged into `context.client`.
    pub platform_fields: BTreeMap<String, Value>,
}

impl ClientProfile {
    pub fn new(name: &str, version: &str, client_id: u32) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            client_id,
            user_agent: None,
            platform_fields: BTreeMap::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.platform_fields.insert(key.to_string(), value);
        self
    }
}

/// Maps a configured name (case-insensitive, legacy aliases included) to the
/// canonical InnerTube client name.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let upper = name.trim().to_uppercase();
    let canonical = match upper.as_str() {
        "ANDROID_MUSIC" | "MUSIC" | "MUSIC_ANDROID" => android::MUSIC_CLIENT_NAME,
        "TVHTML5_SIMPLY_EMBEDDED_PLAYER" | "TVHTML5SIMPLY_EMBEDDED" | "TV_EMBEDDED"
        | "TVEMBEDDED" => tv_embedded::CLIENT_NAME,
        "IOS" => ios::CLIENT_NAME,
        "ANDROID_TESTSUITE" | "TESTSUITE" => android::TESTSUITE_CLIENT_NAME,
        "ANDROID" => android::ANDROID_CLIENT_NAME,
        "WEB" => web::WEB_CLIENT_NAME,
        "WEB_CREATOR" | "CREATOR" => web::CREATOR_CLIENT_NAME,
        "MWEB" => web::MWEB_CLIENT_NAME,
        "ANDROID_VR" | "ANDROIDVR" => android::VR_CLIENT_NAME,
        _ => return None,
    };
    Some(canonical)
}

/// Looks up a built-in profile by any accepted name.
pub fn builtin(name: &str) -> Option<ClientProfile> {
    let profile = match canonical_name(name)? {
        android::MUSIC_CLIENT_NAME => android::music(),
        tv_embedded::CLIENT_NAME => tv_embedded::tv_embedded(),
        ios::CLIENT_NAME => ios::ios(),
        android::TESTSUITE_CLIENT_NAME => android::testsuite(),
        android::ANDROID_CLIENT_NAME => android::android(),
        web::WEB_CLIENT_NAME => web::web(),
        web::CREATOR_CLIENT_NAME => web::creator(),
        web::MWEB_CLIENT_NAME => web::mweb(),
        android::VR_CLIENT_NAME => android::vr(),
        _ => return None,
    };
    Some(profile)
}

/// Whether `name` is one of the closed set of InnerTube client names.
pub fn is_known_client(name: &str) -> bool {
    DEFAULT_PRIORITY.contains(&name)
}

/// Process-wide, read-only list of profiles in attempt order.
#[derive(Debug, Clone)]
pub struct ClientCatalog {
    profiles: Vec<ClientProfile>,
}

impl Default for ClientCatalog {
    fn default() -> Self {
        Self {
            profiles: DEFAULT_PRIORITY.iter().filter_map(|n| builtin(n)).collect(),
        }
    }
}

impl ClientCatalog {
    /// Builds the order from configured names. Unknown names are skipped and
    /// repeats are dropped; an empty result falls back to the default order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut profiles: Vec<ClientProfile> = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            match builtin(name) {
                Some(profile) if profiles.iter().any(|p| p.name == profile.name) => {
                    tracing::warn!("YouTube client {} listed twice, ignoring repeat", name);
                }
                Some(profile) => profiles.push(profile),
                None => tracing::warn!("Unknown YouTube client: {}", name),
            }
        }

        if profiles.is_empty() {
            tracing::warn!("No valid YouTube playback clients configured! Using default order.");
            return Self::default();
        }

        Self { profiles }
    }

    pub fn profiles_in_priority_order(&self) -> &[ClientProfile] {
        &self.profiles
    }

    pub fn get(&self, name: &str) -> Option<&ClientProfile> {
        let canonical = canonical_name(name)?;
        self.profiles.iter().find(|p| p.name == canonical)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(catalog: &ClientCatalog) -> Vec<&str> {
        catalog
            .profiles_in_priority_order()
            .iter()
            .map(|p| p.name.as_str())
            .collect()
    }

    #[test]
    fn test_default_order() {
        let catalog = ClientCatalog::default();
        assert_eq!(names(&catalog), DEFAULT_PRIORITY.to_vec());
        assert_eq!(names(&catalog).first(), Some(&"ANDROID_MUSIC"));
        assert_eq!(names(&catalog).last(), Some(&"ANDROID_VR"));
    }

    #[test]
    fn test_from_names_skips_unknown_and_duplicates() {
        let catalog = ClientCatalog::from_names(&["ios", "NOPE", "web", "IOS", "tvhtml5simply_embedded"]);
        assert_eq!(
            names(&catalog),
            vec!["IOS", "WEB", "TVHTML5_SIMPLY_EMBEDDED_PLAYER"]
        );
    }

    #[test]
    fn test_from_names_empty_falls_back() {
        let catalog = ClientCatalog::from_names::<&str>(&[]);
        assert_eq!(catalog.len(), DEFAULT_PRIORITY.len());

        let catalog = ClientCatalog::from_names(&["bogus"]);
        assert_eq!(names(&catalog), DEFAULT_PRIORITY.to_vec());
    }

    #[test]
    fn test_platform_fields_per_family() {
        let music = builtin("music").unwrap();
        assert!(music.platform_fields.contains_key("androidSdkVersion"));

        let ios = builtin("IOS").unwrap();
        assert_eq!(ios.platform_fields.get("deviceMake"), Some(&serde_json::json!("Apple")));
        assert!(ios.platform_fields.contains_key("deviceModel"));
        assert!(ios.platform_fields.contains_key("userAgent"));

        let tv = builtin("TV_EMBEDDED").unwrap();
        assert!(tv.platform_fields.is_empty());
    }

    #[test]
    fn test_get_by_alias() {
        let catalog = ClientCatalog::default();
        assert_eq!(catalog.get("music").map(|p| p.client_id), Some(21));
        assert!(catalog.get("WEB_REMIX").is_none());
    }
}

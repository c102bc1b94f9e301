//! Connection settings for the hosted data service (auth, document store,
//! realtime store). Every value comes from the environment and falls back to
//! the production project when unset or empty.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataServiceConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: String,
    pub database_url: String,
}

const FALLBACKS: [(&str, &str); 8] = [
    ("FIREBASE_API_KEY", ""),
    ("FIREBASE_AUTH_DOMAIN", "quizshow-8ded7.firebaseapp.com"),
    ("FIREBASE_PROJECT_ID", "quizshow-8ded7"),
    ("FIREBASE_STORAGE_BUCKET", "quizshow-8ded7.firebasestorage.app"),
    ("FIREBASE_MESSAGING_SENDER_ID", "952379230327"),
    ("FIREBASE_APP_ID", "1:952379230327:web:eabeb86c0e5c4b03451e72"),
    ("FIREBASE_MEASUREMENT_ID", "G-FVRVZENGSQ"),
    (
        "FIREBASE_DATABASE_URL",
        "https://quizshow-8ded7-default-rtdb.asia-southeast1.firebasedatabase.app",
    ),
];

impl DataServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let [api_key, auth_domain, project_id, storage_bucket, messaging_sender_id, app_id, measurement_id, database_url] =
            FALLBACKS.map(|(key, fallback)| {
                lookup(key)
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| fallback.to_owned())
            });

        Self {
            api_key,
            auth_domain,
            project_id,
            storage_bucket,
            messaging_sender_id,
            app_id,
            measurement_id,
            database_url,
        }
    }

    /// Analytics only runs when a measurement id is configured.
    pub fn analytics_enabled(&self) -> bool {
        !self.measurement_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn falls_back_to_production_project() {
        let config = DataServiceConfig::from_lookup(|_| None);
        assert_eq!(config.project_id, "quizshow-8ded7");
        assert_eq!(config.auth_domain, "quizshow-8ded7.firebaseapp.com");
        assert!(config.database_url.starts_with("https://quizshow-8ded7-default-rtdb"));
        assert!(config.analytics_enabled());
    }

    #[test]
    fn environment_overrides_fallbacks() {
        let env: HashMap<&str, &str> = [
            ("FIREBASE_PROJECT_ID", "quizshow-staging"),
            ("FIREBASE_API_KEY", "staging-key"),
            ("FIREBASE_AUTH_DOMAIN", ""),
        ]
        .into_iter()
        .collect();
        let config = DataServiceConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.project_id, "quizshow-staging");
        assert_eq!(config.api_key, "staging-key");
        // Empty values count as unset.
        assert_eq!(config.auth_domain, "quizshow-8ded7.firebaseapp.com");
    }

    #[test]
    fn analytics_follows_measurement_id() {
        let config = DataServiceConfig {
            measurement_id: String::new(),
            ..DataServiceConfig::from_lookup(|_| None)
        };
        assert!(!config.analytics_enabled());
    }
}

/// Connection settings for the object store.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    /// Service endpoint, with or without scheme (`oss-cn-hangzhou.aliyuncs.com`).
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    /// Signing region. Defaults to `us-east-1`.
    pub region: String,
    /// CDN or custom domain used for public links instead of the bucket host.
    pub public_base_url: Option<String>,
    /// Hand out signed GET links instead of public ones.
    pub signed_downloads: bool,
}

pub const DEFAULT_REGION: &str = "us-east-1";

impl StorageSettings {
    /// Load settings from the process environment.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `OSS_ENDPOINT`          | required    |
    /// | `OSS_BUCKET`            | required    |
    /// | `OSS_ACCESS_KEY_ID`     | required    |
    /// | `OSS_ACCESS_KEY_SECRET` | required    |
    /// | `OSS_REGION`            | `us-east-1` |
    /// | `OSS_PUBLIC_BASE_URL`   | unset       |
    /// | `OSS_SIGNED_DOWNLOADS`  | `false`     |
    ///
    /// Returns the name of the first missing required variable on failure.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| get(name).ok_or_else(|| name.to_string());

        Ok(Self {
            endpoint: require("OSS_ENDPOINT")?,
            bucket: require("OSS_BUCKET")?,
            access_key_id: require("OSS_ACCESS_KEY_ID")?,
            access_key_secret: require("OSS_ACCESS_KEY_SECRET")?,
            region: get("OSS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            public_base_url: get("OSS_PUBLIC_BASE_URL"),
            signed_downloads: get("OSS_SIGNED_DOWNLOADS")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        })
    }

    /// Endpoint host without scheme.
    pub fn host(&self) -> &str {
        let endpoint = self.endpoint.trim_end_matches('/');
        endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"))
            .unwrap_or(endpoint)
    }

    /// Endpoint as a URL, defaulting the scheme to https.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host())
        }
    }

    /// Unsigned link to `object_key`.
    pub fn public_url(&self, object_key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{object_key}", base.trim_end_matches('/')),
            None => format!("https://{}.{}/{object_key}", self.bucket, self.host()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("OSS_ENDPOINT", "https://oss-cn-hangzhou.aliyuncs.com"),
        ("OSS_BUCKET", "remixes"),
        ("OSS_ACCESS_KEY_ID", "id"),
        ("OSS_ACCESS_KEY_SECRET", "secret"),
    ];

    #[test]
    fn missing_variable_is_named() {
        let err = StorageSettings::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err, "OSS_ACCESS_KEY_ID");
    }

    #[test]
    fn blank_variable_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("OSS_BUCKET", "  ");
        assert_eq!(StorageSettings::from_lookup(lookup(&pairs)).unwrap_err(), "OSS_BUCKET");
    }

    #[test]
    fn defaults_apply() {
        let settings = StorageSettings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.region, DEFAULT_REGION);
        assert!(!settings.signed_downloads);
        assert!(settings.public_base_url.is_none());
    }

    #[test]
    fn public_url_uses_bucket_subdomain() {
        let settings = StorageSettings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(
            settings.public_url("outputs/a.mp3"),
            "https://remixes.oss-cn-hangzhou.aliyuncs.com/outputs/a.mp3"
        );
    }

    #[test]
    fn public_url_prefers_base_url() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OSS_PUBLIC_BASE_URL", "https://cdn.example.com/"));
        pairs.push(("OSS_SIGNED_DOWNLOADS", "TRUE"));
        let settings = StorageSettings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(settings.public_url("outputs/a.mp3"), "https://cdn.example.com/outputs/a.mp3");
        assert!(settings.signed_downloads);
    }

    #[test]
    fn bare_host_endpoint_gets_https() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("OSS_ENDPOINT", "oss-eu-central-1.aliyuncs.com");
        let settings = StorageSettings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(settings.endpoint_url(), "https://oss-eu-central-1.aliyuncs.com");
        assert_eq!(settings.host(), "oss-eu-central-1.aliyuncs.com");
    }
}

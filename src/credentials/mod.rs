//! AWS credential resolution for the S3 and CloudFront clients
//!
//! Each client resolves its credentials independently with a fixed
//! precedence:
//!
//! 1. explicit access key id + secret from config (secret decrypted first)
//! 2. a named profile
//! 3. nothing at all, leaving the SDK default chain (environment variables,
//!    credentials file, instance role) in charge

use crate::config::schema::{CloudFrontConfig, S3Config};
use crate::error::{SiteSyncError, SiteSyncResult};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use std::fmt;
use tracing::debug;

/// CloudFront is a global service; the SDK still needs a signing region.
const CLOUDFRONT_DEFAULT_REGION: &str = "us-east-1";

/// Provider name attached to credentials that come from our config file
const CONFIG_PROVIDER_NAME: &str = "sitesync-config";

/// Turns the stored form of a secret into the usable secret
pub trait SecretDecryptor: Send + Sync {
    fn decrypt(&self, stored: &str) -> SiteSyncResult<String>;
}

/// Default secret handling: `env:NAME` reads the secret from an environment
/// variable, anything else is used verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredSecrets;

impl SecretDecryptor for StoredSecrets {
    fn decrypt(&self, stored: &str) -> SiteSyncResult<String> {
        match stored.strip_prefix("env:") {
            Some(var) => std::env::var(var).map_err(|e| SiteSyncError::SecretUnavailable {
                reference: stored.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(stored.to_string()),
        }
    }
}

/// Where a client's credentials come from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Access key pair from configuration
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Named profile from the shared AWS config files
    Profile(String),
    /// No override; the SDK default provider chain decides
    Ambient,
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            Self::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
            Self::Ambient => f.write_str("Ambient"),
        }
    }
}

impl CredentialSource {
    /// Apply the key > profile > ambient precedence
    pub fn resolve(
        client: &str,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        profile: Option<&str>,
        decryptor: &dyn SecretDecryptor,
    ) -> SiteSyncResult<Self> {
        if let (Some(key), Some(stored)) = (access_key_id, secret_access_key) {
            let secret = decryptor
                .decrypt(stored)
                .map_err(|e| SiteSyncError::SecretDecrypt {
                    client: client.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Self::Static {
                access_key_id: key.to_string(),
                secret_access_key: secret,
            });
        }

        if let Some(profile) = profile {
            return Ok(Self::Profile(profile.to_string()));
        }

        Ok(Self::Ambient)
    }

    /// Short label for log lines
    pub fn describe(&self) -> String {
        match self {
            Self::Static { access_key_id, .. } => format!("access key {}", access_key_id),
            Self::Profile(name) => format!("profile {}", name),
            Self::Ambient => "default credential chain".to_string(),
        }
    }
}

/// Everything needed to build one SDK client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Client label ("s3", "cloudfront") for logs and errors
    pub client: &'static str,
    pub region: Option<String>,
    pub source: CredentialSource,
}

impl ClientSettings {
    /// Resolve settings for the S3 client
    pub fn for_s3(config: &S3Config, decryptor: &dyn SecretDecryptor) -> SiteSyncResult<Self> {
        let source = CredentialSource::resolve(
            "s3",
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            config.profile.as_deref(),
            decryptor,
        )?;

        Ok(Self {
            client: "s3",
            region: config.region.clone(),
            source,
        })
    }

    /// Resolve settings for the CloudFront client
    pub fn for_cloudfront(
        config: &CloudFrontConfig,
        decryptor: &dyn SecretDecryptor,
    ) -> SiteSyncResult<Self> {
        let source = CredentialSource::resolve(
            "cloudfront",
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            config.profile.as_deref(),
            decryptor,
        )?;

        Ok(Self {
            client: "cloudfront",
            region: Some(
                config
                    .region
                    .clone()
                    .unwrap_or_else(|| CLOUDFRONT_DEFAULT_REGION.to_string()),
            ),
            source,
        })
    }

    /// Load an SDK config honoring the resolved credential source.
    ///
    /// Credentials are resolved once up front so a bad key, a missing
    /// profile, or an empty default chain stops the run here instead of
    /// failing every upload individually.
    pub async fn load_sdk_config(&self) -> SiteSyncResult<SdkConfig> {
        let config = self.sdk_config().await;

        let provider = config
            .credentials_provider()
            .ok_or_else(|| SiteSyncError::ClientBuild {
                client: self.client.to_string(),
                reason: "no credentials provider available".to_string(),
            })?;

        provider
            .provide_credentials()
            .await
            .map_err(|e| SiteSyncError::ClientBuild {
                client: self.client.to_string(),
                reason: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(config)
    }

    async fn sdk_config(&self) -> SdkConfig {
        debug!(
            client = self.client,
            region = self.region.as_deref().unwrap_or("<default>"),
            "Using {}",
            self.source.describe()
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let loader = match &self.source {
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            } => loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                CONFIG_PROVIDER_NAME,
            )),
            CredentialSource::Profile(name) => loader.profile_name(name),
            CredentialSource::Ambient => loader,
        };

        loader.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reversing;

    impl SecretDecryptor for Reversing {
        fn decrypt(&self, stored: &str) -> SiteSyncResult<String> {
            Ok(stored.chars().rev().collect())
        }
    }

    #[test]
    fn explicit_keys_win_over_profile() {
        let source = CredentialSource::resolve(
            "s3",
            Some("AKIAEXAMPLE"),
            Some("terces"),
            Some("deploy"),
            &Reversing,
        )
        .unwrap();

        assert_eq!(
            source,
            CredentialSource::Static {
                access_key_id: "AKIAEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
            }
        );
    }

    #[test]
    fn profile_used_without_keys() {
        let source =
            CredentialSource::resolve("s3", None, None, Some("deploy"), &StoredSecrets).unwrap();
        assert_eq!(source, CredentialSource::Profile("deploy".to_string()));
    }

    #[test]
    fn key_without_secret_falls_through() {
        let source =
            CredentialSource::resolve("s3", Some("AKIAEXAMPLE"), None, Some("deploy"), &StoredSecrets)
                .unwrap();
        assert_eq!(source, CredentialSource::Profile("deploy".to_string()));
    }

    #[test]
    fn ambient_when_nothing_configured() {
        let source = CredentialSource::resolve("s3", None, None, None, &StoredSecrets).unwrap();
        assert_eq!(source, CredentialSource::Ambient);
    }

    #[test]
    fn clients_resolve_independently() {
        let s3 = S3Config {
            profile: Some("site".to_string()),
            ..Default::default()
        };
        let cf = CloudFrontConfig {
            access_key_id: Some("AKIACF".to_string()),
            secret_access_key: Some("cfsecret".to_string()),
            ..Default::default()
        };

        let s3_settings = ClientSettings::for_s3(&s3, &StoredSecrets).unwrap();
        let cf_settings = ClientSettings::for_cloudfront(&cf, &StoredSecrets).unwrap();

        assert_eq!(s3_settings.source, CredentialSource::Profile("site".to_string()));
        assert!(matches!(cf_settings.source, CredentialSource::Static { .. }));
        assert_eq!(cf_settings.region.as_deref(), Some(CLOUDFRONT_DEFAULT_REGION));
        assert!(s3_settings.region.is_none());
    }

    #[test]
    fn debug_redacts_secret() {
        let source = CredentialSource::Static {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI".to_string(),
        };
        let rendered = format!("{:?}", source);
        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn stored_secret_passthrough() {
        assert_eq!(StoredSecrets.decrypt("plain").unwrap(), "plain");
    }

    #[test]
    fn stored_secret_missing_env_var() {
        let err = StoredSecrets
            .decrypt("env:SITESYNC_TEST_SECRET_THAT_IS_NOT_SET")
            .unwrap_err();
        assert!(matches!(err, SiteSyncError::SecretUnavailable { .. }));
    }

    #[test]
    fn decrypt_failure_names_client_once() {
        let err = CredentialSource::resolve(
            "cloudfront",
            Some("AKIAEXAMPLE"),
            Some("env:SITESYNC_TEST_SECRET_THAT_IS_NOT_SET"),
            None,
            &StoredSecrets,
        )
        .unwrap_err();

        match err {
            SiteSyncError::SecretDecrypt { client, reason } => {
                assert_eq!(client, "cloudfront");
                assert!(reason.contains("env:SITESYNC_TEST_SECRET_THAT_IS_NOT_SET"));
                assert!(!reason.contains("decrypt"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}

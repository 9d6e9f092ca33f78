//! reCAPTCHA verification
//!
//! Login requests carry a challenge token from the browser widget; it is
//! checked against Google's siteverify endpoint before credentials are looked at.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Captcha token is missing")]
    MissingToken,

    #[error("Captcha verification failed: {0:?}")]
    Rejected(Vec<String>),

    #[error("Captcha verification is not configured")]
    NotConfigured,

    #[error("Captcha service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

#[derive(Clone)]
pub struct CaptchaVerifier {
    client: reqwest::Client,
    secret: Option<SecretString>,
    /// Without a secret: accept every login (development) or refuse them all
    skip_when_unconfigured: bool,
}

impl CaptchaVerifier {
    pub fn new(secret: Option<SecretString>, skip_when_unconfigured: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
            skip_when_unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub async fn verify(&self, token: Option<&str>) -> Result<(), CaptchaError> {
        let Some(secret) = &self.secret else {
            if self.skip_when_unconfigured {
                tracing::debug!("RECAPTCHA_SECRET_KEY not set, skipping captcha check");
                return Ok(());
            }
            return Err(CaptchaError::NotConfigured);
        };

        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(CaptchaError::MissingToken)?;

        let resp: SiteVerifyResponse = self
            .client
            .post(SITEVERIFY_URL)
            .form(&[("secret", secret.expose_secret()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.success {
            Ok(())
        } else {
            Err(CaptchaError::Rejected(resp.error_codes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_development_skips() {
        let verifier = CaptchaVerifier::new(None, true);
        assert!(!verifier.is_configured());
        assert!(verifier.verify(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_production_refuses() {
        let verifier = CaptchaVerifier::new(None, false);
        assert!(matches!(
            verifier.verify(Some("token")).await,
            Err(CaptchaError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_missing_token_rejected_before_network() {
        let verifier = CaptchaVerifier::new(Some(SecretString::from("s3cret")), false);
        assert!(matches!(verifier.verify(None).await, Err(CaptchaError::MissingToken)));
        assert!(matches!(verifier.verify(Some("  ")).await, Err(CaptchaError::MissingToken)));
    }

    #[test]
    fn test_siteverify_payload() {
        let resp: SiteVerifyResponse =
            serde_json::from_str(r#"{"success":false,"error-codes":["timeout-or-duplicate"]}"#)
                .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error_codes, vec!["timeout-or-duplicate"]);
    }
}

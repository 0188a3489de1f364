use hmac::{Hmac, Mac, NewMac};
use sha1::Sha1;
use tracing::trace;

type HmacSha1 = Hmac<Sha1>;

/// Shared secret configured on the GitHub webhook.
///
/// Two operating modes:
/// - with a secret, every payload must carry a valid `X-Hub-Signature` header, anything else is
///   rejected;
/// - without a secret, verification is disabled and every payload is accepted. Anybody who can
///   reach the listener can then post notifications.
#[derive(Clone, Debug, Default)]
pub struct GitHubSecret(pub Option<String>);

impl GitHubSecret {
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Checks the `X-Hub-Signature` header value against the raw request body.
    pub fn verify(&self, signature: Option<&str>, body: &[u8]) -> bool {
        let secret = match &self.0 {
            Some(secret) => secret,
            None => {
                trace!("no secret configured, skipping signature validation");
                return true;
            }
        };

        match signature {
            Some(signature) => validate_signature(secret, signature, body),
            None => {
                trace!("secret configured but payload isn't signed");
                false
            }
        }
    }
}

fn validate_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    trace!("validating signature...");

    // HMAC accepts keys of any length
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };

    mac.update(body);

    // GitHub puts a prefix in front of its hex SHA1
    let signature = match signature.strip_prefix("sha1=") {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    // GitHub sends lowercase hex, and the header has to match it exactly
    if signature.bytes().any(|b| b.is_ascii_uppercase()) {
        trace!("signature `{}` isn't lowercase hex", signature);
        return false;
    }

    // `verify` compares in constant time
    match hex::decode(signature) {
        Ok(bytes) => mac.verify(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", signature);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = b"The quick brown fox jumps over the lazy dog";
    const SIGNATURE: &str = "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9";

    fn secret() -> GitHubSecret {
        GitHubSecret(Some("key".to_string()))
    }

    #[test]
    fn valid_signature() {
        assert!(secret().verify(Some(SIGNATURE), BODY));
    }

    #[test]
    fn tampered_body() {
        let mut body = BODY.to_vec();
        body[4] ^= 1;

        assert!(!secret().verify(Some(SIGNATURE), &body));
        assert!(!secret().verify(Some(SIGNATURE), &BODY[..BODY.len() - 1]));
    }

    #[test]
    fn wrong_secret() {
        let secret = GitHubSecret(Some("other key".to_string()));

        assert!(!secret.verify(Some(SIGNATURE), BODY));
    }

    #[test]
    fn missing_signature() {
        assert!(!secret().verify(None, BODY));
    }

    #[test]
    fn malformed_signature() {
        let unprefixed = SIGNATURE.trim_start_matches("sha1=");
        assert!(!secret().verify(Some(unprefixed), BODY));

        let sha256 = SIGNATURE.replace("sha1=", "sha256=");
        assert!(!secret().verify(Some(&sha256), BODY));

        assert!(!secret().verify(Some("sha1=not-hex"), BODY));
        assert!(!secret().verify(Some("sha1=de7c9b85"), BODY));
        assert!(!secret().verify(Some(""), BODY));
    }

    #[test]
    fn signature_must_match_exactly() {
        let uppercase = "sha1=DE7C9B85B8B78AA6BC8A7A36F70A90701C9DB4D9";
        assert!(!secret().verify(Some(uppercase), BODY));

        let mixed = SIGNATURE.replace("de7c", "De7C");
        assert!(!secret().verify(Some(&mixed), BODY));

        assert!(!secret().verify(Some(&SIGNATURE.replace("sha1=", "SHA1=")), BODY));
        assert!(!secret().verify(Some(&format!("{} ", SIGNATURE)), BODY));
    }

    #[test]
    fn disabled_accepts_everything() {
        let secret = GitHubSecret::default();

        assert!(!secret.is_enabled());
        assert!(secret.verify(None, BODY));
        assert!(secret.verify(Some("sha1=garbage"), b"anything"));
        assert!(secret.verify(Some(SIGNATURE), b""));
    }
}

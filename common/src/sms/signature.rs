use crate::errors::SmsError;
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate a random salt for request signing
///
/// 16 random bytes, hex-encoded (32 characters).
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 16] = rng.gen();
    hex::encode(random_bytes)
}

/// Format a signing timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_signing_date(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Compute the hex HMAC-SHA256 of `date + salt` keyed with the API secret
pub fn sign(api_secret: &str, date: &str, salt: &str) -> Result<String, SmsError> {
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| SmsError::SigningFailed(format!("Invalid API secret: {}", e)))?;

    mac.update(date.as_bytes());
    mac.update(salt.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build the `Authorization` header value for one request
pub fn authorization_header(
    api_key: &str,
    api_secret: &str,
    date: &str,
    salt: &str,
) -> Result<String, SmsError> {
    let signature = sign(api_secret, date, salt)?;
    Ok(format!(
        "HMAC-SHA256 apiKey={}, date={}, salt={}, signature={}",
        api_key, date, salt, signature
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_ne!(salt1, salt2);
        assert_eq!(salt1.len(), 32);
        assert!(hex::decode(&salt1).is_ok());
    }

    #[test]
    fn test_format_signing_date_drops_subseconds() {
        let now = Utc
            .with_ymd_and_hms(2026, 1, 29, 0, 0, 5)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(789))
            .unwrap();
        assert_eq!(format_signing_date(now), "2026-01-29T00:00:05Z");
    }

    #[test]
    fn test_sign_matches_hmac_of_concatenation() {
        let date = "2026-01-29T00:00:05Z";
        let salt = "0123456789abcdef0123456789abcdef";

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(format!("{date}{salt}").as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign("secret", date, salt).unwrap(), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_sign_depends_on_secret() {
        let date = "2026-01-29T00:00:05Z";
        let salt = "00";
        assert_ne!(sign("a", date, salt).unwrap(), sign("b", date, salt).unwrap());
    }

    #[test]
    fn test_authorization_header_layout() {
        let header = authorization_header("KEY", "secret", "2026-01-29T00:00:05Z", "abcd").unwrap();
        let signature = sign("secret", "2026-01-29T00:00:05Z", "abcd").unwrap();
        assert_eq!(
            header,
            format!("HMAC-SHA256 apiKey=KEY, date=2026-01-29T00:00:05Z, salt=abcd, signature={signature}")
        );
    }
}

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tracing::debug;
use shared_models::auth::{JwtClaims, User};

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_AUDIENCE: &str = "clinic-staff";

/// Identity fields carried in an access token.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub full_name: &'a str,
    pub role: &'a str,
}

/// Sign an HS256 access token valid for `ttl`.
pub fn issue_token(subject: &TokenSubject<'_>, jwt_secret: &str, ttl: Duration) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let header = json!({ "alg": "HS256", "typ": "JWT" });
    let claims = JwtClaims {
        sub: subject.user_id.to_string(),
        exp: Some((now + ttl).timestamp().max(0) as u64),
        iat: Some(now.timestamp() as u64),
        username: Some(subject.username.to_string()),
        full_name: Some(subject.full_name.to_string()),
        role: Some(subject.role.to_string()),
        aud: Some(TOKEN_AUDIENCE.to_string()),
    };
    let claims_json = serde_json::to_string(&claims)
        .map_err(|e| format!("Failed to encode claims: {}", e))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims_json),
    );

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        },
    };

    let Some(exp) = claims.exp else {
        debug!("Token for {} carries no expiry", claims.sub);
        return Err("Token has no expiry".to_string());
    };
    let now = Utc::now().timestamp() as u64;
    if exp < now {
        debug!("Token expired at {} (now: {})", exp, now);
        return Err("Token expired".to_string());
    }

    match claims.aud.as_deref() {
        Some(TOKEN_AUDIENCE) => {}
        Some(aud) => {
            debug!("Token audience mismatch: {}", aud);
            return Err("Invalid token audience".to_string());
        }
        None => return Err("Token has no audience".to_string()),
    }

    let issued_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        username: claims.username,
        full_name: claims.full_name,
        role: claims.role,
        issued_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            user_id: "7f1c3c1e-4a6b-4f55-9c1a-1f0e5b7d2a10",
            username: "reception1",
            full_name: "Front Desk",
            role: "receptionist",
        }
    }

    #[test]
    fn issued_token_validates_with_same_secret() {
        let token = issue_token(&subject(), "secret", Duration::minutes(5)).unwrap();
        let user = validate_token(&token, "secret").unwrap();

        assert_eq!(user.id, "7f1c3c1e-4a6b-4f55-9c1a-1f0e5b7d2a10");
        assert_eq!(user.username.as_deref(), Some("reception1"));
        assert_eq!(user.role.as_deref(), Some("receptionist"));
        assert!(user.issued_at.is_some());
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = issue_token(&subject(), "secret", Duration::minutes(5)).unwrap();
        assert_eq!(validate_token(&token, "other").unwrap_err(), "Invalid token signature");

        let expired = issue_token(&subject(), "secret", Duration::hours(-1)).unwrap();
        assert_eq!(validate_token(&expired, "secret").unwrap_err(), "Token expired");
    }

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(json!({ "alg": "HS256", "typ": "JWT" }).to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string()),
        );
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn signed_tokens_must_carry_expiry_and_audience() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();

        let no_exp = sign(json!({ "sub": "u1", "role": "admin", "aud": TOKEN_AUDIENCE }), "secret");
        assert_eq!(validate_token(&no_exp, "secret").unwrap_err(), "Token has no expiry");

        let no_aud = sign(json!({ "sub": "u1", "role": "admin", "exp": exp }), "secret");
        assert_eq!(validate_token(&no_aud, "secret").unwrap_err(), "Token has no audience");

        let other_aud = sign(json!({ "sub": "u1", "role": "admin", "exp": exp, "aud": "authenticated" }), "secret");
        assert_eq!(validate_token(&other_aud, "secret").unwrap_err(), "Invalid token audience");

        let complete = sign(json!({ "sub": "u1", "role": "admin", "exp": exp, "aud": TOKEN_AUDIENCE }), "secret");
        assert_eq!(validate_token(&complete, "secret").unwrap().id, "u1");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(validate_token("abc", "secret").unwrap_err(), "Invalid token format");
        assert!(issue_token(&subject(), "", Duration::minutes(1)).is_err());
    }
}

use crate::entities::users::Role;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token payload: the caller's email plus the persisted role claim, if any.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Signs an HS256 token without issuer or audience.
pub fn create_jwt(
    email: &str,
    role: Option<Role>,
    secret: &str,
    lifetime: Duration,
) -> Result<IssuedToken> {
    let expiration = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(|| anyhow::anyhow!("token expiration out of range"))?;

    let claims = Claims {
        email: email.to_owned(),
        role,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(IssuedToken { token, expiration })
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_cycle() {
        let secret = "test_secret";
        let issued = create_jwt("ana@example.com", None, secret, Duration::days(365)).unwrap();
        let claims = validate_jwt(&issued.token, secret).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.role.is_none());
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_admin_claim_survives_round_trip() {
        let secret = "test_secret";
        let issued =
            create_jwt("root@example.com", Some(Role::Admin), secret, Duration::days(1)).unwrap();
        let claims = validate_jwt(&issued.token, secret).unwrap();
        assert!(claims.is_admin());
    }

    #[test]
    fn test_expiration_is_one_year_out() {
        let issued = create_jwt("a@b.com", None, "s", Duration::days(365)).unwrap();
        let days = (issued.expiration - Utc::now()).num_days();
        assert!((364..=365).contains(&days));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = create_jwt("a@b.com", None, "one", Duration::days(1)).unwrap();
        assert!(validate_jwt(&issued.token, "two").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = create_jwt("a@b.com", None, "s", Duration::days(-2)).unwrap();
        assert!(validate_jwt(&issued.token, "s").is_err());
    }
}

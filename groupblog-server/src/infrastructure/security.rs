use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verifies access tokens minted by the identity provider (HS256, shared
/// secret). This server never issues tokens itself.
#[derive(Clone)]
pub struct JwtKeys {
    secret: String,
}

impl JwtKeys {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    #[cfg(test)]
    pub fn issue_token(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            preferred_username: username.to_string(),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub preferred_username: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_the_same_secret_verifies() {
        let keys = JwtKeys::new("shared-secret".into());
        let id = Uuid::new_v4();
        let token = keys.issue_token(id, "alice").unwrap();

        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(id));
        assert_eq!(claims.preferred_username, "alice");
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = JwtKeys::new("one".into())
            .issue_token(Uuid::new_v4(), "alice")
            .unwrap();
        assert!(JwtKeys::new("two".into()).verify_token(&token).is_err());
    }
}

use crate::models::{Claims, TokenType, UserSql};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

pub fn now() -> usize {
    chrono::Utc::now().timestamp().max(0) as usize
}

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct Identity {
    pub pegawai_id: u64,
    pub nip: String,
    pub role_id: u8,
    pub skpd_id: u64,
    pub subunit_id: u64,
}

impl From<&UserSql> for Identity {
    fn from(user: &UserSql) -> Self {
        Self {
            pegawai_id: user.pegawai_id,
            nip: user.pegawai_nip.clone(),
            role_id: user.role_id,
            skpd_id: user.skpd_id,
            subunit_id: user.subunit_id,
        }
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Self {
            pegawai_id: claims.pegawai_id,
            nip: claims.sub.clone(),
            role_id: claims.role,
            skpd_id: claims.skpd_id,
            subunit_id: claims.subunit_id,
        }
    }
}

fn issue(
    who: &Identity,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        pegawai_id: who.pegawai_id,
        sub: who.nip.clone(),
        role: who.role_id,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        skpd_id: who.skpd_id,
        subunit_id: who.subunit_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(
    who: &Identity,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(who, TokenType::Access, secret, ttl)
}

pub fn generate_refresh_token(
    who: &Identity,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(who, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn identity(role_id: u8) -> Identity {
        Identity {
            pegawai_id: 1000,
            nip: "198501012010011001".into(),
            role_id,
            skpd_id: 3,
            subunit_id: 31,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let (token, issued) = generate_access_token(&identity(2), "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();

        assert_eq!(claims.pegawai_id, 1000);
        assert_eq!(claims.sub, "198501012010011001");
        assert_eq!(claims.role, 2);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn refresh_token_is_marked() {
        let (token, _) = generate_refresh_token(&identity(4), "s3cret", 60).unwrap();
        assert_eq!(
            verify_token(&token, "s3cret").unwrap().token_type,
            TokenType::Refresh
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = generate_access_token(&identity(4), "s3cret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn each_token_gets_its_own_id() {
        let (_, a) = generate_access_token(&identity(4), "s3cret", 60).unwrap();
        let (_, b) = generate_access_token(&identity(4), "s3cret", 60).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}

use crate::config::Config;
use crate::error::ApiError;
use crate::model::leave_request::LeaveRequest;
use crate::utils::revoked_tokens;
use crate::workflow::transition::Actor;
use crate::{
    auth::jwt::verify_token,
    model::role::Role,
    models::{Claims, TokenType},
};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// The caller's session, built once per request from a verified access token.
///
/// Role checks done here gate what this service will do. Whatever the web
/// front end hides or shows based on role is cosmetic only.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub pegawai_id: u64,
    pub nip: String,
    pub role: Role,
    pub skpd_id: u64,
    pub subunit_id: u64,

    /// `jti` and `exp` of the access token, needed to revoke it on logout
    pub token_id: String,
    pub expires_at: usize,
}

/// Which leave requests a session may see.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Skpd(u64),
    Subunit(u64),
    Own(u64),
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Result<Self, ApiError> {
        if claims.token_type != TokenType::Access {
            return Err(ApiError::Unauthorized("Access token required".into()));
        }
        let role = Role::from_id(claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid role".into()))?;

        Ok(AuthUser {
            pegawai_id: claims.pegawai_id,
            nip: claims.sub,
            role,
            skpd_id: claims.skpd_id,
            subunit_id: claims.subunit_id,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }

    /// Verify a bearer token and open a session from it.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, ApiError> {
        let claims = verify_token(token, secret)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;
        if revoked_tokens::is_revoked(&claims.jti) {
            return Err(ApiError::Unauthorized("Token has been revoked".into()));
        }
        Self::from_claims(claims)
    }

    pub fn actor(&self) -> Actor {
        Actor {
            pegawai_id: self.pegawai_id,
            role: self.role,
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin only".into()))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::SuperAdmin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Super Admin only".into()))
        }
    }

    pub fn scope(&self) -> Scope {
        match self.role {
            Role::SuperAdmin => Scope::All,
            Role::AdminSkpd => Scope::Skpd(self.skpd_id),
            Role::AdminUker => Scope::Subunit(self.subunit_id),
            Role::Pegawai => Scope::Own(self.pegawai_id),
        }
    }

    /// A request is visible inside the session's scope, and always to the
    /// immediate supervisor named on it.
    pub fn can_view(&self, leave: &LeaveRequest) -> bool {
        leave.atasanlangsung_id == Some(self.pegawai_id)
            || self.can_view_employee(leave.pegawai_id, leave.skpd_id, leave.subunit_id)
    }

    /// Whether this session administers SKPD-level master data of `skpd_id`.
    pub fn can_manage_skpd(&self, skpd_id: u64) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::AdminSkpd | Role::AdminUker => self.skpd_id == skpd_id,
            Role::Pegawai => false,
        }
    }

    /// Whether this session may look at another employee's records.
    pub fn can_view_employee(&self, pegawai_id: u64, skpd_id: u64, subunit_id: u64) -> bool {
        match self.scope() {
            Scope::All => true,
            Scope::Skpd(id) => skpd_id == id,
            Scope::Subunit(id) => subunit_id == id,
            Scope::Own(id) => pegawai_id == id,
        }
    }
}

pub fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match bearer(req) {
            Some(t) => t,
            None => return ready(Err(ApiError::Unauthorized("Missing token".into()).into())),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ApiError::Internal.into())),
        };

        ready(AuthUser::from_token(token, &config.jwt_secret).map_err(Into::into))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_refresh_token, tests::identity};
    use crate::model::leave_request::fixtures::leave;
    use crate::model::status::LeaveStatus;
    use actix_web::{ResponseError, http::StatusCode, test as actix_test};

    pub fn user(role: Role) -> AuthUser {
        AuthUser {
            pegawai_id: 1000,
            nip: "198501012010011001".into(),
            role,
            skpd_id: 3,
            subunit_id: 31,
            token_id: "jti".into(),
            expires_at: 0,
        }
    }

    #[test]
    fn scope_follows_role() {
        assert_eq!(user(Role::SuperAdmin).scope(), Scope::All);
        assert_eq!(user(Role::AdminSkpd).scope(), Scope::Skpd(3));
        assert_eq!(user(Role::AdminUker).scope(), Scope::Subunit(31));
        assert_eq!(user(Role::Pegawai).scope(), Scope::Own(1000));
    }

    #[test]
    fn can_view_respects_scope() {
        let mut other_unit = leave(LeaveStatus::Verifikasi, 55);
        other_unit.skpd_id = 9;
        other_unit.subunit_id = 91;

        assert!(user(Role::SuperAdmin).can_view(&other_unit));
        assert!(!user(Role::AdminSkpd).can_view(&other_unit));
        assert!(!user(Role::AdminUker).can_view(&other_unit));
        assert!(!user(Role::Pegawai).can_view(&other_unit));
        assert!(user(Role::Pegawai).can_view(&leave(LeaveStatus::Verifikasi, 1000)));
    }

    #[test]
    fn supervisor_sees_subordinate_request_outside_scope() {
        let mut subordinate = leave(LeaveStatus::Verifikasi, 55);
        subordinate.skpd_id = 9;
        subordinate.atasanlangsung_id = Some(1000);

        assert!(user(Role::Pegawai).can_view(&subordinate));
        assert!(user(Role::AdminUker).can_view(&subordinate));
    }

    #[test]
    fn skpd_master_data_follows_placement() {
        assert!(user(Role::SuperAdmin).can_manage_skpd(9));
        assert!(user(Role::AdminSkpd).can_manage_skpd(3));
        assert!(user(Role::AdminUker).can_manage_skpd(3));
        assert!(!user(Role::AdminSkpd).can_manage_skpd(9));
        assert!(!user(Role::Pegawai).can_manage_skpd(3));
    }

    #[test]
    fn pegawai_is_not_admin() {
        let err = user(Role::Pegawai).require_admin().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(user(Role::AdminUker).require_admin().is_ok());
        assert!(user(Role::AdminSkpd).require_super_admin().is_err());
        assert!(user(Role::SuperAdmin).require_super_admin().is_ok());
    }

    #[actix_web::test]
    async fn extracts_session_from_bearer_token() {
        let config = Config::for_tests();
        let (token, _) = generate_access_token(&identity(3), &config.jwt_secret, 60).unwrap();
        let req = actix_test::TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .app_data(Data::new(config))
            .to_http_request();

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.role, Role::AdminUker);
        assert_eq!(user.pegawai_id, 1000);
        assert_eq!(user.subunit_id, 31);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = actix_test::TestRequest::default()
            .app_data(Data::new(Config::for_tests()))
            .to_http_request();
        let err = AuthUser::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_token_cannot_open_a_session() {
        let config = Config::for_tests();
        let (token, _) = generate_refresh_token(&identity(4), &config.jwt_secret, 60).unwrap();
        assert!(AuthUser::from_token(&token, &config.jwt_secret).is_err());
    }

    #[actix_web::test]
    async fn revoked_token_cannot_open_a_session() {
        let config = Config::for_tests();
        let (token, claims) = generate_access_token(&identity(4), &config.jwt_secret, 60).unwrap();
        assert!(AuthUser::from_token(&token, &config.jwt_secret).is_ok());

        revoked_tokens::revoke(&claims.jti, claims.exp).await;
        assert!(AuthUser::from_token(&token, &config.jwt_secret).is_err());
    }
}

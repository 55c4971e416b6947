use crate::{
    auth::{
        auth::{AuthUser, bearer},
        jwt::{Identity, generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::ApiError,
    model::{employee::Employee, role::Role},
    models::{Claims, LoginReqDto, TokenType, UserSql},
    utils::revoked_tokens,
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub pegawai: Employee,
    /// Name with academic titles
    pub nama_gelar: String,
    pub role: Role,
    pub role_level: u8,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: ProfileResponse,
}

async fn load_profile(pool: &MySqlPool, pegawai_id: u64, role: Role) -> Result<ProfileResponse, ApiError> {
    let pegawai = sqlx::query_as::<_, Employee>(
        r#"
        SELECT pegawai_id, pegawai_nip, pegawai_nama, pegawai_gelardepan,
               pegawai_gelarbelakang, pegawai_email, pegawai_nohp, skpd_id, subunit_id
        FROM pegawai
        WHERE pegawai_id = ?
        "#,
    )
    .bind(pegawai_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, pegawai_id, "Failed to load profile");
        ApiError::Internal
    })?
    .ok_or_else(|| ApiError::NotFound("Employee profile not found".into()))?;

    Ok(ProfileResponse {
        nama_gelar: pegawai.full_name(),
        pegawai,
        role,
        role_level: role.level(),
    })
}

/// Issue an access/refresh pair and record the refresh token.
async fn issue_pair(
    pool: &MySqlPool,
    config: &Config,
    who: &Identity,
) -> Result<(String, String), ApiError> {
    let (access_token, _) = generate_access_token(who, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| {
            error!(error = %e, "Failed to sign access token");
            ApiError::Internal
        })?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(who, &config.jwt_secret, config.refresh_token_ttl).map_err(|e| {
            error!(error = %e, "Failed to sign refresh token");
            ApiError::Internal
        })?;

    debug!(pegawai_id = who.pegawai_id, jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (pegawai_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(who.pegawai_id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to store refresh token");
        ApiError::Internal
    })?;

    Ok((access_token, refresh_token))
}

/// Log in with NIP and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "NIP or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(nip = %user.pegawai_nip)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if user.pegawai_nip.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty NIP or password");
        return Err(ApiError::BadRequest("NIP and password are required".into()));
    }

    let db_user = sqlx::query_as::<_, UserSql>(
        r#"
        SELECT u.pegawai_id, p.pegawai_nip, u.password, u.role_id,
               COALESCE(u.skpd_id, p.skpd_id) AS skpd_id, p.subunit_id
        FROM users u
        JOIN pegawai p ON p.pegawai_id = u.pegawai_id
        WHERE p.pegawai_nip = ? AND u.is_active = 1
        "#,
    )
    .bind(user.pegawai_nip.trim())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Database error while fetching user");
        ApiError::Internal
    })?;

    let Some(db_user) = db_user else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let role = Role::from_id(db_user.role_id).ok_or_else(|| {
        error!(role_id = db_user.role_id, "Account has an unknown role");
        ApiError::Unauthorized("Invalid role".into())
    })?;

    let who = Identity::from(&db_user);
    let (access_token, refresh_token) = issue_pair(pool.get_ref(), &config, &who).await?;

    // non-fatal
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE pegawai_id = ?")
        .bind(db_user.pegawai_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    let profile = load_profile(pool.get_ref(), db_user.pegawai_id, role).await?;

    info!(pegawai_id = db_user.pegawai_id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        user: profile,
    }))
}

/// Profile of the logged-in employee
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let profile = load_profile(pool.get_ref(), auth.pegawai_id, auth.role).await?;
    Ok(HttpResponse::Ok().json(profile))
}

fn refresh_claims(req: &HttpRequest, config: &Config) -> Result<Claims, ApiError> {
    let token = bearer(req).ok_or_else(|| ApiError::Unauthorized("No token".into()))?;
    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid token".into()))?;
    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized("Refresh token required".into()));
    }
    Ok(claims)
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = Object, example = json!({
            "access_token": "...",
            "refresh_token": "..."
        })),
        (status = 401, description = "Refresh token invalid, revoked or expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let claims = refresh_claims(&req, &config)?;

    // revoke the presented token; 0 rows means it was unknown or already used
    let revoked = sqlx::query(
        "UPDATE refresh_tokens SET revoked = 1 WHERE jti = ? AND revoked = 0",
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to revoke refresh token");
        ApiError::Internal
    })?;

    if revoked.rows_affected() == 0 {
        info!(pegawai_id = claims.pegawai_id, "Refresh token reuse or unknown jti");
        return Err(ApiError::Unauthorized("Refresh token is no longer valid".into()));
    }

    let (access_token, refresh_token) =
        issue_pair(pool.get_ref(), &config, &Identity::from(&claims)).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": refresh_token
    })))
}

/// End the session
///
/// With an access token, that token is revoked until it expires and every
/// refresh token of the employee is revoked. With a refresh token only that
/// token is revoked. Always answers 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let Some(claims) = bearer(&req).and_then(|t| verify_token(t, &config.jwt_secret).ok()) else {
        return HttpResponse::NoContent().finish();
    };

    let result = match claims.token_type {
        TokenType::Access => {
            revoked_tokens::revoke(&claims.jti, claims.exp).await;
            sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE pegawai_id = ?")
                .bind(claims.pegawai_id)
                .execute(pool.get_ref())
                .await
        }
        TokenType::Refresh => sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
            .bind(&claims.jti)
            .execute(pool.get_ref())
            .await,
    };

    if let Err(e) = result {
        error!(error = %e, pegawai_id = claims.pegawai_id, "Failed to revoke refresh tokens");
    }

    info!(pegawai_id = claims.pegawai_id, "Logged out");
    HttpResponse::NoContent().finish()
}

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::user_role::UserRoleAssignment;
use crate::utils::pagination::Page;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserRoleFilter {
    pub skpd_id: Option<u64>,
    pub role_id: Option<u8>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRole {
    #[schema(example = 1000)]
    pub pegawai_id: u64,
    #[schema(example = 2)]
    pub role_id: u8,
    #[schema(example = 3)]
    pub skpd_id: u64,
    /// Required when the employee has no account yet; resets it otherwise
    #[schema(nullable = true)]
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserRoleListResponse {
    pub data: Vec<UserRoleAssignment>,
    pub total: i64,
    pub page: u64,
    pub limit: u64,
}

pub fn user_role_filter(query: &UserRoleFilter) -> WhereClause {
    let mut w = WhereClause::new();
    w.and("u.is_active = ?", SqlValue::I32(1))
        .and_opt(
            "COALESCE(u.skpd_id, p.skpd_id) = ?",
            query.skpd_id.map(SqlValue::U64),
        )
        .and_opt("u.role_id = ?", query.role_id.map(|r| SqlValue::I32(i32::from(r))));
    w
}

/// Role being granted. A Super Admin never changes their own account.
pub fn validate_assignment(auth: &AuthUser, payload: &AssignRole) -> Result<Role, ApiError> {
    let role = Role::from_id(payload.role_id)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role_id {}", payload.role_id)))?;
    if payload.pegawai_id == auth.pegawai_id {
        return Err(ApiError::Forbidden("Your own role cannot be changed".into()));
    }
    Ok(role)
}

/// Argon2 hash for the account password. New accounts must set one.
pub fn password_for(has_account: bool, password: Option<&str>) -> Result<Option<String>, ApiError> {
    match password {
        None if has_account => Ok(None),
        None => Err(ApiError::BadRequest(
            "password is required for a new account".into(),
        )),
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))),
        Some(p) => hash_password(p).map(Some).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::Internal
        }),
    }
}

/// Accounts and their roles
#[utoipa::path(
    get,
    path = "/api/manajemen-user",
    params(UserRoleFilter),
    responses(
        (status = 200, description = "Paginated role assignments", body = UserRoleListResponse),
        (status = 403, description = "Super Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Manajemen User"
)]
pub async fn user_role_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserRoleFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let page = Page::from_query(query.page, query.limit)?;
    let w = user_role_filter(&query);

    let count_sql = format!(
        "SELECT COUNT(*) FROM users u JOIN pegawai p ON p.pegawai_id = u.pegawai_id{}",
        w.sql()
    );
    let total = w
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count accounts");
            ApiError::Internal
        })?;

    let sql = format!(
        r#"
        SELECT u.pegawai_id, u.role_id, COALESCE(u.skpd_id, p.skpd_id) AS skpd_id,
               p.pegawai_nama, p.pegawai_nip
        FROM users u
        JOIN pegawai p ON p.pegawai_id = u.pegawai_id
        {}
        ORDER BY u.role_id, p.pegawai_nama
        LIMIT ? OFFSET ?
        "#,
        w.sql()
    );
    let mut data = w
        .bind_as(sqlx::query_as::<_, UserRoleAssignment>(&sql))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list accounts");
            ApiError::Internal
        })?;

    for row in &mut data {
        row.role_nama = Role::from_id(row.role_id).map(|r| r.to_string());
    }

    Ok(HttpResponse::Ok().json(UserRoleListResponse {
        data,
        total,
        page: page.page,
        limit: page.limit,
    }))
}

/// Grant a role, creating the account when needed
#[utoipa::path(
    post,
    path = "/api/manajemen-user",
    request_body = AssignRole,
    responses(
        (status = 200, description = "Role assigned", body = Object, example = json!({ "pegawai_id": 1000, "role_id": 2 })),
        (status = 400, description = "Unknown role or missing password"),
        (status = 403, description = "Super Admin only, and not on their own account"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Manajemen User"
)]
#[instrument(name = "assign_role", skip(auth, pool, payload), fields(pegawai_id = payload.pegawai_id, role_id = payload.role_id))]
pub async fn assign_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignRole>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let role = validate_assignment(&auth, &payload)?;

    let employee = sqlx::query_scalar::<_, u64>("SELECT pegawai_id FROM pegawai WHERE pegawai_id = ?")
        .bind(payload.pegawai_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to look up employee");
            ApiError::Internal
        })?;
    if employee.is_none() {
        return Err(ApiError::NotFound("Employee not found".into()));
    }

    let has_account = sqlx::query_scalar::<_, u64>("SELECT pegawai_id FROM users WHERE pegawai_id = ?")
        .bind(payload.pegawai_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to look up account");
            ApiError::Internal
        })?
        .is_some();

    let hashed = password_for(has_account, payload.password.as_deref())?;

    let result = match (has_account, hashed) {
        (true, hashed) => {
            sqlx::query(
                r#"
                UPDATE users
                SET role_id = ?, skpd_id = ?, is_active = 1, password = COALESCE(?, password)
                WHERE pegawai_id = ?
                "#,
            )
            .bind(role.level())
            .bind(payload.skpd_id)
            .bind(hashed)
            .bind(payload.pegawai_id)
            .execute(pool.get_ref())
            .await
        }
        (false, hashed) => {
            sqlx::query(
                "INSERT INTO users (pegawai_id, password, role_id, skpd_id, is_active) VALUES (?, ?, ?, ?, 1)",
            )
            .bind(payload.pegawai_id)
            .bind(hashed)
            .bind(role.level())
            .bind(payload.skpd_id)
            .execute(pool.get_ref())
            .await
        }
    };
    result.map_err(|e| {
        error!(error = %e, "Failed to store role assignment");
        ApiError::Internal
    })?;

    info!(by = auth.pegawai_id, created = !has_account, "Role assigned");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "pegawai_id": payload.pegawai_id,
        "role_id": role.level()
    })))
}

/// Remove a role assignment and end the account's sessions
#[utoipa::path(
    delete,
    path = "/api/manajemen-user/{pegawai_id}/{role_id}",
    params(
        ("pegawai_id" = u64, Path, description = "Employee id"),
        ("role_id" = u8, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Assignment removed", body = Object, example = json!({ "affected": 1 })),
        (status = 403, description = "Super Admin only, and not on their own account"),
        (status = 404, description = "No such assignment")
    ),
    security(("bearer_auth" = [])),
    tag = "Manajemen User"
)]
pub async fn remove_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u8)>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let (pegawai_id, role_id) = path.into_inner();
    if pegawai_id == auth.pegawai_id {
        return Err(ApiError::Forbidden("Your own role cannot be removed".into()));
    }

    let result = sqlx::query("DELETE FROM users WHERE pegawai_id = ? AND role_id = ?")
        .bind(pegawai_id)
        .bind(role_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, pegawai_id, "Failed to remove role assignment");
            ApiError::Internal
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Role assignment not found".into()));
    }

    // non-fatal; access tokens still run out on their own
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE pegawai_id = ?")
        .bind(pegawai_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, pegawai_id, "Failed to revoke refresh tokens");
    }

    info!(pegawai_id, role_id, by = auth.pegawai_id, "Role assignment removed");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

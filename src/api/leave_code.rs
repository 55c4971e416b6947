use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_code::LeaveCode;
use crate::model::role::Role;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

const CODE_MAX_LEN: usize = 50;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaveCodeQuery {
    /// Only honoured for Super Admin
    pub skpd_id: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveCode {
    /// Required for Super Admin; other admins always write their own SKPD
    #[schema(example = 3, nullable = true)]
    pub skpd_id: Option<u64>,
    #[schema(example = "800.1.11.4")]
    pub kode_awal: String,
    #[schema(example = "BKPSDM")]
    pub kode_tengah: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeaveCode {
    pub kode_awal: Option<String>,
    pub kode_tengah: Option<String>,
}

/// The SKPD a code write lands in.
pub fn target_skpd(auth: &AuthUser, requested: Option<u64>) -> Result<u64, ApiError> {
    match (auth.role, requested) {
        (Role::SuperAdmin, Some(id)) => Ok(id),
        (Role::SuperAdmin, None) => Err(ApiError::BadRequest("skpd_id is required".into())),
        (_, Some(id)) if id != auth.skpd_id => Err(ApiError::Forbidden(
            "Codes of another SKPD cannot be changed".into(),
        )),
        _ => Ok(auth.skpd_id),
    }
}

/// Trimmed code segment; blank or overlong segments are refused.
pub fn code_segment(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    if value.chars().count() > CODE_MAX_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field} is longer than {CODE_MAX_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

fn db_error(e: sqlx::Error, what: &str) -> ApiError {
    if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
        return ApiError::Conflict("This SKPD already has that code".into());
    }
    error!(error = %e, "{what}");
    ApiError::Internal
}

async fn managed_code(pool: &MySqlPool, auth: &AuthUser, kode_id: u64) -> Result<LeaveCode, ApiError> {
    let code = sqlx::query_as::<_, LeaveCode>(
        "SELECT kode_id, skpd_id, kode_awal, kode_tengah, created_at, updated_at FROM kode_cuti WHERE kode_id = ?",
    )
    .bind(kode_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| db_error(e, "Failed to fetch leave code"))?;

    match code {
        Some(c) if auth.can_manage_skpd(c.skpd_id) => Ok(c),
        _ => Err(ApiError::NotFound("Leave code not found".into())),
    }
}

/// Letter codes per SKPD
#[utoipa::path(
    get,
    path = "/api/kode-cuti",
    params(LeaveCodeQuery),
    responses(
        (status = 200, description = "Codes the caller administers", body = [LeaveCode]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn list_codes(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveCodeQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let mut w = WhereClause::new();
    if auth.role == Role::SuperAdmin {
        w.and_opt("skpd_id = ?", query.skpd_id.map(SqlValue::U64));
    } else {
        w.and("skpd_id = ?", SqlValue::U64(auth.skpd_id));
    }

    let sql = format!(
        "SELECT kode_id, skpd_id, kode_awal, kode_tengah, created_at, updated_at FROM kode_cuti{} ORDER BY skpd_id, kode_id",
        w.sql()
    );
    let codes = w
        .bind_as(sqlx::query_as::<_, LeaveCode>(&sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| db_error(e, "Failed to list leave codes"))?;

    Ok(HttpResponse::Ok().json(codes))
}

#[utoipa::path(
    post,
    path = "/api/kode-cuti",
    request_body = CreateLeaveCode,
    responses(
        (status = 201, description = "Code created", body = Object, example = json!({ "kode_id": 4 })),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Admin of another SKPD"),
        (status = 409, description = "Duplicate code")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn create_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveCode>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let skpd_id = target_skpd(&auth, payload.skpd_id)?;
    let kode_awal = code_segment("kode_awal", &payload.kode_awal)?;
    let kode_tengah = code_segment("kode_tengah", &payload.kode_tengah)?;

    let result = sqlx::query(
        "INSERT INTO kode_cuti (skpd_id, kode_awal, kode_tengah, created_at, updated_at) VALUES (?, ?, ?, NOW(), NOW())",
    )
    .bind(skpd_id)
    .bind(&kode_awal)
    .bind(&kode_tengah)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Failed to create leave code"))?;

    let kode_id = result.last_insert_id();
    info!(kode_id, skpd_id, by = auth.pegawai_id, "Leave code created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "kode_id": kode_id })))
}

#[utoipa::path(
    patch,
    path = "/api/kode-cuti/{kode_id}",
    params(("kode_id" = u64, Path, description = "Code id")),
    request_body = UpdateLeaveCode,
    responses(
        (status = 200, description = "Code updated", body = Object, example = json!({ "affected": 1 })),
        (status = 400, description = "Nothing to update or invalid fields"),
        (status = 404, description = "Not found or outside the caller's SKPD"),
        (status = 409, description = "Duplicate code")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn update_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveCode>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let kode_id = path.into_inner();
    let current = managed_code(pool.get_ref(), &auth, kode_id).await?;

    if payload.kode_awal.is_none() && payload.kode_tengah.is_none() {
        return Err(ApiError::BadRequest("Nothing to update".into()));
    }
    let kode_awal = match &payload.kode_awal {
        Some(v) => code_segment("kode_awal", v)?,
        None => current.kode_awal,
    };
    let kode_tengah = match &payload.kode_tengah {
        Some(v) => code_segment("kode_tengah", v)?,
        None => current.kode_tengah,
    };

    let result = sqlx::query(
        "UPDATE kode_cuti SET kode_awal = ?, kode_tengah = ?, updated_at = NOW() WHERE kode_id = ?",
    )
    .bind(&kode_awal)
    .bind(&kode_tengah)
    .bind(kode_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| db_error(e, "Failed to update leave code"))?;

    info!(kode_id, by = auth.pegawai_id, "Leave code updated");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

#[utoipa::path(
    delete,
    path = "/api/kode-cuti/{kode_id}",
    params(("kode_id" = u64, Path, description = "Code id")),
    responses(
        (status = 200, description = "Code deleted", body = Object, example = json!({ "affected": 1 })),
        (status = 404, description = "Not found or outside the caller's SKPD")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn delete_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let kode_id = path.into_inner();
    managed_code(pool.get_ref(), &auth, kode_id).await?;

    let result = sqlx::query("DELETE FROM kode_cuti WHERE kode_id = ?")
        .bind(kode_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| db_error(e, "Failed to delete leave code"))?;

    info!(kode_id, by = auth.pegawai_id, "Leave code deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use actix_web::{ResponseError, http::StatusCode};

    #[test]
    fn super_admin_must_name_the_skpd() {
        let su = user(Role::SuperAdmin);
        assert_eq!(target_skpd(&su, Some(9)).unwrap(), 9);
        assert_eq!(
            target_skpd(&su, None).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn skpd_admin_writes_only_own_skpd() {
        let admin = user(Role::AdminSkpd);
        assert_eq!(target_skpd(&admin, None).unwrap(), 3);
        assert_eq!(target_skpd(&admin, Some(3)).unwrap(), 3);
        assert_eq!(
            target_skpd(&admin, Some(9)).unwrap_err().status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn code_segments_are_trimmed_and_bounded() {
        assert_eq!(code_segment("kode_awal", "  800.1 ").unwrap(), "800.1");
        assert!(code_segment("kode_awal", "   ").is_err());
        assert!(code_segment("kode_awal", &"x".repeat(CODE_MAX_LEN + 1)).is_err());
        assert!(code_segment("kode_awal", &"x".repeat(CODE_MAX_LEN)).is_ok());
    }
}

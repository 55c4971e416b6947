use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_type::LeaveType;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

/// Active leave types
#[utoipa::path(
    get,
    path = "/api/jenis-cuti",
    responses(
        (status = 200, description = "Leave type master list", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let types = sqlx::query_as::<_, LeaveType>(
        r#"
        SELECT jeniscuti_id, jeniscuti_nama, jeniscuti_kode, jeniscuti_maxhari
        FROM jenis_cuti
        WHERE COALESCE(jeniscuti_status, 1) = 1
        ORDER BY jeniscuti_id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch leave types");
        ApiError::Internal
    })?;

    Ok(HttpResponse::Ok().json(types))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaveTypePayload {
    #[schema(example = "Cuti Tahunan")]
    pub jeniscuti_nama: String,
    #[schema(example = "CT", nullable = true)]
    pub jeniscuti_kode: Option<String>,
    #[schema(example = 12, nullable = true)]
    pub jeniscuti_maxhari: Option<u32>,
}

/// Trimmed name and code; a blank code is stored as NULL.
pub fn validate_leave_type(
    payload: &LeaveTypePayload,
) -> Result<(String, Option<String>), ApiError> {
    let nama = payload.jeniscuti_nama.trim();
    if nama.is_empty() {
        return Err(ApiError::BadRequest("jeniscuti_nama is required".into()));
    }
    if payload.jeniscuti_maxhari == Some(0) {
        return Err(ApiError::BadRequest(
            "jeniscuti_maxhari must be at least 1".into(),
        ));
    }
    let kode = payload
        .jeniscuti_kode
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_uppercase);
    Ok((nama.to_string(), kode))
}

#[utoipa::path(
    post,
    path = "/api/jenis-cuti",
    request_body = LeaveTypePayload,
    responses(
        (status = 201, description = "Leave type created", body = Object, example = json!({ "jeniscuti_id": 9 })),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Super Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<LeaveTypePayload>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let (nama, kode) = validate_leave_type(&payload)?;

    let result = sqlx::query(
        "INSERT INTO jenis_cuti (jeniscuti_nama, jeniscuti_kode, jeniscuti_maxhari, jeniscuti_status) VALUES (?, ?, ?, 1)",
    )
    .bind(&nama)
    .bind(kode.as_deref())
    .bind(payload.jeniscuti_maxhari)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create leave type");
        ApiError::Internal
    })?;

    let jeniscuti_id = result.last_insert_id();
    info!(jeniscuti_id, by = auth.pegawai_id, "Leave type created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "jeniscuti_id": jeniscuti_id })))
}

#[utoipa::path(
    put,
    path = "/api/jenis-cuti/{jeniscuti_id}",
    params(("jeniscuti_id" = u64, Path, description = "Leave type id")),
    request_body = LeaveTypePayload,
    responses(
        (status = 200, description = "Leave type updated", body = Object, example = json!({ "affected": 1 })),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Super Admin only"),
        (status = 404, description = "No active leave type with that id")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn update_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<LeaveTypePayload>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let jeniscuti_id = path.into_inner();
    let (nama, kode) = validate_leave_type(&payload)?;

    let result = sqlx::query(
        r#"
        UPDATE jenis_cuti
        SET jeniscuti_nama = ?, jeniscuti_kode = ?, jeniscuti_maxhari = ?
        WHERE jeniscuti_id = ? AND COALESCE(jeniscuti_status, 1) = 1
        "#,
    )
    .bind(&nama)
    .bind(kode.as_deref())
    .bind(payload.jeniscuti_maxhari)
    .bind(jeniscuti_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, jeniscuti_id, "Failed to update leave type");
        ApiError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Leave type not found".into()));
    }
    info!(jeniscuti_id, by = auth.pegawai_id, "Leave type updated");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

/// Deactivate a leave type. Existing requests keep pointing at it.
#[utoipa::path(
    delete,
    path = "/api/jenis-cuti/{jeniscuti_id}",
    params(("jeniscuti_id" = u64, Path, description = "Leave type id")),
    responses(
        (status = 200, description = "Leave type deactivated", body = Object, example = json!({ "affected": 1 })),
        (status = 403, description = "Super Admin only"),
        (status = 404, description = "No active leave type with that id")
    ),
    security(("bearer_auth" = [])),
    tag = "Master"
)]
pub async fn delete_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let jeniscuti_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE jenis_cuti SET jeniscuti_status = 0 WHERE jeniscuti_id = ? AND COALESCE(jeniscuti_status, 1) = 1",
    )
    .bind(jeniscuti_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, jeniscuti_id, "Failed to deactivate leave type");
        ApiError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Leave type not found".into()));
    }
    info!(jeniscuti_id, by = auth.pegawai_id, "Leave type deactivated");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(nama: &str, kode: Option<&str>, maxhari: Option<u32>) -> LeaveTypePayload {
        LeaveTypePayload {
            jeniscuti_nama: nama.into(),
            jeniscuti_kode: kode.map(Into::into),
            jeniscuti_maxhari: maxhari,
        }
    }

    #[test]
    fn name_and_code_are_normalized() {
        let (nama, kode) =
            validate_leave_type(&payload("  Cuti Besar ", Some(" cb "), Some(90))).unwrap();
        assert_eq!(nama, "Cuti Besar");
        assert_eq!(kode.as_deref(), Some("CB"));
    }

    #[test]
    fn blank_code_is_stored_as_null() {
        let (_, kode) = validate_leave_type(&payload("Cuti Sakit", Some("  "), None)).unwrap();
        assert_eq!(kode, None);
    }

    #[test]
    fn blank_name_or_zero_days_are_rejected() {
        assert!(validate_leave_type(&payload(" ", None, None)).is_err());
        assert!(validate_leave_type(&payload("Cuti Tahunan", None, Some(0))).is_err());
    }
}

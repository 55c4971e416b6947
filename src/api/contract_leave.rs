use crate::api::employee::visible_employee;
use crate::api::leave_request::{LeaveTable, TransitionResponse, write_transition};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::contract_leave::ContractLeave;
use crate::model::status::LeaveStatus;
use crate::utils::pagination::Page;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use crate::workflow::Action;
use crate::workflow::day_count::day_count;
use crate::workflow::transition::resolve;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

const USUL_KONTRAK: LeaveTable = LeaveTable {
    table: "usul_kontrak",
    id_column: "usulkontrak_id",
};

const CONTRACT_SELECT: &str = r#"
    SELECT
        k.usulkontrak_id, k.pegawai_id, k.jeniscuti_id,
        k.usulcuti_tglawal, k.usulcuti_tglakhir, k.usulcuti_jumlah,
        k.usulcuti_alasan, k.usulcuti_alamat, k.usulcuti_status,
        k.atasanlangsung_id, k.atasanlangsung_status,
        k.pejabat_id, k.pejabat_status,
        k.skpd_id, k.subunit_id, k.created_at, k.updated_at,
        p.pegawai_nama, p.pegawai_nip, j.jeniscuti_nama
    FROM usul_kontrak k
    LEFT JOIN pegawai p ON p.pegawai_id = k.pegawai_id
    LEFT JOIN jenis_cuti j ON j.jeniscuti_id = k.jeniscuti_id
"#;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateContractLeave {
    /// The contract employee the request is filed for
    #[schema(example = 2001)]
    pub pegawai_id: u64,
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub usulcuti_tglawal: NaiveDate,
    #[schema(example = "2026-02-03", format = "date", value_type = String)]
    pub usulcuti_tglakhir: NaiveDate,
    #[schema(example = "Keperluan keluarga")]
    pub usulcuti_alasan: String,
    #[schema(example = "Jl. Sudirman 5")]
    pub usulcuti_alamat: String,
    #[schema(nullable = true)]
    pub atasanlangsung_id: Option<u64>,
    #[schema(nullable = true)]
    pub pejabat_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContractLeaveFilter {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub pegawai_id: Option<u64>,
    pub skpd_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub jeniscuti_id: Option<u64>,
    /// Year of the leave start date
    pub tahun: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct ContractLeaveListResponse {
    pub data: Vec<ContractLeave>,
    #[schema(example = 1)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub limit: u64,
}

/// Check a contract leave payload and return the day count to store.
pub fn validate_contract(payload: &CreateContractLeave) -> Result<u32, ApiError> {
    let days = day_count(payload.usulcuti_tglawal, payload.usulcuti_tglakhir)?;

    if payload.usulcuti_alasan.trim().is_empty() {
        return Err(ApiError::BadRequest("usulcuti_alasan is required".into()));
    }
    if payload.usulcuti_alamat.trim().is_empty() {
        return Err(ApiError::BadRequest("usulcuti_alamat is required".into()));
    }
    let approvers = [payload.atasanlangsung_id, payload.pejabat_id];
    if approvers.contains(&Some(payload.pegawai_id)) {
        return Err(ApiError::BadRequest(
            "the employee cannot be one of their own approvers".into(),
        ));
    }

    Ok(days)
}

pub fn contract_filter(query: &ContractLeaveFilter, auth: &AuthUser) -> WhereClause {
    let mut w = WhereClause::new();
    w.scope(auth.scope(), "k")
        .and_opt("k.pegawai_id = ?", query.pegawai_id.map(SqlValue::U64))
        .and_opt("k.skpd_id = ?", query.skpd_id.map(SqlValue::U64))
        .and_opt(
            "k.usulcuti_status = ?",
            query.status.map(|s| SqlValue::Str(s.to_string())),
        )
        .and_opt("k.jeniscuti_id = ?", query.jeniscuti_id.map(SqlValue::U64))
        .and_opt("YEAR(k.usulcuti_tglawal) = ?", query.tahun.map(SqlValue::I32));
    w
}

async fn visible_contract(
    pool: &MySqlPool,
    auth: &AuthUser,
    id: u64,
) -> Result<ContractLeave, ApiError> {
    let row = sqlx::query_as::<_, ContractLeave>(&format!(
        "{CONTRACT_SELECT} WHERE k.usulkontrak_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, usulkontrak_id = id, "Failed to fetch contract leave");
        ApiError::Internal
    })?;

    match row {
        Some(k) if auth.can_view_employee(k.pegawai_id, k.skpd_id, k.subunit_id) => Ok(k),
        _ => Err(ApiError::NotFound("Contract leave request not found".into())),
    }
}

/* =========================
List contract leave (admin roles)
========================= */
#[utoipa::path(
    get,
    path = "/api/cuti-kontrak",
    params(ContractLeaveFilter),
    responses(
        (status = 200, description = "Paginated contract leave list", body = ContractLeaveListResponse),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
pub async fn contract_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ContractLeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let page = Page::from_query(query.page, query.limit)?;
    let filter = contract_filter(&query, &auth);

    let count_sql = format!("SELECT COUNT(*) FROM usul_kontrak k{}", filter.sql());
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count contract leave");
            ApiError::Internal
        })?;

    let data_sql = format!(
        "{CONTRACT_SELECT}{} ORDER BY k.created_at DESC, k.usulkontrak_id DESC LIMIT ? OFFSET ?",
        filter.sql()
    );
    let data = filter
        .bind_as(sqlx::query_as::<_, ContractLeave>(&data_sql))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch contract leave list");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(ContractLeaveListResponse {
        data,
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/cuti-kontrak/{id}",
    params(("id" = u64, Path, description = "Contract leave id")),
    responses(
        (status = 200, description = "Contract leave found", body = ContractLeave),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found or outside the caller's scope")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
pub async fn get_contract(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let row = visible_contract(pool.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(row))
}

/* =========================
File contract leave (admin roles)
========================= */
#[utoipa::path(
    post,
    path = "/api/cuti-kontrak",
    request_body = CreateContractLeave,
    responses(
        (status = 201, description = "Contract leave filed", body = Object, example = json!({
            "usulkontrak_id": 12,
            "usulcuti_status": "Verifikasi"
        })),
        (status = 400, description = "Invalid dates or fields"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found or outside the caller's scope")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
#[instrument(skip(auth, pool, payload), fields(admin = auth.pegawai_id))]
pub async fn create_contract(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateContractLeave>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let days = validate_contract(&payload)?;
    let employee = visible_employee(pool.get_ref(), &auth, payload.pegawai_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO usul_kontrak
            (pegawai_id, jeniscuti_id, usulcuti_tglawal, usulcuti_tglakhir, usulcuti_jumlah,
             usulcuti_alasan, usulcuti_alamat, usulcuti_status,
             atasanlangsung_id, pejabat_id, skpd_id, subunit_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee.pegawai_id)
    .bind(payload.jeniscuti_id)
    .bind(payload.usulcuti_tglawal)
    .bind(payload.usulcuti_tglakhir)
    .bind(days)
    .bind(payload.usulcuti_alasan.trim())
    .bind(payload.usulcuti_alamat.trim())
    .bind(LeaveStatus::Verifikasi)
    .bind(payload.atasanlangsung_id)
    .bind(payload.pejabat_id)
    .bind(employee.skpd_id)
    .bind(employee.subunit_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create contract leave");
        ApiError::Internal
    })?;

    let usulkontrak_id = result.last_insert_id();
    info!(usulkontrak_id, pegawai_id = employee.pegawai_id, days, "Contract leave filed");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "usulkontrak_id": usulkontrak_id,
        "usulcuti_status": LeaveStatus::Verifikasi
    })))
}

async fn apply_contract_action(
    auth: &AuthUser,
    pool: &MySqlPool,
    config: &Config,
    id: u64,
    action: Action,
) -> Result<HttpResponse, ApiError> {
    let row = visible_contract(pool, auth, id).await?;

    let transition = resolve(&row.subject(), action, &auth.actor(), config.approval_policy)
        .inspect_err(|e| {
            info!(usulkontrak_id = id, %action, reason = %e, "Contract transition refused");
        })?;

    write_transition(pool, USUL_KONTRAK, id, row.usulcuti_status, &transition).await?;

    let message = match action {
        Action::Approve => "Contract leave approved",
        Action::Reject => "Contract leave rejected",
        Action::Cancel => "Contract leave cancelled",
    };
    Ok(HttpResponse::Ok().json(TransitionResponse {
        message: message.to_string(),
        transition,
    }))
}

#[utoipa::path(
    put,
    path = "/api/cuti-kontrak/{id}/approve",
    params(("id" = u64, Path, description = "Contract leave id")),
    responses(
        (status = 200, description = "Moved to the next approval stage", body = TransitionResponse),
        (status = 403, description = "Caller may not approve"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Status does not allow approval")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
pub async fn approve_contract(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    apply_contract_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Approve).await
}

#[utoipa::path(
    put,
    path = "/api/cuti-kontrak/{id}/reject",
    params(("id" = u64, Path, description = "Contract leave id")),
    responses(
        (status = 200, description = "Contract leave rejected", body = TransitionResponse),
        (status = 403, description = "Caller may not reject"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Status does not allow rejection")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
pub async fn reject_contract(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    apply_contract_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Reject).await
}

#[utoipa::path(
    patch,
    path = "/api/cuti-kontrak/{id}/cancel",
    params(("id" = u64, Path, description = "Contract leave id")),
    responses(
        (status = 200, description = "Contract leave cancelled", body = TransitionResponse),
        (status = 403, description = "Caller is not the employee"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "No longer waiting for verification")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Kontrak"
)]
pub async fn cancel_contract(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    apply_contract_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use crate::model::contract_leave::fixtures::contract_leave;
    use crate::model::role::Role;
    use crate::workflow::transition::ApprovalPolicy;
    use actix_web::{ResponseError, http::StatusCode};

    fn payload() -> CreateContractLeave {
        CreateContractLeave {
            pegawai_id: 2001,
            jeniscuti_id: 1,
            usulcuti_tglawal: "2024-02-05".parse().unwrap(),
            usulcuti_tglakhir: "2024-02-06".parse().unwrap(),
            usulcuti_alasan: "Keperluan keluarga".into(),
            usulcuti_alamat: "Jl. Sudirman 5".into(),
            atasanlangsung_id: Some(20),
            pejabat_id: None,
        }
    }

    #[test]
    fn day_count_comes_from_dates() {
        assert_eq!(validate_contract(&payload()).unwrap(), 2);
    }

    #[test]
    fn bad_payloads_are_rejected() {
        let reversed = CreateContractLeave {
            usulcuti_tglakhir: "2024-02-01".parse().unwrap(),
            ..payload()
        };
        let blank = CreateContractLeave {
            usulcuti_alasan: " ".into(),
            ..payload()
        };
        let self_approver = CreateContractLeave {
            pejabat_id: Some(2001),
            ..payload()
        };
        for p in [reversed, blank, self_approver] {
            assert_eq!(
                validate_contract(&p).unwrap_err().status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn admin_filter_is_scoped_on_contract_table() {
        let q = ContractLeaveFilter {
            status: Some(LeaveStatus::Verifikasi),
            ..Default::default()
        };
        let w = contract_filter(&q, &user(Role::AdminUker));
        assert_eq!(w.sql(), " WHERE 1=1 AND k.subunit_id = ? AND k.usulcuti_status = ?");
        assert_eq!(
            w.values(),
            &[SqlValue::U64(31), SqlValue::Str("Verifikasi".into())]
        );
    }

    #[test]
    fn contract_leave_follows_the_two_stage_chain() {
        let admin = user(Role::AdminSkpd).actor();
        let mut k = contract_leave(LeaveStatus::Verifikasi, 2001);

        let first = resolve(&k.subject(), Action::Approve, &admin, ApprovalPolicy::Strict).unwrap();
        assert_eq!(first.next, LeaveStatus::Proses);

        k.usulcuti_status = first.next;
        k.atasanlangsung_status = first.patch.atasanlangsung_status.map(|s| s.to_string());
        let second = resolve(&k.subject(), Action::Approve, &admin, ApprovalPolicy::Strict).unwrap();
        assert_eq!(second.next, LeaveStatus::Terima);
    }
}

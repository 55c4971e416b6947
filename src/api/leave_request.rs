use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::leave_request::LeaveRequest;
use crate::model::status::LeaveStatus;
use crate::utils::pagination::{Page, PageQuery};
use crate::utils::sql_filter::{SqlValue, WhereClause};
use crate::workflow::Action;
use crate::workflow::day_count::day_count;
use crate::workflow::transition::{SupervisorVerdict, Transition, resolve, resolve_supervisor};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum::AsRefStr;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

pub(crate) const LEAVE_SELECT: &str = r#"
    SELECT
        u.usulcuti_id, u.pegawai_id, u.jeniscuti_id,
        u.usulcuti_tglawal, u.usulcuti_tglakhir, u.usulcuti_jumlah,
        u.usulcuti_alasan, u.usulcuti_alamat, u.usulcuti_lokasi,
        u.usulcuti_status, u.usulcuti_tgl,
        u.atasanlangsung_id, u.atasanlangsung_status,
        u.pejabat_id, u.pejabat_status,
        u.skpd_id, u.subunit_id, u.created_at, u.updated_at,
        p.pegawai_nama, p.pegawai_nip, j.jeniscuti_nama
    FROM usul_cuti u
    LEFT JOIN pegawai p ON p.pegawai_id = u.pegawai_id
    LEFT JOIN jenis_cuti j ON j.jeniscuti_id = u.jeniscuti_id
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr)]
pub enum Location {
    #[serde(rename = "Dalam Negeri")]
    #[strum(serialize = "Dalam Negeri")]
    DalamNegeri,
    #[serde(rename = "Luar Negeri")]
    #[strum(serialize = "Luar Negeri")]
    LuarNegeri,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub usulcuti_tglawal: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub usulcuti_tglakhir: NaiveDate,
    /// Optional; when sent it must match the date range
    #[schema(example = 3, nullable = true)]
    pub usulcuti_jumlah: Option<u32>,
    #[schema(example = "Urusan keluarga")]
    pub usulcuti_alasan: String,
    #[schema(example = "Jl. Merdeka No. 1")]
    pub usulcuti_alamat: String,
    pub usulcuti_lokasi: Location,
    #[schema(example = 20)]
    pub atasanlangsung_id: u64,
    #[schema(example = 30)]
    pub pejabat_id: u64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page (max 100)
    pub limit: Option<u64>,
    pub pegawai_id: Option<u64>,
    pub skpd_id: Option<u64>,
    pub subunit_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    pub jeniscuti_id: Option<u64>,
    /// Year of the leave start date
    pub tahun: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub limit: u64,
}

#[derive(Serialize, ToSchema)]
pub struct TransitionResponse {
    pub message: String,
    pub transition: Transition,
}

/// Check a create payload and return the day count to store.
pub fn validate_create(payload: &CreateLeave, requester: u64) -> Result<u32, ApiError> {
    let days = day_count(payload.usulcuti_tglawal, payload.usulcuti_tglakhir)?;

    if let Some(sent) = payload.usulcuti_jumlah {
        if sent != days {
            return Err(ApiError::BadRequest(format!(
                "usulcuti_jumlah is {sent} but the date range covers {days} days"
            )));
        }
    }
    if payload.usulcuti_alasan.trim().is_empty() {
        return Err(ApiError::BadRequest("usulcuti_alasan is required".into()));
    }
    if payload.usulcuti_alamat.trim().is_empty() {
        return Err(ApiError::BadRequest("usulcuti_alamat is required".into()));
    }
    if payload.atasanlangsung_id == requester || payload.pejabat_id == requester {
        return Err(ApiError::BadRequest(
            "requester cannot be one of their own approvers".into(),
        ));
    }

    Ok(days)
}

pub fn list_filter(query: &LeaveFilter, auth: &AuthUser) -> WhereClause {
    let mut w = WhereClause::new();
    w.scope(auth.scope(), "u")
        .and_opt("u.pegawai_id = ?", query.pegawai_id.map(SqlValue::U64))
        .and_opt("u.skpd_id = ?", query.skpd_id.map(SqlValue::U64))
        .and_opt("u.subunit_id = ?", query.subunit_id.map(SqlValue::U64))
        .and_opt(
            "u.usulcuti_status = ?",
            query.status.map(|s| SqlValue::Str(s.to_string())),
        )
        .and_opt("u.jeniscuti_id = ?", query.jeniscuti_id.map(SqlValue::U64))
        .and_opt("YEAR(u.usulcuti_tglawal) = ?", query.tahun.map(SqlValue::I32));
    w
}

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> Result<Option<LeaveRequest>, ApiError> {
    sqlx::query_as::<_, LeaveRequest>(&format!("{LEAVE_SELECT} WHERE u.usulcuti_id = ?"))
        .bind(leave_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to fetch leave request");
            ApiError::Internal
        })
}

/// A leave request the session is allowed to see, or 404.
async fn visible_leave(pool: &MySqlPool, auth: &AuthUser, leave_id: u64) -> Result<LeaveRequest, ApiError> {
    match fetch_leave(pool, leave_id).await? {
        Some(leave) if auth.can_view(&leave) => Ok(leave),
        _ => Err(ApiError::NotFound("Leave request not found".into())),
    }
}

async fn list_page(
    pool: &MySqlPool,
    filter: &WhereClause,
    page: Page,
) -> Result<LeaveListResponse, ApiError> {
    let count_sql = format!("SELECT COUNT(*) FROM usul_cuti u{}", filter.sql());
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count leave requests");
            ApiError::Internal
        })?;

    let data_sql = format!(
        "{LEAVE_SELECT}{} ORDER BY u.created_at DESC, u.usulcuti_id DESC LIMIT ? OFFSET ?",
        filter.sql()
    );
    let data = filter
        .bind_as(sqlx::query_as::<_, LeaveRequest>(&data_sql))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            ApiError::Internal
        })?;

    Ok(LeaveListResponse {
        data,
        total,
        page: page.page,
        limit: page.limit,
    })
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/cuti",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    let page = Page::from_query(query.page, query.limit)?;
    let filter = list_filter(&query, &auth);

    Ok(HttpResponse::Ok().json(list_page(pool.get_ref(), &filter, page).await?))
}

/* =========================
Leave request detail
========================= */
#[utoipa::path(
    get,
    path = "/api/cuti/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found or outside the caller's scope")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave = visible_leave(pool.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/cuti",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "usulcuti_id": 42,
            "usulcuti_status": "Verifikasi"
        })),
        (status = 400, description = "Invalid dates, day count or fields"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
#[instrument(skip(auth, pool, payload), fields(pegawai_id = auth.pegawai_id))]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let days = validate_create(&payload, auth.pegawai_id)?;

    let max_days = sqlx::query_scalar::<_, Option<u32>>(
        "SELECT jeniscuti_maxhari FROM jenis_cuti WHERE jeniscuti_id = ?",
    )
    .bind(payload.jeniscuti_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to load leave type");
        ApiError::Internal
    })?
    .ok_or_else(|| ApiError::BadRequest("Unknown jeniscuti_id".into()))?;

    if let Some(max) = max_days.filter(|m| *m > 0) {
        if days > max {
            return Err(ApiError::BadRequest(format!(
                "This leave type allows at most {max} days per request"
            )));
        }
    }

    let result = sqlx::query(
        r#"
        INSERT INTO usul_cuti
            (pegawai_id, jeniscuti_id, usulcuti_tglawal, usulcuti_tglakhir, usulcuti_jumlah,
             usulcuti_alasan, usulcuti_alamat, usulcuti_lokasi, usulcuti_status, usulcuti_tgl,
             atasanlangsung_id, pejabat_id, skpd_id, subunit_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURDATE(), ?, ?, ?, ?)
        "#,
    )
    .bind(auth.pegawai_id)
    .bind(payload.jeniscuti_id)
    .bind(payload.usulcuti_tglawal)
    .bind(payload.usulcuti_tglakhir)
    .bind(days)
    .bind(payload.usulcuti_alasan.trim())
    .bind(payload.usulcuti_alamat.trim())
    .bind(payload.usulcuti_lokasi.as_ref())
    .bind(LeaveStatus::Verifikasi)
    .bind(payload.atasanlangsung_id)
    .bind(payload.pejabat_id)
    .bind(auth.skpd_id)
    .bind(auth.subunit_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create leave request");
        ApiError::Internal
    })?;

    let usulcuti_id = result.last_insert_id();
    info!(usulcuti_id, days, "Leave request submitted");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "usulcuti_id": usulcuti_id,
        "usulcuti_status": LeaveStatus::Verifikasi
    })))
}

/// A table holding leave requests with the shared status columns
/// (`usulcuti_status`, `atasanlangsung_status`, `pejabat_status`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct LeaveTable {
    pub table: &'static str,
    pub id_column: &'static str,
}

pub(crate) const USUL_CUTI: LeaveTable = LeaveTable {
    table: "usul_cuti",
    id_column: "usulcuti_id",
};

/// Write a resolved transition, guarded on the status it was resolved from.
/// Zero affected rows means someone else moved the request first.
pub(crate) async fn write_transition(
    pool: &MySqlPool,
    target: LeaveTable,
    id: u64,
    current: LeaveStatus,
    transition: &Transition,
) -> Result<(), ApiError> {
    let sql = format!(
        r#"
        UPDATE {table}
        SET usulcuti_status = ?,
            atasanlangsung_status = COALESCE(?, atasanlangsung_status),
            pejabat_status = COALESCE(?, pejabat_status),
            updated_at = NOW()
        WHERE {id_column} = ?
        AND usulcuti_status = ?
        "#,
        table = target.table,
        id_column = target.id_column,
    );

    let result = sqlx::query(&sql)
        .bind(transition.next)
        .bind(transition.patch.atasanlangsung_status)
        .bind(transition.patch.pejabat_status)
        .bind(id)
        .bind(current)
        .execute(pool)
        .await
        .map_err(|e| {
            error!(error = %e, table = target.table, id, "Failed to update leave status");
            ApiError::Internal
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Leave request was changed by someone else, reload and try again".into(),
        ));
    }

    info!(table = target.table, id, from = %current, to = %transition.next, "Leave status changed");
    Ok(())
}

/// Resolve `action` against the stored request and write the result back.
async fn apply_action(
    auth: &AuthUser,
    pool: &MySqlPool,
    config: &Config,
    leave_id: u64,
    action: Action,
) -> Result<Transition, ApiError> {
    let leave = visible_leave(pool, auth, leave_id).await?;

    let transition = resolve(&leave.subject(), action, &auth.actor(), config.approval_policy)
        .inspect_err(|e| {
            info!(leave_id, %action, actor = auth.pegawai_id, reason = %e, "Transition refused");
        })?;

    write_transition(pool, USUL_CUTI, leave_id, leave.usulcuti_status, &transition).await?;
    Ok(transition)
}

fn transition_response(message: &str, transition: Transition) -> HttpResponse {
    HttpResponse::Ok().json(TransitionResponse {
        message: message.to_string(),
        transition,
    })
}

/* =========================
Approve leave (admin roles)
========================= */
#[utoipa::path(
    put,
    path = "/api/cuti/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Moved to the next approval stage", body = TransitionResponse),
        (status = 403, description = "Caller's role may not approve"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Status does not allow approval")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let t = apply_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Approve).await?;
    Ok(transition_response("Leave approved", t))
}

/* =========================
Reject leave (admin roles)
========================= */
#[utoipa::path(
    put,
    path = "/api/cuti/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave rejected", body = TransitionResponse),
        (status = 403, description = "Caller's role may not reject"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Status does not allow rejection")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let t = apply_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Reject).await?;
    Ok(transition_response("Leave rejected", t))
}

/* =========================
Cancel own leave
========================= */
#[utoipa::path(
    patch,
    path = "/api/cuti/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave cancelled", body = TransitionResponse),
        (status = 403, description = "Caller is not the requester"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Request is no longer waiting for verification")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let t = apply_action(&auth, pool.get_ref(), &config, path.into_inner(), Action::Cancel).await?;
    Ok(transition_response("Leave cancelled", t))
}

/// Requests waiting for the session's own verdict as immediate supervisor.
pub fn subordinate_filter(auth: &AuthUser) -> WhereClause {
    let mut w = WhereClause::new();
    w.and("u.atasanlangsung_id = ?", SqlValue::U64(auth.pegawai_id))
        .and("u.usulcuti_status = ?", SqlValue::Str(LeaveStatus::Verifikasi.to_string()))
        .and_raw("COALESCE(u.atasanlangsung_status, '') = ''");
    w
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupervisorDecision {
    #[schema(example = "Terima")]
    pub atasanlangsung_status: SupervisorVerdict,
}

/* =========================
Subordinates waiting for the supervisor
========================= */
#[utoipa::path(
    get,
    path = "/api/cuti/bawahan",
    params(PageQuery),
    responses(
        (status = 200, description = "Requests naming the caller as immediate supervisor", body = LeaveListResponse),
        (status = 400, description = "Page out of range"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn subordinate_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = Page::from_query(query.page, query.limit)?;
    let filter = subordinate_filter(&auth);

    Ok(HttpResponse::Ok().json(list_page(pool.get_ref(), &filter, page).await?))
}

/* =========================
Immediate supervisor verdict
========================= */
#[utoipa::path(
    put,
    path = "/api/cuti/{leave_id}/atasan",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    request_body = SupervisorDecision,
    responses(
        (status = 200, description = "Supervisor verdict recorded", body = TransitionResponse),
        (status = 403, description = "Caller is not the designated supervisor"),
        (status = 404, description = "Not found or outside the caller's scope"),
        (status = 409, description = "Already decided or no longer waiting for verification")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
#[instrument(skip(auth, pool, payload), fields(pegawai_id = auth.pegawai_id))]
pub async fn verify_subordinate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<SupervisorDecision>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();
    let verdict = payload.atasanlangsung_status;
    let leave = visible_leave(pool.get_ref(), &auth, leave_id).await?;

    let transition = resolve_supervisor(&leave.subject(), verdict, &auth.actor())
        .inspect_err(|e| info!(leave_id, %verdict, reason = %e, "Supervisor verdict refused"))?;

    write_transition(pool.get_ref(), USUL_CUTI, leave_id, leave.usulcuti_status, &transition)
        .await?;

    let message = match verdict {
        SupervisorVerdict::Terima => "Leave approved by immediate supervisor",
        SupervisorVerdict::Ditolak => "Leave rejected by immediate supervisor",
    };
    Ok(transition_response(message, transition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use crate::model::role::Role;
    use actix_web::{ResponseError, http::StatusCode};

    fn payload() -> CreateLeave {
        CreateLeave {
            jeniscuti_id: 1,
            usulcuti_tglawal: "2024-01-01".parse().unwrap(),
            usulcuti_tglakhir: "2024-01-05".parse().unwrap(),
            usulcuti_jumlah: None,
            usulcuti_alasan: "Urusan keluarga".into(),
            usulcuti_alamat: "Jl. Merdeka 1".into(),
            usulcuti_lokasi: Location::DalamNegeri,
            atasanlangsung_id: 20,
            pejabat_id: 30,
        }
    }

    fn rejected(p: &CreateLeave) -> StatusCode {
        validate_create(p, 1000).unwrap_err().status_code()
    }

    #[test]
    fn day_count_is_derived_from_dates() {
        assert_eq!(validate_create(&payload(), 1000).unwrap(), 5);
    }

    #[test]
    fn matching_client_day_count_is_accepted() {
        let p = CreateLeave {
            usulcuti_jumlah: Some(5),
            ..payload()
        };
        assert_eq!(validate_create(&p, 1000).unwrap(), 5);
    }

    #[test]
    fn mismatched_client_day_count_is_rejected() {
        let p = CreateLeave {
            usulcuti_jumlah: Some(4),
            ..payload()
        };
        assert_eq!(rejected(&p), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let p = CreateLeave {
            usulcuti_tglawal: "2024-01-05".parse().unwrap(),
            usulcuti_tglakhir: "2024-01-01".parse().unwrap(),
            ..payload()
        };
        assert_eq!(rejected(&p), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_reason_or_address_is_rejected() {
        let p = CreateLeave {
            usulcuti_alasan: "   ".into(),
            ..payload()
        };
        assert_eq!(rejected(&p), StatusCode::BAD_REQUEST);

        let p = CreateLeave {
            usulcuti_alamat: String::new(),
            ..payload()
        };
        assert_eq!(rejected(&p), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn requester_cannot_approve_own_leave() {
        let p = CreateLeave {
            atasanlangsung_id: 1000,
            ..payload()
        };
        assert_eq!(rejected(&p), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn location_uses_display_labels() {
        let p: CreateLeave = serde_json::from_value(serde_json::json!({
            "jeniscuti_id": 1,
            "usulcuti_tglawal": "2024-01-01",
            "usulcuti_tglakhir": "2024-01-01",
            "usulcuti_alasan": "x",
            "usulcuti_alamat": "y",
            "usulcuti_lokasi": "Luar Negeri",
            "atasanlangsung_id": 2,
            "pejabat_id": 3
        }))
        .unwrap();
        assert_eq!(p.usulcuti_lokasi, Location::LuarNegeri);
        assert_eq!(p.usulcuti_lokasi.as_ref(), "Luar Negeri");
        assert_eq!(p.usulcuti_jumlah, None);
    }

    fn empty_filter() -> LeaveFilter {
        LeaveFilter {
            page: None,
            limit: None,
            pegawai_id: None,
            skpd_id: None,
            subunit_id: None,
            status: None,
            jeniscuti_id: None,
            tahun: None,
        }
    }

    #[test]
    fn pegawai_list_is_pinned_to_self() {
        let w = list_filter(&empty_filter(), &user(Role::Pegawai));
        assert_eq!(w.sql(), " WHERE 1=1 AND u.pegawai_id = ?");
        assert_eq!(w.values(), &[SqlValue::U64(1000)]);
    }

    #[test]
    fn admin_filters_stack_on_scope() {
        let q = LeaveFilter {
            status: Some(LeaveStatus::Proses),
            tahun: Some(2024),
            ..empty_filter()
        };
        let w = list_filter(&q, &user(Role::AdminSkpd));
        assert_eq!(
            w.sql(),
            " WHERE 1=1 AND u.skpd_id = ? AND u.usulcuti_status = ? AND YEAR(u.usulcuti_tglawal) = ?"
        );
        assert_eq!(
            w.values(),
            &[
                SqlValue::U64(3),
                SqlValue::Str("Proses".into()),
                SqlValue::I32(2024)
            ]
        );
    }

    #[test]
    fn super_admin_sees_everything_by_default() {
        let w = list_filter(&empty_filter(), &user(Role::SuperAdmin));
        assert_eq!(w.sql(), " WHERE 1=1");
    }

    #[test]
    fn subordinate_queue_is_pinned_to_the_supervisor() {
        let w = subordinate_filter(&user(Role::Pegawai));
        assert_eq!(
            w.sql(),
            " WHERE 1=1 AND u.atasanlangsung_id = ? AND u.usulcuti_status = ? AND COALESCE(u.atasanlangsung_status, '') = ''"
        );
        assert_eq!(
            w.values(),
            &[SqlValue::U64(1000), SqlValue::Str("Verifikasi".into())]
        );
    }

    #[test]
    fn supervisor_decision_uses_status_labels() {
        let d: SupervisorDecision =
            serde_json::from_value(serde_json::json!({ "atasanlangsung_status": "Ditolak" })).unwrap();
        assert_eq!(d.atasanlangsung_status, SupervisorVerdict::Ditolak);
        assert!(
            serde_json::from_value::<SupervisorDecision>(serde_json::json!({ "atasanlangsung_status": "Proses" }))
                .is_err()
        );
    }
}

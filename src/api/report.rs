use crate::api::balance::{BalanceQuery, ledger};
use crate::api::employee::visible_employee;
use crate::api::leave_request::LEAVE_SELECT;
use crate::auth::auth::{AuthUser, Scope};
use crate::error::ApiError;
use crate::model::leave_request::LeaveRequest;
use crate::model::status::LeaveStatus;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use crate::workflow::statistics::{
    StatusCount, TypeCount, TypeMonthCount, TypeStatusCount, dashboard, recap, summarize,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Only honoured for Super Admin; other roles are pinned to their own unit
    pub skpd_id: Option<u64>,
    /// Year of the leave start date
    pub tahun: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthlyQuery {
    /// Only honoured for Super Admin
    pub skpd_id: Option<u64>,
    pub tahun: Option<i32>,
    /// 1 to 12
    pub bulan: Option<u32>,
}

fn report_filter(query: &ReportQuery, auth: &AuthUser) -> WhereClause {
    let scope = auth.scope();
    let mut w = WhereClause::new();
    w.scope(scope, "u");
    if scope == Scope::All {
        w.and_opt("u.skpd_id = ?", query.skpd_id.map(SqlValue::U64));
    }
    w.and_opt("YEAR(u.usulcuti_tglawal) = ?", query.tahun.map(SqlValue::I32));
    w
}

/// Requests starting in one month of one year, within the caller's scope.
pub fn monthly_filter(query: &MonthlyQuery, auth: &AuthUser) -> Result<WhereClause, ApiError> {
    let tahun = query
        .tahun
        .ok_or_else(|| ApiError::BadRequest("tahun is required".into()))?;
    let bulan = query
        .bulan
        .filter(|b| (1..=12).contains(b))
        .ok_or_else(|| ApiError::BadRequest("bulan must be between 1 and 12".into()))?;

    let mut w = report_filter(
        &ReportQuery {
            skpd_id: query.skpd_id,
            tahun: Some(tahun),
        },
        auth,
    );
    w.and("MONTH(u.usulcuti_tglawal) = ?", SqlValue::I32(bulan as i32));
    Ok(w)
}

/// Request counts by status and by leave type
#[utoipa::path(
    get,
    path = "/api/cuti/statistics",
    params(ReportQuery),
    responses(
        (status = 200, description = "Counts within the caller's scope", body = crate::workflow::statistics::LeaveStatistics),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Laporan"
)]
pub async fn statistics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = report_filter(&query, &auth);

    let status_sql = format!(
        "SELECT u.usulcuti_status AS status, COUNT(*) AS jumlah FROM usul_cuti u{} GROUP BY u.usulcuti_status",
        filter.sql()
    );
    let by_status = filter
        .bind_as(sqlx::query_as::<_, StatusCount>(&status_sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count leave by status");
            ApiError::Internal
        })?;

    let type_sql = format!(
        r#"
        SELECT j.jeniscuti_nama, j.jeniscuti_kode, COUNT(*) AS jumlah
        FROM usul_cuti u
        JOIN jenis_cuti j ON j.jeniscuti_id = u.jeniscuti_id
        {}
        GROUP BY j.jeniscuti_id, j.jeniscuti_nama, j.jeniscuti_kode
        ORDER BY j.jeniscuti_id
        "#,
        filter.sql()
    );
    let by_type = filter
        .bind_as(sqlx::query_as::<_, TypeCount>(&type_sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count leave by type");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(summarize(&by_status, &by_type)))
}

/// Per leave-type breakdown of request statuses
#[utoipa::path(
    get,
    path = "/api/laporan/dashboard",
    params(ReportQuery),
    responses(
        (status = 200, description = "One row per leave type", body = [crate::workflow::statistics::DashboardItem]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Laporan"
)]
pub async fn status_dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let filter = report_filter(&query, &auth);
    let sql = format!(
        r#"
        SELECT j.jeniscuti_id, j.jeniscuti_nama, u.usulcuti_status AS status, COUNT(*) AS jumlah
        FROM usul_cuti u
        JOIN jenis_cuti j ON j.jeniscuti_id = u.jeniscuti_id
        {}
        GROUP BY j.jeniscuti_id, j.jeniscuti_nama, u.usulcuti_status
        ORDER BY j.jeniscuti_id
        "#,
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, TypeStatusCount>(&sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to build leave dashboard");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(dashboard(&rows)))
}

/// Leave requests starting in a given month
#[utoipa::path(
    get,
    path = "/api/laporan/cuti-bulanan",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Requests of the month", body = [LeaveRequest]),
        (status = 400, description = "tahun or bulan missing or out of range"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Laporan"
)]
pub async fn monthly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let filter = monthly_filter(&query, &auth)?;

    let sql = format!(
        "{LEAVE_SELECT}{} ORDER BY u.usulcuti_tglawal, u.usulcuti_id",
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, LeaveRequest>(&sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to build monthly leave report");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Approved requests per leave type and start month
#[utoipa::path(
    get,
    path = "/api/laporan/rekapitulasi",
    params(ReportQuery),
    responses(
        (status = 200, description = "One row per leave type", body = [crate::workflow::statistics::RecapItem]),
        (status = 400, description = "tahun missing"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Laporan"
)]
pub async fn recapitulation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    if query.tahun.is_none() {
        return Err(ApiError::BadRequest("tahun is required".into()));
    }

    let mut filter = report_filter(&query, &auth);
    filter.and(
        "u.usulcuti_status = ?",
        SqlValue::Str(LeaveStatus::Terima.to_string()),
    );
    let sql = format!(
        r#"
        SELECT j.jeniscuti_id, j.jeniscuti_nama, MONTH(u.usulcuti_tglawal) AS bulan, COUNT(*) AS jumlah
        FROM usul_cuti u
        JOIN jenis_cuti j ON j.jeniscuti_id = u.jeniscuti_id
        {}
        GROUP BY j.jeniscuti_id, j.jeniscuti_nama, MONTH(u.usulcuti_tglawal)
        ORDER BY j.jeniscuti_id
        "#,
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, TypeMonthCount>(&sql))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to build leave recapitulation");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(recap(&rows)))
}

/// Leave ledger lines of one employee
#[utoipa::path(
    get,
    path = "/api/laporan/buku/{pegawai_id}",
    params(("pegawai_id" = u64, Path, description = "Employee id"), BalanceQuery),
    responses(
        (status = 200, description = "Ledger lines as stored", body = [crate::model::balance::LeaveBalanceEntry]),
        (status = 404, description = "Employee not found or outside the caller's scope")
    ),
    security(("bearer_auth" = [])),
    tag = "Laporan"
)]
pub async fn leave_book(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let employee = visible_employee(pool.get_ref(), &auth, path.into_inner()).await?;

    let mut filter = WhereClause::new();
    filter
        .and("b.pegawai_id = ?", SqlValue::U64(employee.pegawai_id))
        .and_opt("b.bukucuti_tahun = ?", query.tahun.map(SqlValue::I32));

    Ok(HttpResponse::Ok().json(ledger(pool.get_ref(), &filter).await?))
}

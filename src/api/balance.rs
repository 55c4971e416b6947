use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::api::employee::visible_employee;
use crate::model::balance::LeaveBalanceEntry;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use crate::workflow::balance::aggregate;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

const LEDGER_SELECT: &str = r#"
    SELECT
        b.bukucuti_id, b.pegawai_id, b.jeniscuti_id, j.jeniscuti_nama,
        b.bukucuti_tahun, b.bukucuti_tglawal, b.bukucuti_tglakhir,
        CAST(b.bukucuti_lama AS CHAR) AS bukucuti_lama,
        b.bukucuti_status
    FROM cuti_buku b
    JOIN jenis_cuti j ON j.jeniscuti_id = b.jeniscuti_id
    JOIN pegawai p ON p.pegawai_id = b.pegawai_id
"#;

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Ledger year; all years when omitted
    pub tahun: Option<i32>,
}

pub(crate) async fn ledger(pool: &MySqlPool, filter: &WhereClause) -> Result<Vec<LeaveBalanceEntry>, ApiError> {
    let sql = format!("{LEDGER_SELECT}{} ORDER BY b.bukucuti_id", filter.sql());
    filter
        .bind_as(sqlx::query_as::<_, LeaveBalanceEntry>(&sql))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave ledger");
            ApiError::Internal
        })
}

/// Ledger rows of the session's own leave, whatever the role.
fn own_ledger_filter(auth: &AuthUser, tahun: Option<i32>) -> WhereClause {
    let mut w = WhereClause::new();
    w.and("b.pegawai_id = ?", SqlValue::U64(auth.pegawai_id))
        .and_opt("b.bukucuti_tahun = ?", tahun.map(SqlValue::I32));
    w
}

/// Leave used per type by the caller
#[utoipa::path(
    get,
    path = "/api/cuti/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Days used per leave type", body = [crate::model::balance::LeaveBalanceSummary]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn my_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = own_ledger_filter(&auth, query.tahun);
    let entries = ledger(pool.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(aggregate(&entries)))
}

/// Leave used per type by one employee
#[utoipa::path(
    get,
    path = "/api/cuti/balance/{pegawai_id}",
    params(
        ("pegawai_id" = u64, Path, description = "Employee id"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Days used per leave type", body = [crate::model::balance::LeaveBalanceSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found or outside the caller's scope")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti"
)]
pub async fn employee_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let pegawai_id = path.into_inner();
    visible_employee(pool.get_ref(), &auth, pegawai_id).await?;

    let mut filter = WhereClause::new();
    filter
        .and("b.pegawai_id = ?", SqlValue::U64(pegawai_id))
        .and_opt("b.bukucuti_tahun = ?", query.tahun.map(SqlValue::I32));

    let entries = ledger(pool.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(aggregate(&entries)))
}

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::collective_leave::CollectiveLeave;
use crate::utils::pagination::Page;
use crate::utils::sql_filter::{SqlValue, WhereClause};
use crate::workflow::day_count::day_count;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

const COLLECTIVE_SELECT: &str = r#"
    SELECT cutibersama_id, cutibersama_nama, cutibersama_tglawal, cutibersama_tglakhir,
           cutibersama_jumlah, cutibersama_tahun, cutibersama_file, created_at, updated_at
    FROM cuti_bersama
"#;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CollectiveLeaveFilter {
    pub tahun: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectiveLeave {
    #[schema(example = "Cuti Bersama Idul Fitri")]
    pub cutibersama_nama: String,
    #[schema(example = "2026-03-23", format = "date", value_type = String)]
    pub cutibersama_tglawal: NaiveDate,
    #[schema(example = "2026-03-24", format = "date", value_type = String)]
    pub cutibersama_tglakhir: NaiveDate,
    /// Optional; must match the date range when sent
    #[schema(example = 2, nullable = true)]
    pub cutibersama_jumlah: Option<u32>,
    /// Defaults to the year of the start date
    #[schema(example = 2026, nullable = true)]
    pub cutibersama_tahun: Option<i32>,
    #[schema(nullable = true)]
    pub cutibersama_file: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CollectiveLeaveListResponse {
    pub data: Vec<CollectiveLeave>,
    pub total: i64,
    pub page: u64,
    pub limit: u64,
}

/// Day count and year of a new collective leave range.
pub fn validate_collective(payload: &CreateCollectiveLeave) -> Result<(u32, i32), ApiError> {
    if payload.cutibersama_nama.trim().is_empty() {
        return Err(ApiError::BadRequest("cutibersama_nama is required".into()));
    }
    let jumlah = day_count(payload.cutibersama_tglawal, payload.cutibersama_tglakhir)?;
    if let Some(sent) = payload.cutibersama_jumlah {
        if sent != jumlah {
            return Err(ApiError::BadRequest(format!(
                "cutibersama_jumlah {sent} does not match the {jumlah} days between the dates"
            )));
        }
    }

    let start_year = payload.cutibersama_tglawal.year();
    let tahun = payload.cutibersama_tahun.unwrap_or(start_year);
    if tahun != start_year {
        return Err(ApiError::BadRequest(format!(
            "cutibersama_tahun {tahun} does not match the start date year {start_year}"
        )));
    }
    Ok((jumlah, tahun))
}

/// Collective leave days
#[utoipa::path(
    get,
    path = "/api/cuti-bersama",
    params(CollectiveLeaveFilter),
    responses(
        (status = 200, description = "Paginated collective leave days", body = CollectiveLeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Bersama"
)]
pub async fn collective_list(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CollectiveLeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    let page = Page::from_query(query.page, query.limit)?;

    let mut w = WhereClause::new();
    w.and_opt("cutibersama_tahun = ?", query.tahun.map(SqlValue::I32));

    let count_sql = format!("SELECT COUNT(*) FROM cuti_bersama{}", w.sql());
    let total = w
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count collective leave");
            ApiError::Internal
        })?;

    let sql = format!(
        "{COLLECTIVE_SELECT}{} ORDER BY cutibersama_tglawal DESC LIMIT ? OFFSET ?",
        w.sql()
    );
    let data = w
        .bind_as(sqlx::query_as::<_, CollectiveLeave>(&sql))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list collective leave");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(CollectiveLeaveListResponse {
        data,
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    post,
    path = "/api/cuti-bersama",
    request_body = CreateCollectiveLeave,
    responses(
        (status = 201, description = "Collective leave created", body = Object, example = json!({ "cutibersama_id": 3 })),
        (status = 400, description = "Invalid dates, day count or year"),
        (status = 403, description = "Super Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Bersama"
)]
pub async fn create_collective(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCollectiveLeave>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let (jumlah, tahun) = validate_collective(&payload)?;
    let file = payload
        .cutibersama_file
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let result = sqlx::query(
        r#"
        INSERT INTO cuti_bersama
            (cutibersama_nama, cutibersama_tglawal, cutibersama_tglakhir,
             cutibersama_jumlah, cutibersama_tahun, cutibersama_file, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, NOW(), NOW())
        "#,
    )
    .bind(payload.cutibersama_nama.trim())
    .bind(payload.cutibersama_tglawal)
    .bind(payload.cutibersama_tglakhir)
    .bind(jumlah)
    .bind(tahun)
    .bind(file)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create collective leave");
        ApiError::Internal
    })?;

    let cutibersama_id = result.last_insert_id();
    info!(cutibersama_id, tahun, by = auth.pegawai_id, "Collective leave created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "cutibersama_id": cutibersama_id })))
}

#[utoipa::path(
    delete,
    path = "/api/cuti-bersama/{cutibersama_id}",
    params(("cutibersama_id" = u64, Path, description = "Collective leave id")),
    responses(
        (status = 200, description = "Collective leave deleted", body = Object, example = json!({ "affected": 1 })),
        (status = 403, description = "Super Admin only"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cuti Bersama"
)]
pub async fn delete_collective(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_super_admin()?;
    let cutibersama_id = path.into_inner();

    let result = sqlx::query("DELETE FROM cuti_bersama WHERE cutibersama_id = ?")
        .bind(cutibersama_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, cutibersama_id, "Failed to delete collective leave");
            ApiError::Internal
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Collective leave not found".into()));
    }
    info!(cutibersama_id, by = auth.pegawai_id, "Collective leave deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "affected": result.rows_affected() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{ResponseError, http::StatusCode};

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn payload(start: &str, end: &str) -> CreateCollectiveLeave {
        CreateCollectiveLeave {
            cutibersama_nama: "Cuti Bersama Natal".into(),
            cutibersama_tglawal: d(start),
            cutibersama_tglakhir: d(end),
            cutibersama_jumlah: None,
            cutibersama_tahun: None,
            cutibersama_file: None,
        }
    }

    #[test]
    fn year_defaults_to_start_date() {
        assert_eq!(
            validate_collective(&payload("2025-12-24", "2025-12-26")).unwrap(),
            (3, 2025)
        );
    }

    #[test]
    fn range_across_new_year_belongs_to_start_year() {
        let mut p = payload("2025-12-31", "2026-01-02");
        p.cutibersama_tahun = Some(2025);
        assert_eq!(validate_collective(&p).unwrap(), (3, 2025));

        p.cutibersama_tahun = Some(2026);
        assert_eq!(
            validate_collective(&p).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn wrong_day_count_or_reversed_dates_are_rejected() {
        let mut p = payload("2025-12-24", "2025-12-26");
        p.cutibersama_jumlah = Some(2);
        assert!(validate_collective(&p).is_err());

        assert!(validate_collective(&payload("2025-12-26", "2025-12-24")).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = payload("2025-12-24", "2025-12-24");
        p.cutibersama_nama = "  ".into();
        assert!(validate_collective(&p).is_err());
    }
}

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use sqlx::MySqlPool;
use tracing::error;

/// Where an employee is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Placement {
    pub pegawai_id: u64,
    pub skpd_id: u64,
    pub subunit_id: u64,
}

pub async fn placement(pool: &MySqlPool, pegawai_id: u64) -> Result<Option<Placement>, ApiError> {
    sqlx::query_as::<_, Placement>(
        "SELECT pegawai_id, skpd_id, subunit_id FROM pegawai WHERE pegawai_id = ?",
    )
    .bind(pegawai_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, pegawai_id, "Failed to look up employee");
        ApiError::Internal
    })
}

/// Placement of an employee the session may see, or 404.
pub async fn visible_employee(
    pool: &MySqlPool,
    auth: &AuthUser,
    pegawai_id: u64,
) -> Result<Placement, ApiError> {
    match placement(pool, pegawai_id).await? {
        Some(p) if auth.can_view_employee(p.pegawai_id, p.skpd_id, p.subunit_id) => Ok(p),
        _ => Err(ApiError::NotFound("Employee not found".into())),
    }
}

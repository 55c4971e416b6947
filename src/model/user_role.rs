use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login account of an employee with the role it acts under.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserRoleAssignment {
    #[schema(example = 1000)]
    pub pegawai_id: u64,
    #[schema(example = 2)]
    pub role_id: u8,
    /// SKPD the role applies to; falls back to the employee's placement
    #[schema(example = 3, nullable = true)]
    pub skpd_id: Option<u64>,
    pub pegawai_nama: Option<String>,
    pub pegawai_nip: Option<String>,
    #[sqlx(skip)]
    #[schema(example = "Admin SKPD", nullable = true)]
    pub role_nama: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Letter numbering code of an SKPD (`kode_cuti`), printed on leave decrees
/// as `<kode_awal>/<number>/<kode_tengah>/<year>`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveCode {
    #[schema(example = 1)]
    pub kode_id: u64,
    #[schema(example = 3)]
    pub skpd_id: u64,
    #[schema(example = "800.1.11.4")]
    pub kode_awal: String,
    #[schema(example = "BKPSDM")]
    pub kode_tengah: String,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,
}

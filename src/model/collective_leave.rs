use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// National collective leave day range (`cuti_bersama`), set once per year.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CollectiveLeave {
    #[schema(example = 1)]
    pub cutibersama_id: u64,
    #[schema(example = "Cuti Bersama Idul Fitri")]
    pub cutibersama_nama: String,
    #[schema(example = "2026-03-23", format = "date", value_type = String)]
    pub cutibersama_tglawal: NaiveDate,
    #[schema(example = "2026-03-24", format = "date", value_type = String)]
    pub cutibersama_tglakhir: NaiveDate,
    #[schema(example = 2)]
    pub cutibersama_jumlah: u32,
    #[schema(example = 2026)]
    pub cutibersama_tahun: i32,
    /// Reference to the decree document
    #[schema(nullable = true)]
    pub cutibersama_file: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "Cuti Tahunan")]
    pub jeniscuti_nama: String,
    #[schema(example = "CT", nullable = true)]
    pub jeniscuti_kode: Option<String>,
    #[schema(example = 12, nullable = true)]
    pub jeniscuti_maxhari: Option<u32>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "pegawai_id": 1000,
        "pegawai_nip": "198501012010011001",
        "pegawai_nama": "Budi Santoso",
        "pegawai_gelardepan": "Drs.",
        "pegawai_gelarbelakang": "M.Si",
        "pegawai_email": "budi@example.go.id",
        "pegawai_nohp": "081234567890",
        "skpd_id": 3,
        "subunit_id": 31
    })
)]
pub struct Employee {
    pub pegawai_id: u64,
    pub pegawai_nip: String,
    pub pegawai_nama: String,
    #[schema(nullable = true)]
    pub pegawai_gelardepan: Option<String>,
    #[schema(nullable = true)]
    pub pegawai_gelarbelakang: Option<String>,
    #[schema(nullable = true)]
    pub pegawai_email: Option<String>,
    #[schema(nullable = true)]
    pub pegawai_nohp: Option<String>,
    pub skpd_id: u64,
    pub subunit_id: u64,
}

impl Employee {
    /// Name with academic titles, e.g. "Drs. Budi Santoso M.Si".
    pub fn full_name(&self) -> String {
        [
            self.pegawai_gelardepan.as_deref(),
            Some(self.pegawai_nama.as_str()),
            self.pegawai_gelarbelakang.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

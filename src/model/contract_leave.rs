use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::LeaveStatus;
use crate::workflow::transition::Subject;

/// Leave request of a contract employee (`usul_kontrak`). Filed by an
/// administrator on the employee's behalf; it goes through the same approval
/// chain as `usul_cuti`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ContractLeave {
    #[schema(example = 1)]
    pub usulkontrak_id: u64,
    #[schema(example = 2001)]
    pub pegawai_id: u64,
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub usulcuti_tglawal: NaiveDate,
    #[schema(example = "2026-02-03", format = "date", value_type = String)]
    pub usulcuti_tglakhir: NaiveDate,
    #[schema(example = 2)]
    pub usulcuti_jumlah: u32,
    pub usulcuti_alasan: String,
    #[schema(nullable = true)]
    pub usulcuti_alamat: Option<String>,
    pub usulcuti_status: LeaveStatus,
    pub atasanlangsung_id: Option<u64>,
    #[schema(nullable = true)]
    pub atasanlangsung_status: Option<String>,
    pub pejabat_id: Option<u64>,
    #[schema(nullable = true)]
    pub pejabat_status: Option<String>,
    pub skpd_id: u64,
    pub subunit_id: u64,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,

    // joined
    pub pegawai_nama: Option<String>,
    pub pegawai_nip: Option<String>,
    pub jeniscuti_nama: Option<String>,
}

impl ContractLeave {
    pub fn subject(&self) -> Subject {
        Subject {
            status: self.usulcuti_status,
            owner_id: self.pegawai_id,
            supervisor_id: self.atasanlangsung_id,
            supervisor_status: LeaveStatus::from_stage(self.atasanlangsung_status.as_deref()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn contract_leave(status: LeaveStatus, owner: u64) -> ContractLeave {
        ContractLeave {
            usulkontrak_id: 11,
            pegawai_id: owner,
            jeniscuti_id: 1,
            usulcuti_tglawal: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            usulcuti_tglakhir: NaiveDate::from_ymd_opt(2024, 2, 6).unwrap(),
            usulcuti_jumlah: 2,
            usulcuti_alasan: "Keperluan keluarga".into(),
            usulcuti_alamat: None,
            usulcuti_status: status,
            atasanlangsung_id: None,
            atasanlangsung_status: None,
            pejabat_id: None,
            pejabat_status: None,
            skpd_id: 3,
            subunit_id: 31,
            created_at: None,
            updated_at: None,
            pegawai_nama: None,
            pegawai_nip: None,
            jeniscuti_nama: None,
        }
    }
}

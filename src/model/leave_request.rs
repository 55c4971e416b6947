use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::LeaveStatus;
use crate::workflow::transition::Subject;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub usulcuti_id: u64,
    #[schema(example = 1000)]
    pub pegawai_id: u64,
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub usulcuti_tglawal: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub usulcuti_tglakhir: NaiveDate,
    #[schema(example = 3)]
    pub usulcuti_jumlah: u32,
    #[schema(example = "Urusan keluarga")]
    pub usulcuti_alasan: String,
    #[schema(nullable = true)]
    pub usulcuti_alamat: Option<String>,
    #[schema(example = "Dalam Negeri", nullable = true)]
    pub usulcuti_lokasi: Option<String>,
    pub usulcuti_status: LeaveStatus,
    #[schema(format = "date", value_type = Option<String>)]
    pub usulcuti_tgl: Option<NaiveDate>,
    pub atasanlangsung_id: Option<u64>,
    #[schema(example = "Terima", nullable = true)]
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

impl LeaveRequest {
    /// The parts of the request the approval resolver looks at.
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
mod tests {
    use super::fixtures::leave;
    use super::*;

    #[test]
    fn only_terima_counts_as_supervisor_approval() {
        let mut l = leave(LeaveStatus::Proses, 1);
        assert!(!l.subject().supervisor_approved());
        assert_eq!(l.subject().supervisor_id, Some(20));

        l.atasanlangsung_status = Some("Terima".into());
        assert!(l.subject().supervisor_approved());

        l.atasanlangsung_status = Some("Setuju".into());
        assert!(!l.subject().supervisor_approved());
        assert_eq!(l.subject().supervisor_status, None);

        l.atasanlangsung_status = Some("Ditolak".into());
        assert!(!l.subject().supervisor_approved());
        assert_eq!(l.subject().supervisor_status, Some(LeaveStatus::Ditolak));
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::LeaveStatus;

/// `GROUP BY usulcuti_status` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub jumlah: i64,
}

/// `GROUP BY jeniscuti_id` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TypeCount {
    pub jeniscuti_nama: String,
    pub jeniscuti_kode: Option<String>,
    pub jumlah: i64,
}

/// `GROUP BY jeniscuti_id, usulcuti_status` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TypeStatusCount {
    pub jeniscuti_id: u64,
    pub jeniscuti_nama: String,
    pub status: String,
    pub jumlah: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TypeTotal {
    pub jeniscuti_nama: String,
    pub jeniscuti_kode: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveStatistics {
    pub total_pengajuan: i64,
    pub total_disetujui: i64,
    pub total_ditolak: i64,
    pub total_proses: i64,
    pub total_batal: i64,
    pub by_jenis: Vec<TypeTotal>,
}

/// Per leave-type status counts for the report dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardItem {
    pub jeniscuti_id: u64,
    pub jeniscuti_nama: String,
    pub verifikasi: i64,
    pub proses: i64,
    pub terima: i64,
    pub ditolak: i64,
    pub batal: i64,
    pub btl: i64,
    pub total: i64,
}

/// `GROUP BY jeniscuti_id, MONTH(usulcuti_tglawal)` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TypeMonthCount {
    pub jeniscuti_id: u64,
    pub jeniscuti_nama: String,
    pub bulan: i32,
    pub jumlah: i64,
}

/// Approved requests of one leave type per start month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecapItem {
    pub jeniscuti_id: u64,
    pub jeniscuti_nama: String,
    pub jan: i64,
    pub feb: i64,
    pub mar: i64,
    pub apr: i64,
    pub mei: i64,
    pub jun: i64,
    pub jul: i64,
    pub ags: i64,
    pub sep: i64,
    pub okt: i64,
    pub nov: i64,
    pub des: i64,
    pub total: i64,
}

impl RecapItem {
    fn month_mut(&mut self, bulan: i32) -> Option<&mut i64> {
        Some(match bulan {
            1 => &mut self.jan,
            2 => &mut self.feb,
            3 => &mut self.mar,
            4 => &mut self.apr,
            5 => &mut self.mei,
            6 => &mut self.jun,
            7 => &mut self.jul,
            8 => &mut self.ags,
            9 => &mut self.sep,
            10 => &mut self.okt,
            11 => &mut self.nov,
            12 => &mut self.des,
            _ => return None,
        })
    }
}

pub fn summarize(by_status: &[StatusCount], by_type: &[TypeCount]) -> LeaveStatistics {
    let mut stats = LeaveStatistics::default();

    for row in by_status {
        stats.total_pengajuan += row.jumlah;
        match row.status.parse::<LeaveStatus>() {
            Ok(LeaveStatus::Terima) => stats.total_disetujui += row.jumlah,
            Ok(LeaveStatus::Ditolak) => stats.total_ditolak += row.jumlah,
            Ok(LeaveStatus::Proses) => stats.total_proses += row.jumlah,
            Ok(LeaveStatus::Batal) => stats.total_batal += row.jumlah,
            // Verifikasi, BTL and unknown labels only count toward the total
            _ => {}
        }
    }

    stats.by_jenis = by_type
        .iter()
        .map(|t| TypeTotal {
            jeniscuti_nama: t.jeniscuti_nama.clone(),
            jeniscuti_kode: t.jeniscuti_kode.clone(),
            total: t.jumlah,
        })
        .collect();

    stats
}

/// Pivot type/status counts into one row per leave type, in first-seen order.
pub fn dashboard(rows: &[TypeStatusCount]) -> Vec<DashboardItem> {
    let mut items: Vec<DashboardItem> = Vec::new();
    let mut slot: HashMap<u64, usize> = HashMap::new();

    for row in rows {
        let i = *slot.entry(row.jeniscuti_id).or_insert_with(|| {
            items.push(DashboardItem {
                jeniscuti_id: row.jeniscuti_id,
                jeniscuti_nama: row.jeniscuti_nama.clone(),
                ..Default::default()
            });
            items.len() - 1
        });
        let item = &mut items[i];

        item.total += row.jumlah;
        let bucket = match row.status.parse::<LeaveStatus>() {
            Ok(LeaveStatus::Verifikasi) => &mut item.verifikasi,
            Ok(LeaveStatus::Proses) => &mut item.proses,
            Ok(LeaveStatus::Terima) => &mut item.terima,
            Ok(LeaveStatus::Ditolak) => &mut item.ditolak,
            Ok(LeaveStatus::Batal) => &mut item.batal,
            Ok(LeaveStatus::Btl) => &mut item.btl,
            Err(_) => continue,
        };
        *bucket += row.jumlah;
    }

    items
}

/// Pivot type/month counts into one row per leave type, in first-seen order.
/// Months outside 1..=12 are dropped.
pub fn recap(rows: &[TypeMonthCount]) -> Vec<RecapItem> {
    let mut items: Vec<RecapItem> = Vec::new();
    let mut slot: HashMap<u64, usize> = HashMap::new();

    for row in rows {
        let i = *slot.entry(row.jeniscuti_id).or_insert_with(|| {
            items.push(RecapItem {
                jeniscuti_id: row.jeniscuti_id,
                jeniscuti_nama: row.jeniscuti_nama.clone(),
                ..Default::default()
            });
            items.len() - 1
        });
        let item = &mut items[i];

        if let Some(month) = item.month_mut(row.bulan) {
            *month += row.jumlah;
            item.total += row.jumlah;
        }
    }

    items
}

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One `cuti_buku` ledger line: days of a leave type taken by an employee in a year.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalanceEntry {
    pub bukucuti_id: u64,
    pub pegawai_id: u64,
    pub jeniscuti_id: u64,
    pub jeniscuti_nama: String,
    pub bukucuti_tahun: i32,
    #[schema(format = "date", value_type = Option<String>)]
    pub bukucuti_tglawal: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub bukucuti_tglakhir: Option<NaiveDate>,
    /// Raw day count as stored. Legacy rows hold blanks and free text here.
    #[serde(default, deserialize_with = "lenient_days")]
    pub bukucuti_lama: Option<String>,
    pub bukucuti_status: Option<String>,
}

/// Per leave-type usage, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveBalanceSummary {
    #[schema(example = 1)]
    pub jeniscuti_id: u64,
    #[schema(example = "Cuti Tahunan")]
    pub jeniscuti_nama: String,
    /// Days used; half days show up as `.5`
    #[schema(example = 5.5)]
    pub terpakai: f64,
}

/// Accepts a number, a string or null for the day count.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(lama: Value) -> LeaveBalanceEntry {
        serde_json::from_value(json!({
            "bukucuti_id": 1,
            "pegawai_id": 2,
            "jeniscuti_id": 3,
            "jeniscuti_nama": "Cuti Sakit",
            "bukucuti_tahun": 2024,
            "bukucuti_tglawal": null,
            "bukucuti_tglakhir": null,
            "bukucuti_lama": lama,
            "bukucuti_status": null
        }))
        .unwrap()
    }

    #[test]
    fn day_count_accepts_any_json_scalar() {
        assert_eq!(parse(json!(4)).bukucuti_lama.as_deref(), Some("4"));
        assert_eq!(parse(json!("4")).bukucuti_lama.as_deref(), Some("4"));
        assert_eq!(parse(json!("abc")).bukucuti_lama.as_deref(), Some("abc"));
        assert_eq!(parse(Value::Null).bukucuti_lama, None);
    }
}

use std::collections::HashMap;

use crate::model::balance::{LeaveBalanceEntry, LeaveBalanceSummary};

/// Roll ledger lines up into one summary per leave type, in first-seen order.
///
/// The name of a leave type is taken from its first entry. Day counts that
/// are missing or not numbers add nothing to the total.
pub fn aggregate(entries: &[LeaveBalanceEntry]) -> Vec<LeaveBalanceSummary> {
    let mut summaries: Vec<LeaveBalanceSummary> = Vec::new();
    let mut slot: HashMap<u64, usize> = HashMap::new();

    for entry in entries {
        let days = days_of(entry.bukucuti_lama.as_deref());
        match slot.get(&entry.jeniscuti_id) {
            Some(&i) => {
                summaries[i].terpakai += days;
            }
            None => {
                slot.insert(entry.jeniscuti_id, summaries.len());
                summaries.push(LeaveBalanceSummary {
                    jeniscuti_id: entry.jeniscuti_id,
                    jeniscuti_nama: entry.jeniscuti_nama.clone(),
                    terpakai: days,
                });
            }
        }
    }

    summaries
}

/// Numeric value of a raw day count, 0 when it does not parse.
/// Half days and other fractions are kept.
pub fn days_of(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(jeniscuti_id: u64, nama: &str, lama: Option<&str>) -> LeaveBalanceEntry {
        LeaveBalanceEntry {
            bukucuti_id: 0,
            pegawai_id: 1,
            jeniscuti_id,
            jeniscuti_nama: nama.to_string(),
            bukucuti_tahun: 2024,
            bukucuti_tglawal: None,
            bukucuti_tglakhir: None,
            bukucuti_lama: lama.map(str::to_string),
            bukucuti_status: None,
        }
    }

    fn summary(id: u64, nama: &str, terpakai: f64) -> LeaveBalanceSummary {
        LeaveBalanceSummary {
            jeniscuti_id: id,
            jeniscuti_nama: nama.to_string(),
            terpakai,
        }
    }

    #[test]
    fn empty_ledger_gives_no_summaries() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn groups_by_type_in_first_seen_order() {
        let entries = [
            entry(1, "Annual", Some("3")),
            entry(1, "Annual", Some("2")),
            entry(2, "Sick", Some("1")),
        ];
        assert_eq!(
            aggregate(&entries),
            vec![summary(1, "Annual", 5.0), summary(2, "Sick", 1.0)]
        );
    }

    #[test]
    fn order_follows_first_appearance_not_id() {
        let entries = [entry(9, "Besar", Some("1")), entry(2, "Sakit", Some("1"))];
        let ids: Vec<_> = aggregate(&entries).iter().map(|s| s.jeniscuti_id).collect();
        assert_eq!(ids, vec![9, 2]);
    }

    #[test]
    fn name_comes_from_first_entry() {
        let entries = [entry(1, "Tahunan", Some("1")), entry(1, "Tahunan (lama)", Some("1"))];
        assert_eq!(aggregate(&entries), vec![summary(1, "Tahunan", 2.0)]);
    }

    #[test]
    fn junk_day_counts_add_zero() {
        let entries = [
            entry(1, "Annual", Some("abc")),
            entry(1, "Annual", None),
            entry(1, "Annual", Some("")),
            entry(1, "Annual", Some(" 4 ")),
            entry(1, "Annual", Some("NaN")),
        ];
        assert_eq!(aggregate(&entries), vec![summary(1, "Annual", 4.0)]);
    }

    #[test]
    fn group_of_only_junk_still_reported() {
        let entries = [entry(3, "Bersalin", Some("abc"))];
        assert_eq!(aggregate(&entries), vec![summary(3, "Bersalin", 0.0)]);
    }

    #[test]
    fn half_days_are_summed() {
        let entries = [
            entry(1, "Annual", Some("0.5")),
            entry(1, "Annual", Some("0.5")),
            entry(1, "Annual", Some("1.5")),
        ];
        assert_eq!(aggregate(&entries), vec![summary(1, "Annual", 2.5)]);
    }

    #[test]
    fn non_finite_day_counts_are_zero() {
        assert_eq!(days_of(Some("2.75")), 2.75);
        assert_eq!(days_of(Some("inf")), 0.0);
        assert_eq!(days_of(Some("-infinity")), 0.0);
        assert_eq!(days_of(Some("NaN")), 0.0);
    }

    fn ledger() -> impl Strategy<Value = Vec<LeaveBalanceEntry>> {
        let lama = prop_oneof![
            (0i64..30).prop_map(|d| Some(d.to_string())),
            Just(Some("abc".to_string())),
            Just(None),
        ];
        prop::collection::vec((0u64..5, lama), 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, lama)| entry(id, &format!("jenis-{id}"), lama.as_deref()))
                .collect()
        })
    }

    fn totals(summaries: &[LeaveBalanceSummary]) -> HashMap<u64, f64> {
        summaries.iter().map(|s| (s.jeniscuti_id, s.terpakai)).collect()
    }

    proptest! {
        #[test]
        fn one_summary_per_distinct_type(entries in ledger()) {
            let distinct: std::collections::HashSet<_> =
                entries.iter().map(|e| e.jeniscuti_id).collect();
            prop_assert_eq!(aggregate(&entries).len(), distinct.len());
        }

        #[test]
        fn totals_ignore_entry_order(
            (entries, shuffled) in ledger().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(totals(&aggregate(&entries)), totals(&aggregate(&shuffled)));
        }
    }
}

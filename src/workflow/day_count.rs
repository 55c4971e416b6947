use chrono::NaiveDate;

use super::WorkflowError;

/// Number of leave days between two dates, both ends included.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> Result<u32, WorkflowError> {
    if end < start {
        return Err(WorkflowError::InvalidDateRange { start, end });
    }
    u32::try_from((end - start).num_days() + 1)
        .map_err(|_| WorkflowError::InvalidDateRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn counts_both_ends() {
        assert_eq!(day_count(d("2024-01-01"), d("2024-01-05")), Ok(5));
    }

    #[test]
    fn same_day_is_one_day() {
        assert_eq!(day_count(d("2024-03-10"), d("2024-03-10")), Ok(1));
    }

    #[test]
    fn spans_leap_day() {
        assert_eq!(day_count(d("2024-02-28"), d("2024-03-01")), Ok(3));
    }

    #[test]
    fn reversed_range_is_an_error() {
        assert_matches!(
            day_count(d("2024-01-05"), d("2024-01-01")),
            Err(WorkflowError::InvalidDateRange { .. })
        );
    }
}

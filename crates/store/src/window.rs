use atlas_types::genesis;
use chrono::Utc;

const DAY_SECS: i64 = 86_400;

/// The `[from, to)` timestamp range of an aggregation cursor.
///
/// `to` is the end of the current UTC day; `from` reaches back `days` whole
/// days from the start of the current day, or to the genesis timestamp when
/// `days` is zero. The lower bound never precedes genesis.
pub fn day_window(days: u32) -> (i64, i64) {
    let eod = Utc::now()
        .date_naive()
        .and_hms_opt(23, 59, 59)
        .map(|t| t.and_utc().timestamp())
        .unwrap_or_default();
    let genesis_ts = genesis::TIMESTAMP as i64;
    if days == 0 {
        return (genesis_ts, eod);
    }
    let start_of_day = eod - (DAY_SECS - 1);
    ((start_of_day - i64::from(days) * DAY_SECS).max(genesis_ts), eod)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_days_reaches_genesis() {
        let (from, to) = day_window(0);
        assert_eq!(from, genesis::TIMESTAMP as i64);
        assert!(to > from);
    }

    #[test]
    fn window_is_whole_days() {
        let (from, to) = day_window(14);
        // 14 days plus the current partial day, inclusive bounds
        assert_eq!((to - from + 1) % DAY_SECS, 0);
        assert_eq!((to - from + 1) / DAY_SECS, 15);
    }

    #[test]
    fn window_never_precedes_genesis() {
        let (from, _) = day_window(u32::MAX);
        assert_eq!(from, genesis::TIMESTAMP as i64);
    }
}

use crate::wordle::archive::SolutionArchive;
use crate::wordle::config::GapScan;
use chrono::{Days, NaiveDate};

/// Most recent date whose solution is already published.
pub fn allowed_date(today: NaiveDate, lag_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(lag_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// First date the archive is expected to cover next.
pub fn expected_start(archive: &SolutionArchive, start_date: NaiveDate, scan: GapScan) -> NaiveDate {
    match (scan, archive.last_date()) {
        (GapScan::Full, _) | (GapScan::Tail, None) => start_date,
        (GapScan::Tail, Some(last)) => last.succ_opt().unwrap_or(last).max(start_date),
    }
}

/// Dates in `from..=through` not present in the archive, in ascending order.
pub fn missing_dates(
    archive: &SolutionArchive,
    from: NaiveDate,
    through: NaiveDate,
) -> Vec<NaiveDate> {
    if from > through {
        return Vec::new();
    }
    from.iter_days()
        .take_while(|date| *date <= through)
        .filter(|date| !archive.contains(*date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::archive::SolutionRecord;
    use crate::wordle::config::first_puzzle_date;
    use crate::wordle::util::parse_date;

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).expect("date")
    }

    fn archive_of(lines: &str) -> SolutionArchive {
        SolutionArchive::parse(lines).0
    }

    #[test]
    fn allowed_date_lags_two_days() {
        assert_eq!(allowed_date(day("2021-06-23"), 2), day("2021-06-21"));
        assert_eq!(allowed_date(day("2024-03-01"), 2), day("2024-02-28"));
        assert_eq!(allowed_date(day("2024-03-01"), 0), day("2024-03-01"));
    }

    #[test]
    fn archive_ending_on_first_puzzle_needs_two_days() {
        let archive = archive_of("2021-06-19 CIGAR\n");
        let from = expected_start(&archive, first_puzzle_date(), GapScan::Tail);
        let missing = missing_dates(&archive, from, day("2021-06-21"));
        assert_eq!(missing, vec![day("2021-06-20"), day("2021-06-21")]);
    }

    #[test]
    fn empty_archive_starts_from_start_date() {
        let archive = SolutionArchive::new();
        let from = expected_start(&archive, first_puzzle_date(), GapScan::Tail);
        assert_eq!(from, day("2021-06-19"));
        let missing = missing_dates(&archive, from, day("2021-06-20"));
        assert_eq!(missing, vec![day("2021-06-19"), day("2021-06-20")]);
    }

    #[test]
    fn up_to_date_archive_has_no_gaps() {
        let archive = archive_of("2021-06-19 CIGAR\n2021-06-20 REBUT\n");
        let from = expected_start(&archive, first_puzzle_date(), GapScan::Tail);
        assert!(missing_dates(&archive, from, day("2021-06-20")).is_empty());
        assert!(missing_dates(&archive, from, day("2021-06-19")).is_empty());
    }

    #[test]
    fn tail_scan_ignores_interior_holes_but_full_scan_finds_them() {
        let mut archive = archive_of("2021-06-19 CIGAR\n2021-06-21 SISSY\n");
        archive.upsert(SolutionRecord::new(day("2021-06-22"), "HUMPH"));

        let tail_from = expected_start(&archive, first_puzzle_date(), GapScan::Tail);
        assert_eq!(tail_from, day("2021-06-23"));
        assert_eq!(
            missing_dates(&archive, tail_from, day("2021-06-23")),
            vec![day("2021-06-23")]
        );

        let full_from = expected_start(&archive, first_puzzle_date(), GapScan::Full);
        assert_eq!(
            missing_dates(&archive, full_from, day("2021-06-23")),
            vec![day("2021-06-20"), day("2021-06-23")]
        );
    }

    #[test]
    fn tail_scan_never_starts_before_start_date() {
        let archive = archive_of("2020-01-01 EARLY\n");
        let from = expected_start(&archive, first_puzzle_date(), GapScan::Tail);
        assert_eq!(from, first_puzzle_date());
    }
}

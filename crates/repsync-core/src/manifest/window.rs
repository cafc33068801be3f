//! Date-window fallback.
//!
//! When the local manifest cannot be trusted as a bookmark, only entries
//! dated within the last `lookback_days` are fetched. Older entries are
//! deliberately never re-fetched: replaying the whole archive history is not
//! affordable.

use chrono::{Days, NaiveDate};

use super::ManifestEntry;
use crate::config::DEFAULT_LOOKBACK_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    lookback_days: u32,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_DAYS)
    }
}

impl DateWindow {
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// `today - lookback_days` as `YYYYMMDD`. Entries must be strictly newer.
    pub fn cutoff(&self, today: NaiveDate) -> String {
        today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
            .format("%Y%m%d")
            .to_string()
    }

    /// True if the entry has a valid date prefix later than `cutoff`.
    /// Comparing the 8-digit strings is equivalent to comparing the dates.
    pub fn admits(entry: &ManifestEntry, cutoff: &str) -> bool {
        entry.date_prefix().is_some_and(|date| date > cutoff)
    }

    /// Entries within the window, in manifest order.
    pub fn select(&self, entries: &[ManifestEntry], today: NaiveDate) -> Vec<ManifestEntry> {
        let cutoff = self.cutoff(today);
        entries
            .iter()
            .filter(|e| Self::admits(e, &cutoff))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entries(lines: &[&str]) -> Vec<ManifestEntry> {
        lines.iter().filter_map(|l| ManifestEntry::parse(l)).collect()
    }

    #[test]
    fn cutoff_is_lookback_days_before_today() {
        let w = DateWindow::new(14);
        assert_eq!(w.cutoff(day(2024, 3, 15)), "20240301");
        assert_eq!(DateWindow::new(30).cutoff(day(2024, 3, 1)), "20240131");
    }

    #[test]
    fn boundary_day_is_excluded() {
        let w = DateWindow::new(14);
        let all = entries(&[
            "/EQ/20240229/old.zip",
            "/EQ/20240301/boundary.zip",
            "/EQ/20240302/inside.zip",
            "/EQ/20240315/today.zip",
        ]);
        let picked: Vec<_> = w
            .select(&all, day(2024, 3, 15))
            .into_iter()
            .map(|e| e.path().to_string())
            .collect();
        assert_eq!(picked, vec!["/EQ/20240302/inside.zip", "/EQ/20240315/today.zip"]);
    }

    #[test]
    fn entries_without_date_prefix_are_excluded() {
        let w = DateWindow::new(14);
        let all = entries(&["/EQ/latest/x.zip", "/EQ/2024031/x.zip", "/EQ/20240310/ok.zip"]);
        let picked = w.select(&all, day(2024, 3, 15));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].path(), "/EQ/20240310/ok.zip");
    }

    #[test]
    fn default_window_is_fourteen_days() {
        assert_eq!(DateWindow::default().lookback_days(), 14);
    }
}

//! Date bucket levels and the settings that enable them.
//!
//! # Invariants
//! - Bucket titles are fixed width (`YYYY`, `MM`, `DD`), so byte-wise string
//!   order equals chronological order.
//! - Day buckets are only used when month buckets are enabled.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One level of the Year/Month/Day folder chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderGranularity {
    Year,
    Month,
    Day,
}

impl FolderGranularity {
    /// All levels, outermost first.
    pub const ALL: [FolderGranularity; 3] = [Self::Year, Self::Month, Self::Day];

    /// `chrono` format string producing the bucket title.
    pub fn format_spec(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%m",
            Self::Day => "%d",
        }
    }

    /// Formats the bucket title of `date` for this level.
    ///
    /// Uses the stored wall-clock value as-is; no timezone conversion.
    pub fn bucket_title(self, date: &NaiveDateTime) -> String {
        date.format(self.format_spec()).to_string()
    }

    /// Stable lowercase name for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }
}

/// Which date levels news items are filed into.
///
/// Deserializes from the camelCase keys `sortByMonth` / `sortByDay`; missing
/// keys mean `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GranularityConfig {
    pub sort_by_month: bool,
    pub sort_by_day: bool,
}

impl GranularityConfig {
    /// Year folders only.
    pub const YEAR: Self = Self {
        sort_by_month: false,
        sort_by_day: false,
    };
    /// Year and month folders.
    pub const MONTH: Self = Self {
        sort_by_month: true,
        sort_by_day: false,
    };
    /// Year, month and day folders.
    pub const DAY: Self = Self {
        sort_by_month: true,
        sort_by_day: true,
    };

    /// Returns whether `level` takes part in resolution.
    pub fn includes(&self, level: FolderGranularity) -> bool {
        match level {
            FolderGranularity::Year => true,
            FolderGranularity::Month => self.sort_by_month,
            FolderGranularity::Day => self.sort_by_month && self.sort_by_day,
        }
    }

    /// Active levels, outermost first.
    pub fn levels(&self) -> impl Iterator<Item = FolderGranularity> + '_ {
        FolderGranularity::ALL
            .into_iter()
            .take_while(move |level| self.includes(*level))
    }
}

#[cfg(test)]
mod tests {
    use super::{FolderGranularity, GranularityConfig};
    use chrono::NaiveDate;

    #[test]
    fn bucket_titles_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(987, 3, 4)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(FolderGranularity::Year.bucket_title(&date), "0987");
        assert_eq!(FolderGranularity::Month.bucket_title(&date), "03");
        assert_eq!(FolderGranularity::Day.bucket_title(&date), "04");
    }

    #[test]
    fn day_flag_without_month_stops_at_year() {
        let config = GranularityConfig {
            sort_by_month: false,
            sort_by_day: true,
        };
        let levels: Vec<_> = config.levels().collect();
        assert_eq!(levels, vec![FolderGranularity::Year]);
    }

    #[test]
    fn full_config_walks_all_levels() {
        let levels: Vec<_> = GranularityConfig::DAY.levels().collect();
        assert_eq!(levels, FolderGranularity::ALL.to_vec());
        let levels: Vec<_> = GranularityConfig::MONTH.levels().collect();
        assert_eq!(
            levels,
            vec![FolderGranularity::Year, FolderGranularity::Month]
        );
    }
}

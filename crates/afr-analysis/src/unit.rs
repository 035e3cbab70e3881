//! Units of the age axis.
//!
//! Drive statistics report power-on hours. Every analysis runs on an axis in
//! years, so hour-based inputs are divided by [`HOURS_PER_YEAR`] on entry.

use afr_stats::series::TimeSeries;
use serde::{Deserialize, Serialize};

/// Hours in a 365-day year.
pub const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    /// Power-on hours
    #[default]
    Hours,
    /// Years
    Years,
}

impl AgeUnit {
    /// Number of this unit in one year.
    #[must_use]
    pub fn per_year(self) -> f64 {
        match self {
            AgeUnit::Hours => HOURS_PER_YEAR,
            AgeUnit::Years => 1.0,
        }
    }

    #[must_use]
    pub fn to_years(self, value: f64) -> f64 {
        value / self.per_year()
    }

    /// Rescales the x axis of `series` from this unit to years.
    ///
    /// ```
    /// use afr_analysis::unit::AgeUnit;
    /// use afr_stats::series::TimeSeries;
    ///
    /// let series = TimeSeries::new(vec![0.0, 8760.0], vec![5.0, 7.0]).unwrap();
    /// let years = AgeUnit::Hours.series_to_years(&series);
    /// assert_eq!(years.xs(), &[0.0, 1.0]);
    /// assert_eq!(years.ys(), &[5.0, 7.0]);
    /// ```
    #[must_use]
    pub fn series_to_years(self, series: &TimeSeries) -> TimeSeries {
        match self {
            AgeUnit::Hours => series.rescale_x(HOURS_PER_YEAR),
            AgeUnit::Years => series.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("hours".parse::<AgeUnit>().unwrap(), AgeUnit::Hours);
        assert_eq!("Years".parse::<AgeUnit>().unwrap(), AgeUnit::Years);
        assert!("days".parse::<AgeUnit>().is_err());
    }

    #[test]
    fn test_to_years() {
        assert_eq!(AgeUnit::Hours.to_years(4380.0), 0.5);
        assert_eq!(AgeUnit::Years.to_years(4380.0), 4380.0);
    }
}

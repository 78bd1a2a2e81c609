//! Indicator derivation for one series.
//!
//! All indicators of a profile are computed once over the whole series.
//! Results are stored in an `IndicatorValues` container next to the untouched
//! bars.

use crate::components::indicator::{IndicatorSet, IndicatorValues};
use crate::domain::{Bar, Series};
use crate::engine::profile::IndicatorProfile;

/// Stateless indicator engine. Safe to share across threads; one call per series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorEngine {
    profile: IndicatorProfile,
}

impl IndicatorEngine {
    pub fn new(profile: IndicatorProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> IndicatorProfile {
        self.profile
    }

    /// Annotate a series with the profile's indicator columns.
    ///
    /// A series shorter than the profile's minimum comes back with no columns;
    /// that is "insufficient history", not an error.
    pub fn annotate(&self, series: Series) -> AnnotatedSeries {
        let indicators = self.compute(series.bars());
        AnnotatedSeries { series, indicators }
    }

    /// Compute the indicator columns for a bar slice.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorValues {
        let mut iv = IndicatorValues::new();
        if !self.profile.admits(bars.len()) {
            return iv;
        }

        for indicator in self.profile.indicators() {
            let series = indicator.compute(bars);
            debug_assert_eq!(
                series.len(),
                bars.len(),
                "indicator '{}' produced {} values for {} bars",
                indicator.name(),
                series.len(),
                bars.len(),
            );
            iv.insert(indicator.name(), series);
        }
        iv
    }
}

/// A series together with its computed indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub series: Series,
    pub indicators: IndicatorValues,
}

impl AnnotatedSeries {
    /// True when the gate rejected the series.
    pub fn is_gated(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Bars paired with their indicator fields, oldest first.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = (&Bar, IndicatorSet)> + '_ {
        self.series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar, self.indicators.row(i)))
    }
}

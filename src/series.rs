//!
//! # Scan series
//!
//! Per-iteration scalars accumulate in a [`ScanCollector`] and come out as a
//! [`ScanSeries`] sorted by sweep parameter, ready for the plot or export
//! side. The collector replaces the ad hoc module-level lists the original
//! scans appended to: the pairing between parameter, focus and charge is held
//! by one record, and finalization consumes the collector so nothing can be
//! appended to a sorted series.

use serde::Serialize;

/// The scalars measured at one sweep point
///
/// `None` marks a measurement that was skipped (not requested, or the
/// iteration failed and the sweep policy recorded the point as missing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanRecord {
    /// The sweep parameter of this iteration
    pub parameter: f64,
    /// Axial focus position
    pub focus: Option<f64>,
    /// Global intensity maximum
    pub peak: Option<f64>,
    /// Windowed integrated charge
    pub charge: Option<f64>,
}
impl ScanRecord {
    /// A record with every measurement missing
    pub fn missing(parameter: f64) -> Self {
        Self {
            parameter,
            focus: None,
            peak: None,
            charge: None,
        }
    }
}

/// Accumulates [`ScanRecord`]s in sweep order
#[derive(Debug, Clone, Default)]
pub struct ScanCollector {
    records: Vec<ScanRecord>,
}
impl ScanCollector {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn collect(&mut self, record: ScanRecord) {
        self.records.push(record);
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Stably sorts the records by parameter ascending and closes the series
    pub fn finalize(mut self) -> ScanSeries {
        self.records
            .sort_by(|a, b| a.parameter.total_cmp(&b.parameter));
        ScanSeries {
            records: self.records,
        }
    }
}

/// The finalized scan: records sorted by parameter ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSeries {
    records: Vec<ScanRecord>,
}
impl ScanSeries {
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// The sweep parameters, ascending
    pub fn parameters(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.parameter).collect()
    }
    pub fn focus_positions(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.focus).collect()
    }
    pub fn peaks(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.peak).collect()
    }
    pub fn charges(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.charge).collect()
    }
    /// The charges divided by the largest charge of the series
    ///
    /// The normalization the NA-family scans apply before overlaying their
    /// curves. A series with no positive charge is returned unscaled.
    pub fn normalized_charges(&self) -> Vec<Option<f64>> {
        let max = self
            .records
            .iter()
            .filter_map(|r| r.charge)
            .fold(f64::NEG_INFINITY, f64::max);
        if !(max > 0.0) {
            log::warn!("no positive charge in the series, skipping normalization");
            return self.charges();
        }
        self.records
            .iter()
            .map(|r| r.charge.map(|c| c / max))
            .collect()
    }
    /// Reopens the series for collection, dropping every record
    pub fn reset(self) -> ScanCollector {
        ScanCollector::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(parameter: f64, focus: f64, charge: f64) -> ScanRecord {
        ScanRecord {
            parameter,
            focus: Some(focus),
            peak: None,
            charge: Some(charge),
        }
    }

    #[test]
    fn finalize_sorts_and_keeps_pairing() {
        let mut collector = ScanCollector::new();
        collector.collect(record(3.0, 30.0, 300.0));
        collector.collect(record(1.0, 10.0, 100.0));
        collector.collect(record(2.0, 20.0, 200.0));
        let series = collector.finalize();
        assert_eq!(series.parameters(), vec![1.0, 2.0, 3.0]);
        assert_eq!(
            series.focus_positions(),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
        assert_eq!(
            series.charges(),
            vec![Some(100.0), Some(200.0), Some(300.0)]
        );
    }

    #[test]
    fn finalize_is_stable_for_equal_parameters() {
        let mut collector = ScanCollector::new();
        collector.collect(record(1.0, 11.0, 0.0));
        collector.collect(record(1.0, 12.0, 0.0));
        let series = collector.finalize();
        assert_eq!(series.focus_positions(), vec![Some(11.0), Some(12.0)]);
    }

    #[test]
    fn normalized_charges_peak_at_one() {
        let mut collector = ScanCollector::new();
        collector.collect(record(0.0, 0.0, 2.0));
        collector.collect(record(1.0, 0.0, 8.0));
        collector.collect(ScanRecord::missing(2.0));
        let normalized = collector.finalize().normalized_charges();
        assert_relative_eq!(normalized[0].unwrap(), 0.25);
        assert_relative_eq!(normalized[1].unwrap(), 1.0);
        assert!(normalized[2].is_none());
    }

    #[test]
    fn all_zero_series_is_not_normalized() {
        let mut collector = ScanCollector::new();
        collector.collect(record(0.0, 0.0, 0.0));
        let normalized = collector.finalize().normalized_charges();
        assert_eq!(normalized, vec![Some(0.0)]);
    }

    #[test]
    fn reset_reopens_collection() {
        let mut collector = ScanCollector::new();
        collector.collect(record(1.0, 0.0, 0.0));
        let mut collector = collector.finalize().reset();
        assert!(collector.is_empty());
        collector.collect(record(2.0, 0.0, 0.0));
        assert_eq!(collector.len(), 1);
    }
}

//! Weighted event counting and normalization to a cross section.

use crate::config::{AccumulationMode, FiducialSource, YieldConfig};
use crate::error::{AnalysisError, AnalysisResult};
use crate::selection::EventSelection;

/// Running inclusive and fiducial totals over a run.
#[derive(Clone, Debug)]
pub struct YieldCounter {
    config: YieldConfig,
    inclusive: f64,
    fiducial: f64,
    sum_of_weights: f64,
    n_events: usize,
    n_fiducial: usize,
}

/// Normalized yields, in picobarn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Yields {
    pub inclusive: f64,
    pub fiducial: f64,
    pub cross_section: f64,
    pub sum_of_weights: f64,
    pub n_events: usize,
    pub n_fiducial: usize,
}

impl YieldCounter {
    pub fn new(config: YieldConfig) -> Self {
        Self {
            config,
            inclusive: 0.0,
            fiducial: 0.0,
            sum_of_weights: 0.0,
            n_events: 0,
            n_fiducial: 0,
        }
    }

    /// Whether this event belongs in the fiducial counter.
    pub fn is_fiducial(&self, selection: &EventSelection) -> bool {
        match self.config.mode {
            AccumulationMode::Dormant => false,
            AccumulationMode::Gated => match self.config.fiducial_source {
                FiducialSource::Detector => selection.detector.passed(),
                FiducialSource::Particle => selection.particle.passed(),
                FiducialSource::Both => selection.detector.passed() && selection.particle.passed(),
            },
        }
    }

    /// Add one event. Returns whether it entered the fiducial counter.
    pub fn fill(&mut self, selection: &EventSelection) -> bool {
        let fiducial = self.is_fiducial(selection);
        self.fill_weight(selection.weight, fiducial);
        fiducial
    }

    pub fn fill_weight(&mut self, weight: f64, fiducial: bool) {
        self.sum_of_weights += weight;
        self.inclusive += weight;
        self.n_events += 1;
        if fiducial {
            self.fiducial += weight;
            self.n_fiducial += 1;
        }
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Scale both counters by `cross_section / Σw` over all events seen.
    ///
    /// The counters are divided by Σw before multiplying by the cross section, so a counter that
    /// collected every event normalizes to exactly `cross_section`.
    pub fn finalize(self, cross_section: f64) -> AnalysisResult<Yields> {
        if !(cross_section.is_finite() && cross_section >= 0.0) {
            return Err(AnalysisError::InvalidCrossSection(cross_section));
        }
        if self.sum_of_weights == 0.0 || !self.sum_of_weights.is_finite() {
            return Err(AnalysisError::ZeroSumOfWeights {
                sum_of_weights: self.sum_of_weights,
            });
        }
        let normalize = |counter: f64| cross_section * (counter / self.sum_of_weights);
        Ok(Yields {
            inclusive: normalize(self.inclusive),
            fiducial: normalize(self.fiducial),
            cross_section,
            sum_of_weights: self.sum_of_weights,
            n_events: self.n_events,
            n_fiducial: self.n_fiducial,
        })
    }
}

impl Default for YieldCounter {
    fn default() -> Self {
        Self::new(YieldConfig::default())
    }
}

impl Yields {
    /// Fraction of the inclusive cross section inside the fiducial region.
    pub fn acceptance(&self) -> f64 {
        if self.inclusive == 0.0 {
            0.0
        } else {
            self.fiducial / self.inclusive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inclusive_normalizes_to_cross_section() {
        let mut counter = YieldCounter::default();
        for _ in 0..1000 {
            counter.fill_weight(0.37, false);
        }
        let yields = counter.finalize(252.89).unwrap();
        assert_eq!(yields.inclusive, 252.89);
        assert_eq!(yields.fiducial, 0.0);
        assert_eq!(yields.n_events, 1000);
    }

    #[test]
    fn test_counters_share_denominator() {
        let mut counter = YieldCounter::default();
        counter.fill_weight(2.0, true);
        counter.fill_weight(1.0, false);
        counter.fill_weight(1.0, true);
        let yields = counter.finalize(100.0).unwrap();
        assert_relative_eq!(yields.inclusive, 100.0, max_relative = 1e-12);
        assert_relative_eq!(yields.fiducial, 75.0, max_relative = 1e-12);
        assert_relative_eq!(yields.acceptance(), 0.75, max_relative = 1e-12);
        assert_eq!(yields.n_fiducial, 2);
    }

    #[test]
    fn test_empty_run_is_an_error() {
        let counter = YieldCounter::default();
        assert!(matches!(
            counter.finalize(10.0),
            Err(AnalysisError::ZeroSumOfWeights { .. })
        ));

        let mut cancelling = YieldCounter::default();
        cancelling.fill_weight(1.0, true);
        cancelling.fill_weight(-1.0, true);
        assert!(cancelling.finalize(10.0).is_err());
    }

    #[test]
    fn test_invalid_cross_section() {
        let mut counter = YieldCounter::default();
        counter.fill_weight(1.0, true);
        assert!(matches!(
            counter.finalize(f64::NAN),
            Err(AnalysisError::InvalidCrossSection(_))
        ));
    }
}

//! Run driver: selection over a whole sample, yield accumulation and normalization.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::{AnalysisConfig, Level};
use crate::error::AnalysisResult;
use crate::event::Event;
use crate::selection::{EventSelection, Selector};
use crate::yields::{YieldCounter, Yields};

/// Weighted and unweighted pass or rejection tally for one entry of the cutflow.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tally {
    pub events: usize,
    pub weight: f64,
}

impl Tally {
    fn add(&mut self, weight: f64) {
        self.events += 1;
        self.weight += weight;
    }
}

/// Everything reported at the end of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub yields: Yields,
    pub detector_passed: Tally,
    pub particle_passed: Tally,
    pub both_passed: Tally,
    /// Events whose detector-level lepton count differs from the top-decay lepton count.
    pub lepton_count_mismatches: usize,
    /// Rejections per level and reason. An event failing several requirements is counted once
    /// under each of them.
    pub rejections: BTreeMap<(Level, &'static str), Tally>,
}

/// One analysis run. Events are selected independently and may be selected in parallel; the
/// counters are only ever filled sequentially, in input order.
#[derive(Clone, Debug)]
pub struct Analysis {
    selector: Selector,
    counter: YieldCounter,
    detector_passed: Tally,
    particle_passed: Tally,
    both_passed: Tally,
    lepton_count_mismatches: usize,
    rejections: BTreeMap<(Level, &'static str), Tally>,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            counter: YieldCounter::new(config.yields),
            selector: Selector::new(config),
            detector_passed: Tally::default(),
            particle_passed: Tally::default(),
            both_passed: Tally::default(),
            lepton_count_mismatches: 0,
            rejections: BTreeMap::new(),
        })
    }

    /// Select every event. The output is index-aligned with `events`.
    pub fn select_all(&self, events: &[Event]) -> Vec<EventSelection> {
        events
            .par_iter()
            .map(|event| self.selector.select(event))
            .collect()
    }

    /// Fill the counters and cutflow with one selected event.
    pub fn accumulate(&mut self, index: usize, selection: &EventSelection) {
        let weight = selection.weight;
        let fiducial = self.counter.fill(selection);
        for level in [Level::Detector, Level::Particle] {
            let verdict = selection.verdict(level);
            for rejection in &verdict.rejections {
                tracing::debug!(
                    event = index,
                    level = %level,
                    reason = rejection.code(),
                    "rejected"
                );
                self.rejections
                    .entry((level, rejection.code()))
                    .or_default()
                    .add(weight);
            }
        }
        if selection.detector.passed() {
            self.detector_passed.add(weight);
        }
        if selection.particle.passed() {
            self.particle_passed.add(weight);
        }
        if selection.detector.passed() && selection.particle.passed() {
            self.both_passed.add(weight);
        }
        if !selection.lepton_counts_agree {
            self.lepton_count_mismatches += 1;
        }
        tracing::trace!(event = index, weight, fiducial, "accumulated");
    }

    /// Normalize to `cross_section` (pb). Consumes the run, so normalization happens once.
    pub fn finalize(self, cross_section: f64) -> AnalysisResult<RunSummary> {
        let n_events = self.counter.n_events();
        if self.lepton_count_mismatches > 0 {
            tracing::warn!(
                mismatches = self.lepton_count_mismatches,
                events = n_events,
                "detector-level lepton count disagrees with top-decay leptons"
            );
        }
        let yields = self.counter.finalize(cross_section)?;
        tracing::info!(
            events = n_events,
            detector_passed = self.detector_passed.events,
            particle_passed = self.particle_passed.events,
            inclusive_pb = yields.inclusive,
            fiducial_pb = yields.fiducial,
            "run finalized"
        );
        Ok(RunSummary {
            yields,
            detector_passed: self.detector_passed,
            particle_passed: self.particle_passed,
            both_passed: self.both_passed,
            lepton_count_mismatches: self.lepton_count_mismatches,
            rejections: self.rejections,
        })
    }

    /// Select, accumulate and normalize a full sample. Also returns the per-event selections.
    pub fn run(
        mut self,
        events: &[Event],
        cross_section: f64,
    ) -> AnalysisResult<(RunSummary, Vec<EventSelection>)> {
        tracing::info!(events = events.len(), "selecting events");
        let selections = self.select_all(events);
        for (index, selection) in selections.iter().enumerate() {
            self.accumulate(index, selection);
        }
        let summary = self.finalize(cross_section)?;
        Ok((summary, selections))
    }
}

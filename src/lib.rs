//! Fiducial and inclusive top-pair cross sections in the lepton+jets channel.
//!
//! Each [`Event`] is reconstructed twice, once from the detector-level final state and once from
//! the stable generator-level ("particle-level") final state. At each level the
//! [`Selector`] builds electrons, muons and (at particle level) photon-dressed leptons, counts
//! jets and b-tagged jets, checks that a single lepton is isolated from all jets, and returns a
//! [`Verdict`] listing every requirement the event failed. An [`Analysis`] feeds the verdicts
//! into a [`YieldCounter`] and normalizes the inclusive and fiducial yields to a cross section.
//!
//! ```rust,no_run
//! use ttbar_fiducial::{Analysis, AnalysisConfig, Sample};
//!
//! let sample = Sample::generate(10_000, 10_000, 0);
//! let analysis = Analysis::new(AnalysisConfig::default()).unwrap();
//! let (summary, _) = analysis.run(&sample.events, 252.89).unwrap();
//! println!("fiducial: {} pb", summary.yields.fiducial);
//! ```

pub mod analysis;
pub mod config;
pub mod dressing;
pub mod error;
pub mod event;
pub mod generate;
pub mod isolation;
pub mod jets;
pub mod objects;
pub mod selection;
pub mod table;
pub mod vectors;
pub mod yields;

pub use analysis::{Analysis, RunSummary, Tally};
pub use config::{
    AccumulationMode, AnalysisConfig, FiducialSource, KinematicCuts, LeptonSource, Level,
    LevelConfig, YieldConfig,
};
pub use dressing::{dress_leptons, DressedLepton};
pub use error::{AnalysisError, AnalysisResult};
pub use event::{pid, Event, Jet, Particle};
pub use generate::{EventType, Sample};
pub use isolation::Isolation;
pub use jets::JetCounts;
pub use objects::{Acceptance, EtaWindow, Leptons};
pub use selection::{EventSelection, Rejection, Selector, Verdict};
pub use vectors::FourMomentum;
pub use yields::{YieldCounter, Yields};

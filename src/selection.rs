//! Signal-region selection at detector and particle level.
//!
//! Both levels run through the same code, parametrized by their [`LevelConfig`]. Every
//! requirement is always evaluated, so a [`Verdict`] lists all the reasons an event failed and
//! not only the first.

use crate::config::{AnalysisConfig, Level, LevelConfig, LeptonSource};
use crate::dressing::{dress_leptons, DressedLepton};
use crate::event::{pid, Event, Jet, Particle};
use crate::isolation::Isolation;
use crate::jets::JetCounts;
use crate::objects::{select_particles, sort_by_pt, Leptons};
use crate::vectors::{transverse_mass, FourMomentum};

/// Why a level rejected an event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Rejection {
    JetMultiplicity { found: usize, required: usize },
    BTagMultiplicity { found: usize, required: usize },
    LeptonMultiplicity { found: usize, required: usize },
    LeptonJetOverlap { jets: usize },
    MissingEt { met: f64, min: f64 },
    WTransverseMass { mtw: f64, min: f64 },
}

impl Rejection {
    /// Stable identifier used in tables and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::JetMultiplicity { .. } => "jet_multiplicity",
            Rejection::BTagMultiplicity { .. } => "btag_multiplicity",
            Rejection::LeptonMultiplicity { .. } => "lepton_multiplicity",
            Rejection::LeptonJetOverlap { .. } => "lepton_jet_overlap",
            Rejection::MissingEt { .. } => "missing_et",
            Rejection::WTransverseMass { .. } => "w_transverse_mass",
        }
    }
}

/// The outcome of the signal-region requirements at one level, with the quantities they were
/// evaluated on.
#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub level: Level,
    pub jets: JetCounts,
    pub n_leptons: usize,
    /// Only evaluated when the lepton multiplicity requirement holds.
    pub isolation: Option<Isolation>,
    pub met: f64,
    /// Only defined when the lepton multiplicity requirement holds.
    pub mtw: Option<f64>,
    pub rejections: Vec<Rejection>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn first_rejection(&self) -> Option<&Rejection> {
        self.rejections.first()
    }

    pub fn rejected_by(&self, code: &str) -> bool {
        self.rejections.iter().any(|r| r.code() == code)
    }
}

/// Objects reconstructed at one level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconstruction {
    pub leptons: Leptons,
    /// Leptons dressed with photons, hardest bare lepton first, that still pass their acceptance
    /// after dressing. Empty without a dressing setup.
    pub dressed: Vec<DressedLepton>,
    pub jets: Vec<Jet>,
}

impl Reconstruction {
    pub fn build(config: &LevelConfig, particles: &[Particle], jets: &[Jet]) -> Self {
        let leptons = Leptons::build(particles, &config.electrons, &config.muons);
        let dressed = match &config.dressing {
            Some(dressing) => {
                let photons = select_particles(particles, pid::PHOTON, &dressing.photons);
                let mut bare: Vec<Particle> = leptons
                    .electrons
                    .iter()
                    .chain(&leptons.muons)
                    .copied()
                    .collect();
                sort_by_pt(&mut bare);
                let mut dressed = dress_leptons(&bare, &photons, dressing.cone);
                dressed.retain(|lepton| {
                    let acceptance = match lepton.bare.abs_pid() {
                        pid::ELECTRON => &config.electrons,
                        _ => &config.muons,
                    };
                    acceptance.accepts(&lepton.p4)
                });
                dressed
            }
            None => Vec::new(),
        };
        let mut jets = jets.to_vec();
        jets.sort_by(|a, b| b.p4.pt().total_cmp(&a.p4.pt()));
        Self {
            leptons,
            dressed,
            jets,
        }
    }
}

/// Apply the signal-region requirements of one level.
///
/// `candidates` is the number of lepton candidates and `selected` the lepton that isolation and
/// m_T^W are computed from. Neither is looked at unless the multiplicity requirement holds.
fn decide(
    level: Level,
    config: &LevelConfig,
    jets: &[Jet],
    candidates: usize,
    selected: Option<&FourMomentum>,
    missing: &FourMomentum,
) -> Verdict {
    let mut rejections = Vec::new();
    let counts = JetCounts::classify(jets);
    if counts.jets != config.n_jets {
        rejections.push(Rejection::JetMultiplicity {
            found: counts.jets,
            required: config.n_jets,
        });
    }
    if counts.b_tagged != config.n_b_tagged {
        rejections.push(Rejection::BTagMultiplicity {
            found: counts.b_tagged,
            required: config.n_b_tagged,
        });
    }

    let selected = selected.filter(|_| candidates == config.n_leptons);
    if candidates != config.n_leptons {
        rejections.push(Rejection::LeptonMultiplicity {
            found: candidates,
            required: config.n_leptons,
        });
    }
    let isolation = selected.map(|lepton| Isolation::evaluate(lepton, jets, config.isolation_cone));
    if let Some(iso) = isolation.filter(|iso| !iso.isolated) {
        rejections.push(Rejection::LeptonJetOverlap {
            jets: iso.overlapping_jets,
        });
    }

    let met = missing.pt();
    let mtw = selected.map(|lepton| transverse_mass(lepton, missing));
    if let Some(min) = config.kinematics.met_min {
        if met <= min {
            rejections.push(Rejection::MissingEt { met, min });
        }
    }
    if let (Some(min), Some(mtw)) = (config.kinematics.mtw_min, mtw) {
        if mtw < min {
            rejections.push(Rejection::WTransverseMass { mtw, min });
        }
    }

    Verdict {
        level,
        jets: counts,
        n_leptons: candidates,
        isolation,
        met,
        mtw,
        rejections,
    }
}

/// Both verdicts of one event plus the particle-level dressed leptons.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSelection {
    pub detector: Verdict,
    pub particle: Verdict,
    pub dressed_leptons: Vec<DressedLepton>,
    /// Whether the detector-level lepton count matches the top-decay lepton count. Diagnostic
    /// only, it never rejects an event.
    pub lepton_counts_agree: bool,
    pub weight: f64,
}

impl EventSelection {
    pub fn verdict(&self, level: Level) -> &Verdict {
        match level {
            Level::Detector => &self.detector,
            Level::Particle => &self.particle,
        }
    }
}

/// Evaluates the signal region of both levels on individual events.
#[derive(Clone, Debug, Default)]
pub struct Selector {
    config: AnalysisConfig,
}

impl Selector {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    fn evaluate_level(&self, level: Level, event: &Event) -> (Verdict, Reconstruction) {
        let config = self.config.level(level);
        let (particles, jets) = match level {
            Level::Detector => (&event.detector_particles, &event.detector_jets),
            Level::Particle => (&event.truth_particles, &event.particle_jets),
        };
        let reco = Reconstruction::build(config, particles, jets);
        let (candidates, selected) = match config.lepton_source {
            LeptonSource::Reconstructed => (
                reco.leptons.len(),
                reco.leptons.selected().map(|l| l.p4),
            ),
            LeptonSource::TopDecays => (
                event.top_leptons.len(),
                event.top_leptons.first().map(|l| l.p4),
            ),
        };
        let verdict = decide(
            level,
            config,
            &reco.jets,
            candidates,
            selected.as_ref(),
            &event.missing_momentum,
        );
        (verdict, reco)
    }

    pub fn select(&self, event: &Event) -> EventSelection {
        let (detector, detector_reco) = self.evaluate_level(Level::Detector, event);
        let (particle, particle_reco) = self.evaluate_level(Level::Particle, event);
        EventSelection {
            lepton_counts_agree: detector_reco.leptons.len() == event.top_leptons.len(),
            detector,
            particle,
            dressed_leptons: particle_reco.dressed,
            weight: event.weight,
        }
    }
}

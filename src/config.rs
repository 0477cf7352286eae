//! Selection and yield settings.
//!
//! Defaults reproduce the lepton+jets signal region. Any of it can be overridden from a TOML
//! file; a `[detector]` or `[particle]` table replaces that level's settings as a whole.

use std::path::Path;

use serde::Deserialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::objects::Acceptance;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Detector,
    Particle,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Detector => "detector",
            Level::Particle => "particle",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the single-lepton requirement takes its candidates from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeptonSource {
    /// Electrons and muons built from the level's final state.
    Reconstructed,
    /// Charged leptons from leptonically decaying top quarks.
    TopDecays,
}

/// Thresholds on E_T^miss and m_T^W. Both are computed for every event; a cut only applies once
/// its threshold is set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
pub struct KinematicCuts {
    #[serde(default)]
    pub met_min: Option<f64>,
    #[serde(default)]
    pub mtw_min: Option<f64>,
}

impl KinematicCuts {
    /// The thresholds used by the measurement (25 GeV and 30 GeV).
    pub fn nominal() -> Self {
        Self {
            met_min: Some(25.0),
            mtw_min: Some(30.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LevelConfig {
    pub electrons: Acceptance,
    pub muons: Acceptance,
    /// Photons available for dressing, with the ΔR cone. No dressing when absent.
    #[serde(default)]
    pub dressing: Option<Dressing>,
    pub lepton_source: LeptonSource,
    pub isolation_cone: f64,
    pub n_jets: usize,
    pub n_b_tagged: usize,
    pub n_leptons: usize,
    #[serde(default)]
    pub kinematics: KinematicCuts,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Dressing {
    pub photons: Acceptance,
    pub cone: f64,
}

impl LevelConfig {
    pub fn detector() -> Self {
        Self {
            electrons: Acceptance::detector_electrons(),
            muons: Acceptance::detector_muons(),
            dressing: None,
            lepton_source: LeptonSource::Reconstructed,
            isolation_cone: 0.4,
            n_jets: 4,
            n_b_tagged: 2,
            n_leptons: 1,
            kinematics: KinematicCuts::default(),
        }
    }

    pub fn particle() -> Self {
        Self {
            electrons: Acceptance::particle_level(),
            muons: Acceptance::particle_level(),
            dressing: Some(Dressing {
                photons: Acceptance::particle_level(),
                cone: 0.1,
            }),
            lepton_source: LeptonSource::TopDecays,
            isolation_cone: 0.4,
            n_jets: 4,
            n_b_tagged: 2,
            n_leptons: 1,
            kinematics: KinematicCuts::default(),
        }
    }

    fn validate(&self, level: Level) -> AnalysisResult<()> {
        let field = |name: &str| format!("{level}.{name}");
        check_acceptance(&self.electrons, &field("electrons"))?;
        check_acceptance(&self.muons, &field("muons"))?;
        if let Some(dressing) = &self.dressing {
            check_acceptance(&dressing.photons, &field("dressing.photons"))?;
            check_positive(dressing.cone, &field("dressing.cone"))?;
        }
        check_positive(self.isolation_cone, &field("isolation_cone"))?;
        if self.n_b_tagged > self.n_jets {
            return Err(AnalysisError::invalid_config(
                field("n_b_tagged"),
                format!(
                    "{} tagged jets cannot be drawn from {} jets",
                    self.n_b_tagged, self.n_jets
                ),
            ));
        }
        if let Some(met) = self.kinematics.met_min {
            check_non_negative(met, &field("kinematics.met_min"))?;
        }
        if let Some(mtw) = self.kinematics.mtw_min {
            check_non_negative(mtw, &field("kinematics.mtw_min"))?;
        }
        Ok(())
    }
}

/// Which verdict fills the fiducial counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiducialSource {
    Detector,
    Particle,
    Both,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    /// The fiducial counter follows the signal-region verdict.
    Gated,
    /// Verdicts are computed and reported but never fill the fiducial counter.
    Dormant,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct YieldConfig {
    pub fiducial_source: FiducialSource,
    pub mode: AccumulationMode,
}

impl Default for YieldConfig {
    fn default() -> Self {
        Self {
            fiducial_source: FiducialSource::Particle,
            mode: AccumulationMode::Gated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detector: LevelConfig,
    pub particle: LevelConfig,
    pub yields: YieldConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detector: LevelConfig::detector(),
            particle: LevelConfig::particle(),
            yields: YieldConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn level(&self, level: Level) -> &LevelConfig {
        match level {
            Level::Detector => &self.detector,
            Level::Particle => &self.particle,
        }
    }

    pub fn from_toml_str(s: &str) -> AnalysisResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.detector.validate(Level::Detector)?;
        self.particle.validate(Level::Particle)
    }
}

fn check_positive(value: f64, field: &str) -> AnalysisResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid_config(field, format!("expected a positive value, got {value}")))
    }
}

fn check_non_negative(value: f64, field: &str) -> AnalysisResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid_config(
            field,
            format!("expected a non-negative value, got {value}"),
        ))
    }
}

fn check_acceptance(acceptance: &Acceptance, field: &str) -> AnalysisResult<()> {
    if acceptance.eta_windows.is_empty() {
        return Err(AnalysisError::invalid_config(field, "no |eta| window given"));
    }
    for window in &acceptance.eta_windows {
        if !(window.min >= 0.0 && window.min < window.max) {
            return Err(AnalysisError::invalid_config(
                field,
                format!("|eta| window [{}, {}) is empty or negative", window.min, window.max),
            ));
        }
    }
    if let Some(pt_min) = acceptance.pt_min {
        check_non_negative(pt_min, &format!("{field}.pt_min"))?;
    }
    Ok(())
}

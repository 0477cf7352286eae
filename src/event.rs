use crate::vectors::FourMomentum;

/// PDG Monte Carlo particle identifiers used by the selection.
pub mod pid {
    pub const ELECTRON: i32 = 11;
    pub const NU_E: i32 = 12;
    pub const MUON: i32 = 13;
    pub const NU_MU: i32 = 14;
    pub const TAU: i32 = 15;
    pub const NU_TAU: i32 = 16;
    pub const PHOTON: i32 = 22;

    pub fn is_neutrino(id: i32) -> bool {
        matches!(id.abs(), NU_E | NU_MU | NU_TAU)
    }

    pub fn is_charged_lepton(id: i32) -> bool {
        matches!(id.abs(), ELECTRON | MUON | TAU)
    }
}

/// A final-state particle. Carries the weight of the event it was read from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub p4: FourMomentum,
    pub pid: i32,
    pub weight: f64,
}

impl Particle {
    pub fn new(pid: i32, p4: FourMomentum, weight: f64) -> Self {
        Self { p4, pid, weight }
    }
    pub fn abs_pid(&self) -> i32 {
        self.pid.abs()
    }
    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }
    pub fn eta(&self) -> f64 {
        self.p4.eta()
    }
    pub fn phi(&self) -> f64 {
        self.p4.phi()
    }
    pub fn delta_r(&self, other: &FourMomentum) -> f64 {
        self.p4.delta_r(other)
    }
}

/// A clustered jet as handed over by the jet finder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Jet {
    pub p4: FourMomentum,
    pub b_tagged: bool,
}

impl Jet {
    pub fn new(p4: FourMomentum, b_tagged: bool) -> Self {
        Self { p4, b_tagged }
    }
}

/// Everything the selection reads from one collision.
///
/// `detector_particles` is the reconstructed final state and `truth_particles` the stable
/// generator-level final state; the selection applies its own acceptance to each. Jets are
/// already clustered per level. `top_leptons` holds the charged leptons (e or μ) coming from
/// leptonically decaying top quarks, which is what the particle level counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub detector_particles: Vec<Particle>,
    pub truth_particles: Vec<Particle>,
    pub detector_jets: Vec<Jet>,
    pub particle_jets: Vec<Jet>,
    pub top_leptons: Vec<Particle>,
    pub missing_momentum: FourMomentum,
    pub weight: f64,
}

impl Event {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            ..Default::default()
        }
    }
}

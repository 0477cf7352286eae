//! Typed object collections built from a raw final state.

use serde::Deserialize;

use crate::event::{pid, Particle};
use crate::vectors::FourMomentum;

/// A half-open `|η|` interval `[min, max)`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct EtaWindow {
    pub min: f64,
    pub max: f64,
}

impl EtaWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    pub fn contains(&self, abs_eta: f64) -> bool {
        abs_eta >= self.min && abs_eta < self.max
    }
}

/// Kinematic acceptance: a particle is accepted if its `|η|` falls in any of the windows and,
/// when a threshold is set, its pT is strictly above it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Acceptance {
    pub eta_windows: Vec<EtaWindow>,
    #[serde(default)]
    pub pt_min: Option<f64>,
}

impl Acceptance {
    /// Electrons outside the barrel/end-cap transition of the calorimeter.
    pub fn detector_electrons() -> Self {
        Self {
            eta_windows: vec![EtaWindow::new(0.0, 1.37), EtaWindow::new(1.52, 2.47)],
            pt_min: None,
        }
    }

    pub fn detector_muons() -> Self {
        Self {
            eta_windows: vec![EtaWindow::new(0.0, 2.5)],
            pt_min: None,
        }
    }

    /// The single fiducial region shared by every particle-level object.
    pub fn particle_level() -> Self {
        Self {
            eta_windows: vec![EtaWindow::new(0.0, 2.5)],
            pt_min: Some(25.0),
        }
    }

    pub fn accepts(&self, p4: &FourMomentum) -> bool {
        if let Some(pt_min) = self.pt_min {
            if p4.pt() <= pt_min {
                return false;
            }
        }
        let abs_eta = p4.abs_eta();
        self.eta_windows.iter().any(|window| window.contains(abs_eta))
    }
}

/// Particles of the given species (either charge) inside `acceptance`, hardest first.
pub fn select_particles(
    particles: &[Particle],
    abs_pid: i32,
    acceptance: &Acceptance,
) -> Vec<Particle> {
    let mut selected: Vec<Particle> = particles
        .iter()
        .filter(|p| p.abs_pid() == abs_pid && acceptance.accepts(&p.p4))
        .copied()
        .collect();
    sort_by_pt(&mut selected);
    selected
}

/// Stable descending-pT sort, so equal-pT particles keep their input order.
pub fn sort_by_pt(particles: &mut [Particle]) {
    particles.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
}

/// Electron and muon candidates of one reconstruction level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leptons {
    pub electrons: Vec<Particle>,
    pub muons: Vec<Particle>,
}

impl Leptons {
    pub fn build(
        particles: &[Particle],
        electron_acceptance: &Acceptance,
        muon_acceptance: &Acceptance,
    ) -> Self {
        Self {
            electrons: select_particles(particles, pid::ELECTRON, electron_acceptance),
            muons: select_particles(particles, pid::MUON, muon_acceptance),
        }
    }

    pub fn len(&self) -> usize {
        self.electrons.len() + self.muons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The lepton an event is characterised by: a lone muon if there is one, the leading
    /// electron otherwise.
    pub fn selected(&self) -> Option<&Particle> {
        if self.muons.len() == 1 {
            return self.muons.first();
        }
        self.electrons.first().or_else(|| self.muons.first())
    }
}

/// Missing four-momentum: the negated vector sum of the visible final state.
pub fn missing_momentum<'a, I>(particles: I) -> FourMomentum
where
    I: IntoIterator<Item = &'a Particle>,
{
    -particles
        .into_iter()
        .filter(|p| !pid::is_neutrino(p.pid))
        .map(|p| p.p4)
        .sum::<FourMomentum>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn particle(id: i32, pt: f64, eta: f64) -> Particle {
        Particle::new(id, FourMomentum::from_pt_eta_phi_m(pt, eta, 0.3, 0.0), 1.0)
    }

    #[test]
    fn test_detector_electrons_skip_crack() {
        let acceptance = Acceptance::detector_electrons();
        let raw = vec![
            particle(pid::ELECTRON, 30.0, 0.5),
            particle(-pid::ELECTRON, 40.0, 1.45),
            particle(pid::ELECTRON, 50.0, -1.8),
            particle(pid::ELECTRON, 60.0, 2.48),
        ];
        let selected = select_particles(&raw, pid::ELECTRON, &acceptance);
        let etas: Vec<f64> = selected.iter().map(|p| p.eta()).collect();
        assert_eq!(selected.len(), 2);
        assert_relative_eq!(etas[0], -1.8, epsilon = 1e-9);
        assert_relative_eq!(etas[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_particle_level_requires_pt_and_species() {
        let acceptance = Acceptance::particle_level();
        let raw = vec![
            particle(pid::MUON, 20.0, 0.1),
            particle(-pid::MUON, 26.0, 2.4),
            particle(pid::ELECTRON, 80.0, 0.1),
            particle(pid::MUON, 90.0, 2.6),
            particle(pid::MUON, 70.0, -1.0),
        ];
        let selected = select_particles(&raw, pid::MUON, &acceptance);
        let pts: Vec<f64> = selected.iter().map(|p| p.pt()).collect();
        assert_eq!(pts.len(), 2);
        assert_relative_eq!(pts[0], 70.0, epsilon = 1e-9);
        assert_relative_eq!(pts[1], 26.0, epsilon = 1e-9);
    }

    #[test]
    fn test_selected_lepton_prefers_lone_muon() {
        let muon = particle(pid::MUON, 30.0, 0.0);
        let electron = particle(pid::ELECTRON, 45.0, 0.0);
        let leptons = Leptons {
            electrons: vec![],
            muons: vec![muon],
        };
        assert_eq!(leptons.selected(), Some(&muon));
        let mixed = Leptons {
            electrons: vec![electron],
            muons: vec![muon],
        };
        assert_eq!(mixed.selected(), Some(&muon));
        let electron_only = Leptons {
            electrons: vec![electron],
            muons: vec![],
        };
        assert_eq!(electron_only.selected(), Some(&electron));
        assert!(Leptons::default().selected().is_none());
    }

    #[test]
    fn test_missing_momentum_balances_visible() {
        let raw = vec![
            particle(pid::MUON, 30.0, 0.2),
            particle(pid::NU_MU, 500.0, 0.0),
            Particle::new(
                21,
                FourMomentum::from_pt_eta_phi_m(30.0, 0.2, 0.3 + std::f64::consts::PI, 0.0),
                1.0,
            ),
            particle(pid::ELECTRON, 10.0, 1.0),
        ];
        let missing = missing_momentum(&raw);
        assert_relative_eq!(missing.pt(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(
            crate::vectors::delta_phi(missing.phi(), 0.3),
            std::f64::consts::PI,
            epsilon = 1e-9
        );
    }
}

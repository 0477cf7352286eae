//! Toy lepton+jets events.
//!
//! Signal events look like semileptonic top pairs (one charged lepton, a neutrino, two b-jets and
//! two light jets, sometimes an extra radiation jet). Background events look like W+jets: light
//! jets, rare b-jets and usually one lepton. Detector-level objects are derived from the
//! generator-level ones through a crude resolution and efficiency model.

use std::f64::consts::PI;

use indicatif::{ProgressBar, ProgressIterator};
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use crate::event::{pid, Event, Jet, Particle};
use crate::objects::missing_momentum;
use crate::vectors::FourMomentum;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventType {
    Signal,
    Background,
}

const PION: i32 = 211;

impl Event {
    const PT_BOUNDS: (f64, f64) = (10.0, 400.0);
    const ETA_MAX: f64 = 2.8;
    const TAU_LEPTON: f64 = 45.0;
    const TAU_JET: f64 = 60.0;
    const TAU_PHOTON: f64 = 20.0;
    const B_MASS: f64 = 4.8;
    const JET_PT_MIN: f64 = 25.0;
    const P_FSR: f64 = 0.35;
    const P_EXTRA_JET: f64 = 0.3;
    const P_BKG_LEPTON: f64 = 0.8;
    const P_BKG_B: f64 = 0.06;
    const JET_RESOLUTION: f64 = 0.12;
    const LEPTON_RESOLUTION: f64 = 0.02;
    const LEPTON_EFFICIENCY: f64 = 0.92;
    const B_TAG_EFFICIENCY: f64 = 0.7;
    const MISTAG_RATE: f64 = 0.01;
    const WEIGHT_BOUNDS: (f64, f64) = (0.8, 1.2);

    pub fn generate<R: Rng>(rng: &mut R, event_type: EventType) -> Self {
        let weight = rng.sample(Uniform::new(Event::WEIGHT_BOUNDS.0, Event::WEIGHT_BOUNDS.1));
        let mut truth_particles = Vec::new();
        let mut top_leptons = Vec::new();

        let has_lepton = match event_type {
            EventType::Signal => true,
            EventType::Background => rng.gen_bool(Event::P_BKG_LEPTON),
        };
        if has_lepton {
            let flavour = if rng.gen_bool(0.5) { pid::ELECTRON } else { pid::MUON };
            let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
            let lepton = Particle::new(
                sign * flavour,
                Event::gen_p4(rng, Event::TAU_LEPTON, 0.0),
                weight,
            );
            let neutrino_phi = lepton.phi() + PI + rng.sample(Uniform::new(-1.0, 1.0));
            let neutrino = Particle::new(
                -sign * (flavour + 1),
                FourMomentum::from_pt_eta_phi_m(
                    Event::gen_pt(rng, Event::TAU_LEPTON),
                    rng.sample(Uniform::new(-Event::ETA_MAX, Event::ETA_MAX)),
                    neutrino_phi,
                    0.0,
                ),
                weight,
            );
            if rng.gen_bool(Event::P_FSR) {
                truth_particles.push(Event::gen_fsr_photon(rng, &lepton));
            }
            if event_type == EventType::Signal {
                top_leptons.push(lepton);
            }
            truth_particles.push(lepton);
            truth_particles.push(neutrino);
        }

        let particle_jets = Event::gen_jets(rng, event_type);
        let detector_jets: Vec<Jet> = particle_jets
            .iter()
            .filter_map(|jet| Event::reconstruct_jet(rng, jet))
            .collect();

        let mut detector_particles: Vec<Particle> = truth_particles
            .iter()
            .filter(|p| !pid::is_neutrino(p.pid))
            .filter_map(|p| Event::reconstruct_particle(rng, p))
            .collect();
        detector_particles.extend(
            detector_jets
                .iter()
                .map(|jet| Particle::new(PION, jet.p4, weight)),
        );
        let missing = missing_momentum(&detector_particles);

        Event {
            detector_particles,
            truth_particles,
            detector_jets,
            particle_jets,
            top_leptons,
            missing_momentum: missing,
            weight,
        }
    }

    fn gen_pt<R: Rng>(rng: &mut R, tau: f64) -> f64 {
        let p_max = f64::exp(-Event::PT_BOUNDS.0 / tau);
        loop {
            let u_pt = Uniform::new(Event::PT_BOUNDS.0, Event::PT_BOUNDS.1);
            let u_p_pt = Uniform::new(0.0, p_max);
            let pt_star = rng.sample(u_pt);
            if f64::exp(-pt_star / tau) >= rng.sample(u_p_pt) {
                return pt_star;
            }
        }
    }

    fn gen_p4<R: Rng>(rng: &mut R, tau: f64, mass: f64) -> FourMomentum {
        let pt = Event::gen_pt(rng, tau);
        let eta = rng.sample(Uniform::new(-Event::ETA_MAX, Event::ETA_MAX));
        let phi = rng.sample(Uniform::new(-PI, PI));
        FourMomentum::from_pt_eta_phi_m(pt, eta, phi, mass)
    }

    fn gen_fsr_photon<R: Rng>(rng: &mut R, lepton: &Particle) -> Particle {
        let dr = rng.sample(Uniform::new(0.0, 0.2));
        let angle = rng.sample(Uniform::new(0.0, 2.0 * PI));
        let pt = Event::gen_pt(rng, Event::TAU_PHOTON);
        Particle::new(
            pid::PHOTON,
            FourMomentum::from_pt_eta_phi_m(
                pt,
                lepton.eta() + dr * angle.cos(),
                lepton.phi() + dr * angle.sin(),
                0.0,
            ),
            lepton.weight,
        )
    }

    fn gen_jets<R: Rng>(rng: &mut R, event_type: EventType) -> Vec<Jet> {
        let flavours: Vec<bool> = match event_type {
            EventType::Signal => {
                let mut flavours = vec![true, true, false, false];
                if rng.gen_bool(Event::P_EXTRA_JET) {
                    flavours.push(false);
                }
                flavours
            }
            EventType::Background => (0..rng.gen_range(2..=5))
                .map(|_| rng.gen_bool(Event::P_BKG_B))
                .collect(),
        };
        let mut jets: Vec<Jet> = flavours
            .into_iter()
            .map(|is_b| {
                let mass = if is_b { Event::B_MASS } else { 0.0 };
                Jet::new(Event::gen_p4(rng, Event::TAU_JET, mass), is_b)
            })
            .filter(|jet| jet.p4.pt() > Event::JET_PT_MIN && jet.p4.abs_eta() < 2.5)
            .collect();
        jets.sort_by(|a, b| b.p4.pt().total_cmp(&a.p4.pt()));
        jets
    }

    /// Gaussian relative smearing factor with width `resolution`, truncated at zero.
    fn smear<R: Rng>(rng: &mut R, resolution: f64) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        (1.0 + resolution * z).max(0.0)
    }

    fn reconstruct_jet<R: Rng>(rng: &mut R, jet: &Jet) -> Option<Jet> {
        let scale = Event::smear(rng, Event::JET_RESOLUTION);
        let p4 = FourMomentum::from_pt_eta_phi_m(
            jet.p4.pt() * scale,
            jet.p4.eta(),
            jet.p4.phi(),
            jet.p4.m() * scale,
        );
        if p4.pt() <= Event::JET_PT_MIN {
            return None;
        }
        let p_tag = if jet.b_tagged {
            Event::B_TAG_EFFICIENCY
        } else {
            Event::MISTAG_RATE
        };
        Some(Jet::new(p4, rng.gen_bool(p_tag)))
    }

    fn reconstruct_particle<R: Rng>(rng: &mut R, particle: &Particle) -> Option<Particle> {
        if pid::is_charged_lepton(particle.pid) && !rng.gen_bool(Event::LEPTON_EFFICIENCY) {
            return None;
        }
        let scale = Event::smear(rng, Event::LEPTON_RESOLUTION);
        let p4 = FourMomentum::from_pt_eta_phi_m(
            particle.pt() * scale,
            particle.eta(),
            particle.phi(),
            particle.p4.m(),
        );
        Some(Particle::new(particle.pid, p4, particle.weight))
    }
}

/// A generated event sample, signal events first.
#[derive(Clone, Debug, Default)]
pub struct Sample {
    pub events: Vec<Event>,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn generate(n_signal: usize, n_background: usize, seed: u64) -> Self {
        Sample::generate_with_progress(n_signal, n_background, seed, ProgressBar::hidden())
    }

    pub fn generate_with_progress(
        n_signal: usize,
        n_background: usize,
        seed: u64,
        bar: ProgressBar,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        bar.set_length((n_signal + n_background) as u64);
        let events = std::iter::repeat(EventType::Signal)
            .take(n_signal)
            .chain(std::iter::repeat(EventType::Background).take(n_background))
            .progress_with(bar)
            .map(|event_type| Event::generate(&mut rng, event_type))
            .collect();
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_smearing_has_unit_mean_and_resolution_width() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| Event::smear(&mut rng, 0.1)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert_abs_diff_eq!(mean, 1.0, epsilon = 0.005);
        assert_abs_diff_eq!(var.sqrt(), 0.1, epsilon = 0.005);
        assert!(draws.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = Sample::generate(50, 50, 7);
        let b = Sample::generate(50, 50, 7);
        assert_eq!(a.len(), 100);
        assert_eq!(a.events, b.events);
        assert_ne!(a.events, Sample::generate(50, 50, 8).events);
    }

    #[test]
    fn test_signal_carries_one_top_lepton() {
        let sample = Sample::generate(200, 200, 3);
        let (signal, background) = sample.events.split_at(200);
        assert!(signal.iter().all(|e| e.top_leptons.len() == 1));
        assert!(background.iter().all(|e| e.top_leptons.is_empty()));
        assert!(signal
            .iter()
            .flat_map(|e| &e.particle_jets)
            .all(|jet| jet.p4.pt() > 25.0));
        assert!(sample.events.iter().all(|e| e.weight > 0.0));
    }
}

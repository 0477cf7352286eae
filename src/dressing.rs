//! Photon dressing of particle-level leptons.

use crate::event::Particle;
use crate::vectors::FourMomentum;

/// A bare lepton with the photons clustered around it added to its momentum.
#[derive(Clone, Debug, PartialEq)]
pub struct DressedLepton {
    pub bare: Particle,
    pub p4: FourMomentum,
    /// Indices into the photon collection that was used for dressing.
    pub photons: Vec<usize>,
}

impl DressedLepton {
    pub fn pid(&self) -> i32 {
        self.bare.pid
    }
    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }
}

/// Index of the lepton closest to `photon` within `cone`, if any. Exact ties resolve to the
/// lower index.
fn nearest_lepton(photon: &FourMomentum, leptons: &[Particle], cone: f64) -> Option<usize> {
    leptons
        .iter()
        .enumerate()
        .map(|(i, lepton)| (i, lepton.delta_r(photon)))
        .filter(|&(_, dr)| dr < cone)
        .fold(None, |best: Option<(usize, f64)>, (i, dr)| match best {
            Some((_, best_dr)) if best_dr <= dr => best,
            _ => Some((i, dr)),
        })
        .map(|(i, _)| i)
}

/// Dress every lepton with the photons inside `cone` (ΔR strictly below it).
///
/// Each photon is given to its nearest lepton only, so the result does not depend on the order
/// in which leptons are dressed and no photon is counted twice. The output is index-aligned
/// with `leptons`.
pub fn dress_leptons(leptons: &[Particle], photons: &[Particle], cone: f64) -> Vec<DressedLepton> {
    let mut dressed: Vec<DressedLepton> = leptons
        .iter()
        .map(|lepton| DressedLepton {
            bare: *lepton,
            p4: lepton.p4,
            photons: Vec::new(),
        })
        .collect();
    for (i_photon, photon) in photons.iter().enumerate() {
        if let Some(i_lepton) = nearest_lepton(&photon.p4, leptons, cone) {
            let target = &mut dressed[i_lepton];
            target.p4 += photon.p4;
            target.photons.push(i_photon);
        }
    }
    dressed
}

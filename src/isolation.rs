use crate::event::Jet;
use crate::vectors::FourMomentum;

/// Outcome of the lepton-jet overlap check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isolation {
    /// `false` if at least one jet sits at ΔR ≤ the cone.
    pub isolated: bool,
    /// Number of jets inside the cone.
    pub overlapping_jets: usize,
    /// ΔR to the closest jet, `None` if there are no jets.
    pub closest_jet: Option<f64>,
}

impl Isolation {
    pub fn evaluate(lepton: &FourMomentum, jets: &[Jet], cone: f64) -> Self {
        let distances = jets.iter().map(|jet| jet.p4.delta_r(lepton));
        let (overlapping_jets, closest_jet) =
            distances.fold((0, None), |(n, closest): (usize, Option<f64>), dr| {
                (
                    n + usize::from(dr <= cone),
                    Some(closest.map_or(dr, |c| c.min(dr))),
                )
            });
        Self {
            isolated: overlapping_jets == 0,
            overlapping_jets,
            closest_jet,
        }
    }
}

use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg};

/// A four-momentum stored in Cartesian components `(E, px, py, pz)`, in GeV.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Build a four-momentum from collider coordinates `(pT, η, φ, m)`.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        Self {
            e: f64::sqrt(p2 + mass * mass),
            px,
            py,
            pz,
        }
    }

    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Pseudorapidity. Momenta along the beam axis map to `±∞`, and a null vector to `0`.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return match self.pz.partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => f64::INFINITY,
                Some(std::cmp::Ordering::Less) => f64::NEG_INFINITY,
                _ => 0.0,
            };
        }
        (self.pz / pt).asinh()
    }

    pub fn abs_eta(&self) -> f64 {
        self.eta().abs()
    }

    /// Azimuthal angle in `(-π, π]`.
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    pub fn m2(&self) -> f64 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass; small negative `m²` from rounding is clamped to zero.
    pub fn m(&self) -> f64 {
        self.m2().max(0.0).sqrt()
    }

    /// Distance in (η, φ) space, with the azimuthal difference wrapped into `[0, π]`.
    pub fn delta_r(&self, other: &FourMomentum) -> f64 {
        let d_eta = self.eta() - other.eta();
        let d_phi = delta_phi(self.phi(), other.phi());
        d_eta.hypot(d_phi)
    }
}

/// Absolute azimuthal separation mapped into `[0, π]`.
pub fn delta_phi(a: f64, b: f64) -> f64 {
    let mut d = (a - b).abs() % (2.0 * PI);
    if d > PI {
        d = 2.0 * PI - d;
    }
    d
}

/// Transverse mass of a visible object recoiling against missing transverse momentum.
pub fn transverse_mass(visible: &FourMomentum, missing: &FourMomentum) -> f64 {
    let met = missing.pt();
    let arg = 2.0 * visible.pt() * met * (1.0 - f64::cos(visible.phi() - missing.phi()));
    arg.max(0.0).sqrt()
}

impl Add for FourMomentum {
    type Output = FourMomentum;
    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: FourMomentum) {
        *self = *self + rhs;
    }
}

impl Neg for FourMomentum {
    type Output = FourMomentum;
    fn neg(self) -> FourMomentum {
        FourMomentum {
            e: -self.e,
            px: -self.px,
            py: -self.py,
            pz: -self.pz,
        }
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = FourMomentum>>(iter: I) -> Self {
        iter.fold(FourMomentum::default(), |acc, p4| acc + p4)
    }
}

impl<'a> Sum<&'a FourMomentum> for FourMomentum {
    fn sum<I: Iterator<Item = &'a FourMomentum>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

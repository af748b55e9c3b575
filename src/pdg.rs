//! # Particle Identity
//!
//! Particle identity codes (PDG numbering), the identity → mass table and the
//! decay-topology tables used to assign identities to the tracks of kink and
//! V0 vertices.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`ParticleId::mass`] | Rest mass in GeV, `None` for codes outside the table |
//! | [`ParticleId::charged_pion`] | π⁺ or π⁻ following the sign of the curvature |
//! | [`kink_daughter`] | Identity of a kink daughter given its parent |
//! | [`v0_daughter`] | Identity of a V0 track given the V0 species |
//!
//! All functions are pure: the same inputs always give the same identity.

use std::fmt;

/// A particle identity code using the PDG numbering scheme.
///
/// # Example
/// ```
/// use track_creator::ParticleId;
///
/// assert_eq!(ParticleId::charged_pion(-0.001), ParticleId::PI_MINUS);
/// assert!(ParticleId::K_PLUS.mass().unwrap() > ParticleId::PI_PLUS.mass().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleId(pub i32);

impl ParticleId {
    pub const PHOTON: ParticleId = ParticleId(22);
    pub const E_MINUS: ParticleId = ParticleId(11);
    pub const E_PLUS: ParticleId = ParticleId(-11);
    pub const MU_MINUS: ParticleId = ParticleId(13);
    pub const MU_PLUS: ParticleId = ParticleId(-13);
    pub const PI_PLUS: ParticleId = ParticleId(211);
    pub const PI_MINUS: ParticleId = ParticleId(-211);
    pub const K_PLUS: ParticleId = ParticleId(321);
    pub const K_MINUS: ParticleId = ParticleId(-321);
    pub const K_SHORT: ParticleId = ParticleId(310);
    pub const K_LONG: ParticleId = ParticleId(130);
    pub const PROTON: ParticleId = ParticleId(2212);
    pub const PROTON_BAR: ParticleId = ParticleId(-2212);
    pub const NEUTRON: ParticleId = ParticleId(2112);
    pub const LAMBDA: ParticleId = ParticleId(3122);
    pub const LAMBDA_BAR: ParticleId = ParticleId(-3122);
    pub const SIGMA_PLUS: ParticleId = ParticleId(3222);
    pub const SIGMA_MINUS: ParticleId = ParticleId(3112);
    /// Ξ⁻
    pub const HYPERON_MINUS: ParticleId = ParticleId(3312);
    /// Ξ̄⁺
    pub const HYPERON_MINUS_BAR: ParticleId = ParticleId(-3312);
    pub const OMEGA_MINUS: ParticleId = ParticleId(3334);
    pub const OMEGA_MINUS_BAR: ParticleId = ParticleId(-3334);

    /// The PDG code.
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Rest mass in GeV, or `None` when the code has no table entry.
    pub fn mass(&self) -> Option<f64> {
        let mass = match self.0.unsigned_abs() {
            22 => 0.0,
            11 => 0.000_510_998_9,
            13 => 0.105_658_4,
            211 => 0.139_570_2,
            321 => 0.493_677,
            310 | 130 => 0.497_614,
            2212 => 0.938_272_1,
            2112 => 0.939_565_4,
            3122 => 1.115_683,
            3222 => 1.189_37,
            3112 => 1.197_449,
            3312 => 1.321_71,
            3334 => 1.672_45,
            _ => return None,
        };
        // The photon and the neutral kaons are their own antiparticles
        if matches!(self.0, -22 | -310 | -130) {
            return None;
        }
        Some(mass)
    }

    /// Default identity of a track: a charged pion whose sign follows the
    /// curvature (π⁻ when the curvature is not positive).
    pub fn charged_pion(omega: f64) -> ParticleId {
        if omega > 0.0 {
            ParticleId::PI_PLUS
        } else {
            ParticleId::PI_MINUS
        }
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for ParticleId {
    fn from(code: i32) -> Self {
        ParticleId(code)
    }
}

/// Identity of a kink daughter track.
///
/// Charged pions and kaons decay to a muon whose sign follows the daughter's
/// measured curvature. Every charged hyperon parent (Σ±, Ξ⁻, Ξ̄⁺) is
/// given a π⁺ daughter regardless of sign. Any other parent yields a charged
/// pion following the daughter's own curvature.
pub fn kink_daughter(parent: ParticleId, daughter_omega: f64) -> ParticleId {
    match parent {
        ParticleId::PI_PLUS | ParticleId::PI_MINUS | ParticleId::K_PLUS | ParticleId::K_MINUS => {
            if daughter_omega > 0.0 {
                ParticleId::MU_PLUS
            } else {
                ParticleId::MU_MINUS
            }
        }
        ParticleId::SIGMA_PLUS
        | ParticleId::HYPERON_MINUS_BAR
        | ParticleId::SIGMA_MINUS
        | ParticleId::HYPERON_MINUS => ParticleId::PI_PLUS,
        _ => ParticleId::charged_pion(daughter_omega),
    }
}

/// Identity of one track of a V0 vertex, from the V0 species and the sign of
/// the track's curvature.
pub fn v0_daughter(vertex: ParticleId, omega: f64) -> ParticleId {
    let positive = omega > 0.0;
    let (plus, minus) = match vertex {
        ParticleId::PHOTON => (ParticleId::E_PLUS, ParticleId::E_MINUS),
        ParticleId::LAMBDA => (ParticleId::PROTON, ParticleId::PI_MINUS),
        ParticleId::LAMBDA_BAR => (ParticleId::PI_PLUS, ParticleId::PROTON_BAR),
        ParticleId::K_SHORT => (ParticleId::PI_PLUS, ParticleId::PI_MINUS),
        _ => (ParticleId::PI_PLUS, ParticleId::PI_MINUS),
    };
    if positive {
        plus
    } else {
        minus
    }
}

//! Particle designators for transported types

// crate modules
use crate::error::Error;

use serde::{Deserialize, Serialize};

/// Particle types tracked by the response-matrix solver
///
/// The particle is set to [Particle::Unknown] by default and can be
/// inferred from the usual identifiers. If the desired behaviour is simply
/// to set any failed conversion to [Particle::Unknown], the `from_str()`
/// and `from_id()` associated functions are implemented for convenience.
///
/// ```rust
/// # use rmx_mesh::Particle;
/// // Failing convenience conversions are set to the Unknown variant
/// assert_eq!(Particle::Unknown, Particle::from_str("invalid string"));
/// assert_eq!(Particle::Unknown, Particle::from_id(56));
/// ```
///
/// Otherwise, [Particle] implements `TryFrom<&str>` and `TryFrom<u8>` so
/// the failing case can be handled explicitly.
///
/// ```rust
/// # use rmx_mesh::Particle;
/// assert_eq!(Particle::Neutron, Particle::try_from("n").unwrap());
/// assert_eq!(Particle::Photon, Particle::try_from(2).unwrap());
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Particle {
    /// Unknown or unspecified particle type
    #[default]
    Unknown = 0,
    /// Neutron
    Neutron = 1,
    /// Photon
    Photon = 2,
}

impl Particle {
    /// Numeric particle designator
    pub const fn id(&self) -> u8 {
        *self as u8
    }

    /// Infer a particle from an id, `Unknown` on failure
    pub fn from_id(id: u8) -> Self {
        Self::try_from(id).unwrap_or(Self::Unknown)
    }

    /// Infer a particle from a name or symbol, `Unknown` on failure
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self::try_from(s).unwrap_or(Self::Unknown)
    }
}

impl TryFrom<u8> for Particle {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Neutron),
            2 => Ok(Self::Photon),
            _ => Err(Error::FailedToInferParticle(id.to_string())),
        }
    }
}

impl TryFrom<&str> for Particle {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().trim() {
            "n" | "neutron" | "1" => Ok(Self::Neutron),
            "p" | "photon" | "gamma" | "2" => Ok(Self::Photon),
            "unknown" | "none" | "0" => Ok(Self::Unknown),
            _ => Err(Error::FailedToInferParticle(s.to_string())),
        }
    }
}

impl std::fmt::Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Neutron => "neutron",
            Self::Photon => "photon",
        };
        write!(f, "{name}")
    }
}

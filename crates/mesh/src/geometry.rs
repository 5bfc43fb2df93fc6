use serde::{Deserialize, Serialize};

/// Mesh geometry types for the (i,j,k) lattice axes
///
/// The generic (I,J,K) axes represent all coordinate systems:
///
/// | Variant       | I axis  | J axis  | K axis    |
/// | ------------- | ------- | ------- | --------- |
/// | `Rectangular` | x       | y       | z         |
/// | `Orthogonal`  | x       | y       | z         |
/// | `Cylindrical` | r       | z       | theta     |
/// | `HexagonalX`  | hex u   | hex v   | axial z   |
/// | `HexagonalY`  | hex u   | hex v   | axial z   |
///
/// `Rectangular` assumes a uniform partition in each axis, while
/// `Orthogonal` allows arbitrary bin boundaries. The hexagonal variants
/// differ only in the physical orientation of the lattice; both use the
/// same parallelogram index convention for adjacency.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Geometry {
    /// Cartesian (xyz) mesh with uniform spacing
    Rectangular,
    /// Cartesian (xyz) mesh with arbitrary bin boundaries
    Orthogonal,
    /// Cylindrical (r,z,t) mesh, theta in revolutions
    Cylindrical,
    /// Hexagonal lattice, flat side facing x, with optional axial layers
    HexagonalX,
    /// Hexagonal lattice, flat side facing y, with optional axial layers
    HexagonalY,
}

impl Geometry {
    /// Full name i.e. 'Rectangular', 'Cylindrical'
    pub fn long_name(&self) -> &str {
        match self {
            Geometry::Rectangular => "Rectangular",
            Geometry::Orthogonal => "Orthogonal",
            Geometry::Cylindrical => "Cylindrical",
            Geometry::HexagonalX => "Hexagonal-X",
            Geometry::HexagonalY => "Hexagonal-Y",
        }
    }

    /// Coordinate system based name i.e. 'XYZ', 'RZT'
    pub fn geometry_name(&self) -> &str {
        match self {
            Geometry::Rectangular | Geometry::Orthogonal => "XYZ",
            Geometry::Cylindrical => "RZT",
            Geometry::HexagonalX | Geometry::HexagonalY => "UVZ",
        }
    }

    /// True for the hexagonal lattice variants
    pub const fn is_hexagonal(&self) -> bool {
        matches!(self, Geometry::HexagonalX | Geometry::HexagonalY)
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.geometry_name())
    }
}

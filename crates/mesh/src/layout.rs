//! Module for mesh layout data and implementations

// crate modules
use crate::error::{Error, Result};
use crate::geometry::Geometry;

/// Discretised geometry described through its bin boundaries
///
/// [MeshLayout] holds the (i,j,k) bin boundaries of the superimposed mesh
/// in the axis convention of [Geometry]. Cells are enumerated in (i,j,k)
/// order with k looping fastest, and the layout provides the conversions
/// between flat cell indices and lattice indices.
///
/// For hexagonal lattices the boundaries are unit-spaced index bounds; the
/// in-plane cell shape is implied by the lattice pitch, which the solver
/// never needs because hexagonal partitions are uniform by construction.
///
/// ```rust
/// # use rmx_mesh::MeshLayout;
/// let layout = MeshLayout::rectangular(
///     vec![0.0, 1.0, 2.0],
///     vec![0.0, 5.0],
///     vec![0.0, 1.0, 2.0, 3.0],
/// ).unwrap();
///
/// assert_eq!(layout.n_cells(), 6);
/// assert_eq!(layout.cell_from_ijk(1, 0, 2), 5);
/// assert_eq!(layout.ijk_from_cell(5), (1, 0, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLayout {
    /// Mesh geometry type
    pub geometry: Geometry,
    /// i mesh boundaries (x, r, or hex u index bounds)
    pub imesh: Vec<f64>,
    /// j mesh boundaries (y, z, or hex v index bounds)
    pub jmesh: Vec<f64>,
    /// k mesh boundaries (z, theta in revolutions, or axial layers)
    pub kmesh: Vec<f64>,
}

impl MeshLayout {
    /// Regular Cartesian mesh from bin boundaries
    pub fn rectangular(imesh: Vec<f64>, jmesh: Vec<f64>, kmesh: Vec<f64>) -> Result<Self> {
        Self::new(Geometry::Rectangular, imesh, jmesh, kmesh)
    }

    /// Non-uniform orthogonal mesh from bin boundaries
    pub fn orthogonal(imesh: Vec<f64>, jmesh: Vec<f64>, kmesh: Vec<f64>) -> Result<Self> {
        Self::new(Geometry::Orthogonal, imesh, jmesh, kmesh)
    }

    /// Cylindrical mesh from radial, axial, and angular bin boundaries
    ///
    /// Angular boundaries are in revolutions, so a full cylinder spans
    /// `0.0` to `1.0` in `kmesh`. Radial boundaries must start at or above
    /// the axis.
    pub fn cylindrical(imesh: Vec<f64>, jmesh: Vec<f64>, kmesh: Vec<f64>) -> Result<Self> {
        if imesh.first().is_some_and(|r0| *r0 < 0.0) {
            return Err(Error::MalformedExtents(
                "radial boundaries must be non-negative".to_string(),
            ));
        }
        if kmesh.first().is_some_and(|t0| *t0 < 0.0) || kmesh.last().is_some_and(|t1| *t1 > 1.0) {
            return Err(Error::MalformedExtents(
                "angular boundaries must be within [0,1] revolutions".to_string(),
            ));
        }
        Self::new(Geometry::Cylindrical, imesh, jmesh, kmesh)
    }

    /// Hexagonal lattice with `iints` x `jints` hexagons and `kints` axial layers
    pub fn hexagonal(geometry: Geometry, iints: usize, jints: usize, kints: usize) -> Result<Self> {
        if !geometry.is_hexagonal() {
            return Err(Error::MalformedExtents(
                "hexagonal layout requires a hexagonal geometry variant".to_string(),
            ));
        }
        let edges = |n: usize| (0..=n).map(|v| v as f64).collect::<Vec<f64>>();
        Self::new(geometry, edges(iints), edges(jints), edges(kints))
    }

    fn new(geometry: Geometry, imesh: Vec<f64>, jmesh: Vec<f64>, kmesh: Vec<f64>) -> Result<Self> {
        for (axis, edges) in [("i", &imesh), ("j", &jmesh), ("k", &kmesh)] {
            if edges.len() < 2 {
                return Err(Error::MalformedExtents(format!(
                    "{axis} axis needs at least two boundaries, found {}",
                    edges.len()
                )));
            }
            if edges.windows(2).any(|pair| pair[1] <= pair[0]) {
                return Err(Error::MalformedExtents(format!(
                    "{axis} axis boundaries must be strictly increasing"
                )));
            }
        }

        Ok(Self {
            geometry,
            imesh,
            jmesh,
            kmesh,
        })
    }

    /// Number of bins in i
    pub fn iints(&self) -> usize {
        self.imesh.len() - 1
    }

    /// Number of bins in j
    pub fn jints(&self) -> usize {
        self.jmesh.len() - 1
    }

    /// Number of bins in k
    pub fn kints(&self) -> usize {
        self.kmesh.len() - 1
    }

    /// Total number of cells in the layout
    pub fn n_cells(&self) -> usize {
        self.iints() * self.jints() * self.kints()
    }

    /// Flat cell index from (i,j,k) lattice indices, k loops fastest
    pub fn cell_from_ijk(&self, i: usize, j: usize, k: usize) -> usize {
        i * (self.jints() * self.kints()) + j * self.kints() + k
    }

    /// The (i,j,k) lattice indices for a flat cell index
    pub fn ijk_from_cell(&self, cell: usize) -> (usize, usize, usize) {
        let jk = self.jints() * self.kints();
        let i = cell / jk;
        let j = (cell - i * jk) / self.kints();
        let k = cell - i * jk - j * self.kints();
        (i, j, k)
    }

    /// Fraction of the total mesh volume occupied by a cell
    ///
    /// Computed analytically from the geometry kind and mesh extents:
    ///
    /// - `Rectangular` and hexagonal lattices are uniform partitions, so
    ///   every cell is `1 / n_cells`.
    /// - `Orthogonal` cells weight by the product of their bin widths.
    /// - `Cylindrical` cells integrate the `(r1^2 - r0^2) dz dt` measure.
    ///
    /// All values are normalised against the outer bounding extents, so the
    /// relative volumes of a layout always sum to one.
    ///
    /// ```rust
    /// # use rmx_mesh::MeshLayout;
    /// // two radial rings of equal width, full circle, single axial bin
    /// let layout = MeshLayout::cylindrical(
    ///     vec![0.0, 1.0, 2.0],
    ///     vec![0.0, 10.0],
    ///     vec![0.0, 1.0],
    /// ).unwrap();
    ///
    /// // the outer ring holds three quarters of the volume
    /// assert_eq!(layout.relative_volume(0), 0.25);
    /// assert_eq!(layout.relative_volume(1), 0.75);
    /// ```
    pub fn relative_volume(&self, cell: usize) -> f64 {
        let (i, j, k) = self.ijk_from_cell(cell);

        match self.geometry {
            Geometry::Rectangular | Geometry::HexagonalX | Geometry::HexagonalY => {
                1.0 / self.n_cells() as f64
            }
            Geometry::Orthogonal => {
                let di = self.imesh[i + 1] - self.imesh[i];
                let dj = self.jmesh[j + 1] - self.jmesh[j];
                let dk = self.kmesh[k + 1] - self.kmesh[k];
                let total = (self.imesh.last().unwrap() - self.imesh[0])
                    * (self.jmesh.last().unwrap() - self.jmesh[0])
                    * (self.kmesh.last().unwrap() - self.kmesh[0]);
                di * dj * dk / total
            }
            Geometry::Cylindrical => {
                let r0 = self.imesh[i];
                let r1 = self.imesh[i + 1];
                let dz = self.jmesh[j + 1] - self.jmesh[j];
                let dt = self.kmesh[k + 1] - self.kmesh[k];
                let r_max = *self.imesh.last().unwrap();
                let r_min = self.imesh[0];
                let total = (r_max * r_max - r_min * r_min)
                    * (self.jmesh.last().unwrap() - self.jmesh[0])
                    * (self.kmesh.last().unwrap() - self.kmesh[0]);
                (r1 * r1 - r0 * r0) * dz * dt / total
            }
        }
    }

    /// Relative volumes for every cell, in cell index order
    pub fn relative_volumes(&self) -> Vec<f64> {
        (0..self.n_cells())
            .map(|cell| self.relative_volume(cell))
            .collect()
    }
}

impl std::fmt::Display for MeshLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} mesh, {}x{}x{} bins ({} cells)",
            self.geometry,
            self.iints(),
            self.jints(),
            self.kints(),
            self.n_cells()
        )
    }
}

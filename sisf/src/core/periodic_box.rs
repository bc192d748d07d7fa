use super::{Pos, Vector3d};
use nalgebra::Matrix3;
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};
use thiserror::Error;

/// Periodic cubic box with edge `L`.
///
/// Only isotropic boxes are supported. Anisotropic or triclinic boxes are
/// rejected at construction, so any existing [CubicBox] is valid for the
/// minimum-image operations below.
///
/// All minimum-image operations share one convention: a component `d` of the
/// raw difference is wrapped once if `|d| > L/2` and kept as is otherwise.
/// Components exactly equal to `±L/2` are never wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBox {
    edge: f64,
    half: f64,
}

#[derive(Error, Debug)]
pub enum BoxError {
    #[error("box edge must be positive and finite, got {0}")]
    InvalidEdge(f64),

    #[error("box dimensions {0} x {1} x {2} are not supported (only isotropic boxes)")]
    NonIsotropic(f64, f64, f64),

    #[error("triclinic boxes are not supported")]
    Triclinic,
}

/// Errors of the vectorized minimum-image operations
#[derive(Error, Debug)]
pub enum GeometryError {
    /// Mismatch in the number of particles between two configurations
    #[error("invalid data sizes: {0} and {1}")]
    Sizes(usize, usize),

    #[error("positions must have 3 columns, got {0}")]
    Columns(usize),
}

impl CubicBox {
    pub fn new(edge: f64) -> Result<Self, BoxError> {
        if !edge.is_finite() || edge <= 0.0 {
            return Err(BoxError::InvalidEdge(edge));
        }
        Ok(Self {
            edge,
            half: 0.5 * edge,
        })
    }

    /// Creates a box from three box vector lengths, which must be equal.
    pub fn from_extents(lx: f64, ly: f64, lz: f64) -> Result<Self, BoxError> {
        if lx != ly || ly != lz {
            return Err(BoxError::NonIsotropic(lx, ly, lz));
        }
        Self::new(lx)
    }

    /// Creates a box from a matrix with box vectors in columns.
    pub fn from_matrix(m: &Matrix3<f64>) -> Result<Self, BoxError> {
        for r in 0..3 {
            for c in 0..3 {
                if r != c && m[(r, c)] != 0.0 {
                    return Err(BoxError::Triclinic);
                }
            }
        }
        Self::from_extents(m[(0, 0)], m[(1, 1)], m[(2, 2)])
    }

    #[inline(always)]
    pub fn edge(&self) -> f64 {
        self.edge
    }

    #[inline(always)]
    pub fn shortest_component(&self, d: f64) -> f64 {
        if d > self.half {
            d - self.edge
        } else if d < -self.half {
            d + self.edge
        } else {
            d
        }
    }

    #[inline(always)]
    pub fn shortest_vector(&self, vec: &Vector3d) -> Vector3d {
        vec.map(|d| self.shortest_component(d))
    }

    /// Minimum-image vector pointing from `p2` to `p1`
    #[inline(always)]
    pub fn displacement(&self, p1: &Pos, p2: &Pos) -> Vector3d {
        self.shortest_vector(&(p1 - p2))
    }

    #[inline(always)]
    pub fn distance_squared(&self, p1: &Pos, p2: &Pos) -> f64 {
        self.displacement(p1, p2).norm_squared()
    }

    #[inline(always)]
    pub fn distance(&self, p1: &Pos, p2: &Pos) -> f64 {
        self.distance_squared(p1, p2).sqrt()
    }

    /// Minimum-image displacements `a - b` for two `[N,3]` position arrays.
    pub fn periodic_displacement(
        &self,
        a: ArrayView2<f64>,
        b: ArrayView2<f64>,
    ) -> Result<Array2<f64>, GeometryError> {
        check_shapes(&a, &b)?;
        Ok(Zip::from(&a)
            .and(&b)
            .map_collect(|&pa, &pb| self.shortest_component(pa - pb)))
    }

    /// Squared minimum-image distances, one per particle.
    pub fn periodic_square_distance(
        &self,
        a: ArrayView2<f64>,
        b: ArrayView2<f64>,
    ) -> Result<Array1<f64>, GeometryError> {
        let delta = self.periodic_displacement(a, b)?;
        Ok(delta.map_axis(Axis(1), |row| row.dot(&row)))
    }

    /// Minimum-image distances, one per particle.
    pub fn periodic_distance(
        &self,
        a: ArrayView2<f64>,
        b: ArrayView2<f64>,
    ) -> Result<Array1<f64>, GeometryError> {
        Ok(self.periodic_square_distance(a, b)?.mapv_into(f64::sqrt))
    }
}

fn check_shapes(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Result<(), GeometryError> {
    if a.ncols() != 3 {
        return Err(GeometryError::Columns(a.ncols()));
    }
    if b.ncols() != 3 {
        return Err(GeometryError::Columns(b.ncols()));
    }
    if a.nrows() != b.nrows() {
        return Err(GeometryError::Sizes(a.nrows(), b.nrows()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn random_like(n: usize, seed: u64, edge: f64) -> Array2<f64> {
        // Simple LCG, enough to spread points over the box
        let mut s = seed;
        Array2::from_shape_fn((n, 3), |_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (s >> 11) as f64 / (1u64 << 53) as f64 * edge
        })
    }

    #[test]
    #[should_panic]
    fn anisotropic_box() {
        let _b = CubicBox::from_extents(10.0, 10.0, 12.0).unwrap();
    }

    #[test]
    fn invalid_edge() {
        assert!(matches!(CubicBox::new(0.0), Err(BoxError::InvalidEdge(_))));
        assert!(matches!(CubicBox::new(-1.0), Err(BoxError::InvalidEdge(_))));
        assert!(matches!(CubicBox::new(f64::NAN), Err(BoxError::InvalidEdge(_))));
    }

    #[test]
    fn triclinic_matrix() {
        let mut m = Matrix3::from_diagonal_element(5.0);
        assert!(CubicBox::from_matrix(&m).is_ok());
        m[(0, 1)] = 1.0;
        assert!(matches!(CubicBox::from_matrix(&m), Err(BoxError::Triclinic)));
    }

    #[test]
    fn wrap_once() -> anyhow::Result<()> {
        let b = CubicBox::new(10.0)?;
        assert_eq!(b.shortest_component(9.0), -1.0);
        assert_eq!(b.shortest_component(-9.0), 1.0);
        assert_eq!(b.shortest_component(4.0), 4.0);
        // Half-box separations are kept in both directions
        assert_eq!(b.shortest_component(5.0), 5.0);
        assert_eq!(b.shortest_component(-5.0), -5.0);
        Ok(())
    }

    #[test]
    fn displacement_in_half_box() -> anyhow::Result<()> {
        let b = CubicBox::new(7.5)?;
        let p1 = random_like(500, 1, 7.5);
        let p2 = random_like(500, 2, 7.5);
        let d = b.periodic_displacement(p1.view(), p2.view())?;
        assert_eq!(d.dim(), (500, 3));
        for v in d.iter() {
            assert!(*v >= -3.75 && *v <= 3.75);
        }
        Ok(())
    }

    #[test]
    fn square_distance_symmetric() -> anyhow::Result<()> {
        let b = CubicBox::new(3.0)?;
        let p1 = random_like(200, 3, 3.0);
        let p2 = random_like(200, 4, 3.0);
        let d12 = b.periodic_square_distance(p1.view(), p2.view())?;
        let d21 = b.periodic_square_distance(p2.view(), p1.view())?;
        assert_eq!(d12, d21);
        Ok(())
    }

    #[test]
    fn self_distance_zero() -> anyhow::Result<()> {
        let b = CubicBox::new(3.0)?;
        let p = random_like(50, 5, 3.0);
        let d = b.periodic_distance(p.view(), p.view())?;
        assert!(d.iter().all(|v| *v == 0.0));
        Ok(())
    }

    #[test]
    fn minimum_image_fixture() -> anyhow::Result<()> {
        let b = CubicBox::new(10.0)?;
        let f0 = array![[0.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let f1 = array![[9.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let d = b.periodic_displacement(f1.view(), f0.view())?;
        assert_eq!(d, array![[-1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let dist = b.periodic_distance(f1.view(), f0.view())?;
        assert_eq!(dist, array![1.0, 0.0]);
        // Matches the scalar point-wise variant
        let v = b.displacement(&Pos::new(9.0, 0.0, 0.0), &Pos::origin());
        assert_eq!(v, Vector3d::new(-1.0, 0.0, 0.0));
        assert_eq!(b.distance(&Pos::new(9.0, 0.0, 0.0), &Pos::origin()), 1.0);
        Ok(())
    }

    #[test]
    fn size_mismatch() -> anyhow::Result<()> {
        let b = CubicBox::new(10.0)?;
        let a = Array2::<f64>::zeros((3, 3));
        let c = Array2::<f64>::zeros((4, 3));
        assert!(matches!(
            b.periodic_displacement(a.view(), c.view()),
            Err(GeometryError::Sizes(3, 4))
        ));
        let w = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            b.periodic_square_distance(a.view(), w.view()),
            Err(GeometryError::Columns(2))
        ));
        Ok(())
    }
}

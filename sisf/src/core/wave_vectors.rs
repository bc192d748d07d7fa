use super::Vector3d;
use itertools::iproduct;
use nalgebra::Vector3;
use ndarray::ArrayView2;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt::Display;

/// Number of wave vectors in a shell: 8 sign combinations x 6 axis permutations
pub const SHELL_SIZE: usize = 48;

/// Largest allowed imaginary part of the unreduced wave-vector sum
pub const IMAG_TOLERANCE: f64 = 1e-6;

const SIGNS: [i64; 2] = [1, -1];

// Which component of the signed triple goes to x, y and z
const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [2, 0, 1],
    [1, 2, 0],
    [0, 2, 1],
    [2, 1, 0],
    [1, 0, 2],
];

/// Magnitudes of the wave vector components in units of `2π/L`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveVectorMagnitudes {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl WaveVectorMagnitudes {
    pub fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }
}

impl Default for WaveVectorMagnitudes {
    fn default() -> Self {
        Self::new(4, 6, 8)
    }
}

impl From<[u32; 3]> for WaveVectorMagnitudes {
    fn from(v: [u32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Display for WaveVectorMagnitudes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.nx, self.ny, self.nz)
    }
}

/// Shell of 48 symmetry-equivalent integer wave vectors.
///
/// The shell contains every sign combination of `(±nx,±ny,±nz)` combined
/// with the 6 assignments of the three components to the x, y and z axes.
/// For a generic triple this is the orbit of the cubic symmetry group.
/// Degenerate triples (zero or repeated components) keep all 48 entries,
/// so some vectors appear several times and the average is still over 48.
///
/// The shell is closed under negation, so the imaginary parts of
/// `exp(i k·d)` cancel in the sum over the shell. [KShell::amplitude]
/// relies on this to detect broken inputs to the summation.
#[derive(Debug, Clone)]
pub struct KShell {
    magnitudes: WaveVectorMagnitudes,
    vectors: [Vector3<i64>; SHELL_SIZE],
}

impl KShell {
    pub fn new(magnitudes: WaveVectorMagnitudes) -> Self {
        let n = [
            magnitudes.nx as i64,
            magnitudes.ny as i64,
            magnitudes.nz as i64,
        ];
        let mut vectors = [Vector3::zeros(); SHELL_SIZE];
        for (v, (sx, sy, sz, perm)) in vectors
            .iter_mut()
            .zip(iproduct!(SIGNS, SIGNS, SIGNS, PERMUTATIONS))
        {
            let signed = [sx * n[0], sy * n[1], sz * n[2]];
            *v = Vector3::new(signed[perm[0]], signed[perm[1]], signed[perm[2]]);
        }
        Self {
            magnitudes,
            vectors,
        }
    }

    pub fn magnitudes(&self) -> WaveVectorMagnitudes {
        self.magnitudes
    }

    pub fn vectors(&self) -> &[Vector3<i64>; SHELL_SIZE] {
        &self.vectors
    }

    /// Wave vectors multiplied by `2π/L`
    pub fn scaled(&self, edge: f64) -> [Vector3d; SHELL_SIZE] {
        let f = 2.0 * PI / edge;
        self.vectors
            .map(|k| Vector3d::new(k.x as f64 * f, k.y as f64 * f, k.z as f64 * f))
    }

    /// Unreduced sum of `exp(i k·d_j)` over all wave vectors of the shell
    /// and all rows `d_j` of the `[N,3]` displacement field.
    pub fn phase_sum(&self, displacements: ArrayView2<f64>, edge: f64) -> Complex64 {
        let kvecs = self.scaled(edge);
        let mut sum = Complex64::new(0.0, 0.0);
        for row in displacements.rows() {
            let d = Vector3d::new(row[0], row[1], row[2]);
            let mut s = Complex64::new(0.0, 0.0);
            for k in kvecs.iter() {
                s += Complex64::cis(k.dot(&d));
            }
            sum += s;
        }
        sum
    }

    /// Orientationally averaged scattering amplitude `Re(sum)/48`,
    /// summed (not averaged) over particles.
    ///
    /// Panics if the imaginary part of the sum exceeds [IMAG_TOLERANCE],
    /// which can only happen for a malformed shell or non-finite input.
    pub fn amplitude(&self, displacements: ArrayView2<f64>, edge: f64) -> f64 {
        let sum = self.phase_sum(displacements, edge);
        assert!(
            sum.im.abs() < IMAG_TOLERANCE,
            "imaginary part of the wave-vector sum is {} for k={}",
            sum.im,
            self.magnitudes
        );
        sum.re / SHELL_SIZE as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use std::collections::HashSet;

    #[test]
    fn shell_layout() {
        let sh = KShell::new(WaveVectorMagnitudes::default());
        let v = sh.vectors();
        assert_eq!(v[0], Vector3::new(4, 6, 8));
        assert_eq!(v[1], Vector3::new(8, 4, 6));
        assert_eq!(v[5], Vector3::new(6, 4, 8));
        // Last sign combination is all negative
        assert_eq!(v[47], Vector3::new(-6, -4, -8));

        let set: HashSet<_> = v.iter().map(|k| (k.x, k.y, k.z)).collect();
        assert_eq!(set.len(), SHELL_SIZE);
        for k in v.iter() {
            assert_eq!(k.dot(k), 16 + 36 + 64);
            assert!(set.contains(&(-k.x, -k.y, -k.z)));
        }
    }

    #[test]
    fn zero_field_gives_particle_count() {
        let sh = KShell::new(WaveVectorMagnitudes::default());
        let d = Array2::<f64>::zeros((17, 3));
        assert_eq!(sh.amplitude(d.view(), 9.3), 17.0);
    }

    #[test]
    fn single_axis_fixture() {
        let sh = KShell::new(WaveVectorMagnitudes::new(1, 0, 0));
        let d = array![[-1.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        // 16 of 48 vectors have |kx|=1, the rest are orthogonal to x
        let expected = (16.0 * (0.2 * PI).cos() + 32.0 + 48.0) / 48.0;
        let val = sh.amplitude(d.view(), 10.0);
        assert!((val - expected).abs() < 1e-12);
    }

    #[test]
    fn imaginary_part_cancels() {
        let sh = KShell::new(WaveVectorMagnitudes::new(3, 5, 7));
        let mut s = 12345_u64;
        let d = Array2::from_shape_fn((1000, 3), |_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((s >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 6.0
        });
        let sum = sh.phase_sum(d.view(), 6.0);
        assert!(sum.im.abs() < IMAG_TOLERANCE);
        let a = sh.amplitude(d.view(), 6.0);
        assert!(a <= 1000.0 && a >= -1000.0);
    }

    #[test]
    #[should_panic]
    fn non_finite_field_is_fatal() {
        let sh = KShell::new(WaveVectorMagnitudes::default());
        let d = array![[f64::NAN, 0.0, 0.0]];
        sh.amplitude(d.view(), 10.0);
    }
}

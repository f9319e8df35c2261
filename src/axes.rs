//! Mounting axis transform.
//!
//! The accelerometer/gyroscope die and the AK8963 use different axis
//! conventions, and boards mount the package in arbitrary orientations. A
//! fixed 3×3 matrix of `-1/0/1` coefficients maps raw accelerometer and
//! gyroscope counts into the body frame before scaling. Magnetometer counts
//! are never remapped.

use micromath::vector::Vector3d;

/// Rows `x`, `y`, `z` of the sign/permutation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisTransform {
  pub x: [i8; 3],
  pub y: [i8; 3],
  pub z: [i8; 3],
}

impl Default for AxisTransform {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl AxisTransform {
  /// Aligns the accelerometer/gyroscope frame with the AK8963 frame:
  /// X => Y, Y => X, Z => -Z.
  pub const DEFAULT: Self = Self::new([0, 1, 0], [1, 0, 0], [0, 0, -1]);

  pub const IDENTITY: Self = Self::new([1, 0, 0], [0, 1, 0], [0, 0, 1]);

  pub const fn new(x: [i8; 3], y: [i8; 3], z: [i8; 3]) -> Self {
    Self { x, y, z }
  }

  /// Remap one raw triple. Works on integer counts; results wrap like the
  /// 16-bit registers they came from.
  pub fn apply(&self, v: Vector3d<i16>) -> Vector3d<i16> {
    let row = |r: &[i8; 3]| (r[0] as i32 * v.x as i32 + r[1] as i32 * v.y as i32 + r[2] as i32 * v.z as i32) as i16;
    Vector3d { x: row(&self.x), y: row(&self.y), z: row(&self.z) }
  }

  /// Transpose. For a signed permutation this is the inverse.
  pub const fn inverse(&self) -> Self {
    Self {
      x: [self.x[0], self.y[0], self.z[0]],
      y: [self.x[1], self.y[1], self.z[1]],
      z: [self.x[2], self.y[2], self.z[2]],
    }
  }

  /// Every row and column holds exactly one `±1`.
  pub fn is_signed_permutation(&self) -> bool {
    let rows = [self.x, self.y, self.z];
    let unit = |c: i8| c == 1 || c == -1;
    let valid = |c: i8| c == 0 || unit(c);
    rows.iter().all(|r| r.iter().all(|&c| valid(c)) && r.iter().filter(|&&c| unit(c)).count() == 1)
      && (0..3).all(|col| rows.iter().filter(|r| unit(r[col])).count() == 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signed_permutations() -> Vec<AxisTransform> {
    const PERMS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut out = Vec::new();
    for p in PERMS {
      for signs in 0..8u8 {
        let mut rows = [[0i8; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
          row[p[i]] = if signs & (1 << i) != 0 { -1 } else { 1 };
        }
        out.push(AxisTransform::new(rows[0], rows[1], rows[2]));
      }
    }
    out
  }

  #[test]
  fn default_mounting() {
    let v = Vector3d { x: 1, y: 2, z: 3 };
    assert_eq!(AxisTransform::DEFAULT.apply(v), Vector3d { x: 2, y: 1, z: -3 });
    assert_eq!(AxisTransform::IDENTITY.apply(v), v);
  }

  #[test]
  fn inverse_restores_counts() {
    let samples = [Vector3d { x: 4096, y: -17, z: 0 }, Vector3d { x: 32767, y: -32767, z: 1 }, Vector3d { x: -1, y: 2, z: -3 }];
    let all = signed_permutations();
    assert_eq!(all.len(), 48);
    for t in all {
      assert!(t.is_signed_permutation());
      for v in samples {
        assert_eq!(t.inverse().apply(t.apply(v)), v);
      }
    }
  }

  #[test]
  fn rejects_non_permutations() {
    assert!(!AxisTransform::new([1, 1, 0], [0, 1, 0], [0, 0, 1]).is_signed_permutation());
    assert!(!AxisTransform::new([1, 0, 0], [1, 0, 0], [0, 0, 1]).is_signed_permutation());
    assert!(!AxisTransform::new([2, 0, 0], [0, 1, 0], [0, 0, 1]).is_signed_permutation());
  }

  #[test]
  fn negating_min_count_wraps() {
    let t = AxisTransform::new([-1, 0, 0], [0, 1, 0], [0, 0, 1]);
    assert_eq!(t.apply(Vector3d { x: i16::MIN, y: 0, z: 0 }).x, i16::MIN);
  }
}

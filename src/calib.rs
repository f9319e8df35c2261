//! Scale factors from counts to physical units.
//!
//! Everything here is a pure function of the selected ranges and the
//! AK8963 fuse-ROM sensitivity bytes. The formulas follow the factory
//! calibration model exactly:
//!
//! - accel: `G * range / 32767.5` m/s² per count
//! - gyro: `range / 32767.5 * π/180` rad/s per count
//! - mag: `((asa - 128) / 256 + 1) * 4912 / 32760` µT per count
//! - temperature: `(counts - 21) / 333.87 + 21` °C

use micromath::vector::Vector3d;

use crate::{AccelRange, GyroRange};

/// Standard gravity, m/s².
pub const G: f32 = 9.80665;
/// Degrees to radians.
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
/// Room-temperature offset of the die sensor, °C.
pub const TEMP_OFFSET: f32 = 21.0;
/// Die sensor sensitivity, counts per °C.
pub const TEMP_SCALE: f32 = 333.87;

/// Accelerometer m/s² per count.
pub fn accel_scale(range: AccelRange) -> f32 {
  G * range.full_scale() / 32767.5
}

/// Gyroscope rad/s per count.
pub fn gyro_scale(range: GyroRange) -> f32 {
  range.full_scale() / 32767.5 * DEG_TO_RAD
}

/// Magnetometer µT per count for one fuse-ROM sensitivity byte.
pub fn mag_scale(asa: u8) -> f32 {
  ((asa as f32 - 128.0) / 256.0 + 1.0) * 4912.0 / 32760.0
}

/// Scale factors held by a configured handle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scales {
  pub accel: f32,
  pub gyro: f32,
  pub mag: [f32; 3],
  pub temp_offset: f32,
  pub temp_scale: f32,
}

impl Scales {
  pub fn new(accel: AccelRange, gyro: GyroRange, asa: [u8; 3]) -> Self {
    Self {
      accel: accel_scale(accel),
      gyro: gyro_scale(gyro),
      mag: [mag_scale(asa[0]), mag_scale(asa[1]), mag_scale(asa[2])],
      temp_offset: TEMP_OFFSET,
      temp_scale: TEMP_SCALE,
    }
  }

  pub fn accel(&self, c: Vector3d<i16>) -> Vector3d<f32> {
    Vector3d { x: c.x as f32 * self.accel, y: c.y as f32 * self.accel, z: c.z as f32 * self.accel }
  }

  pub fn gyro(&self, c: Vector3d<i16>) -> Vector3d<f32> {
    Vector3d { x: c.x as f32 * self.gyro, y: c.y as f32 * self.gyro, z: c.z as f32 * self.gyro }
  }

  pub fn mag(&self, c: Vector3d<i16>) -> Vector3d<f32> {
    Vector3d { x: c.x as f32 * self.mag[0], y: c.y as f32 * self.mag[1], z: c.z as f32 * self.mag[2] }
  }

  pub fn temperature(&self, t: i16) -> f32 {
    (t as f32 - self.temp_offset) / self.temp_scale + self.temp_offset
  }
}

//! Coherent multi-sensor bursts.
//!
//! The MPU-9250 latches every enabled output register on the same internal
//! sample tick. Reading `ACCEL_XOUT_H` onwards in one burst therefore gives
//! accelerometer, temperature, gyroscope and (via the shadow window)
//! magnetometer values that belong to the same sample. Separate reads would
//! straddle ticks.
//!
//! Burst layout from `ACCEL_XOUT_H` (0x3B):
//!
//! | offset | content                         |
//! |--------|---------------------------------|
//! | 0..6   | accel X/Y/Z, big-endian         |
//! | 6..8   | temperature, big-endian         |
//! | 8..14  | gyro X/Y/Z, big-endian          |
//! | 14..20 | mag X/Y/Z, little-endian        |
//! | 20     | mag `ST2`                       |

use embedded_hal_async::delay::DelayNs;
use micromath::vector::{Component, Vector3d};

use super::{defs::*, mag::MagData, Error, Interface, Mpu9250, Ready};

/// Accelerometer and gyroscope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion6<T: Component> {
  pub accel: Vector3d<T>,
  pub gyro: Vector3d<T>,
}

/// Accelerometer, gyroscope and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion7<T: Component> {
  pub accel: Vector3d<T>,
  pub gyro: Vector3d<T>,
  pub temp: T,
}

/// Accelerometer, gyroscope and magnetometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion9<T: Component> {
  pub accel: Vector3d<T>,
  pub gyro: Vector3d<T>,
  pub mag: Vector3d<T>,
}

/// Accelerometer, gyroscope, magnetometer and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion10<T: Component> {
  pub accel: Vector3d<T>,
  pub gyro: Vector3d<T>,
  pub mag: Vector3d<T>,
  pub temp: T,
}

// `Vector3d` has no `defmt::Format`, so these spell out the components.
#[cfg(feature = "defmt")]
impl<T: Component + defmt::Format> defmt::Format for Motion6<T> {
  fn format(&self, f: defmt::Formatter) {
    let (a, g) = (&self.accel, &self.gyro);
    defmt::write!(f, "accel ({}, {}, {}) gyro ({}, {}, {})", a.x, a.y, a.z, g.x, g.y, g.z)
  }
}

#[cfg(feature = "defmt")]
impl<T: Component + defmt::Format> defmt::Format for Motion7<T> {
  fn format(&self, f: defmt::Formatter) {
    let (a, g) = (&self.accel, &self.gyro);
    defmt::write!(f, "accel ({}, {}, {}) gyro ({}, {}, {}) temp {}", a.x, a.y, a.z, g.x, g.y, g.z, self.temp)
  }
}

#[cfg(feature = "defmt")]
impl<T: Component + defmt::Format> defmt::Format for Motion9<T> {
  fn format(&self, f: defmt::Formatter) {
    let (a, g, m) = (&self.accel, &self.gyro, &self.mag);
    defmt::write!(f, "accel ({}, {}, {}) gyro ({}, {}, {}) mag ({}, {}, {})", a.x, a.y, a.z, g.x, g.y, g.z, m.x, m.y, m.z)
  }
}

#[cfg(feature = "defmt")]
impl<T: Component + defmt::Format> defmt::Format for Motion10<T> {
  fn format(&self, f: defmt::Formatter) {
    let (a, g, m) = (&self.accel, &self.gyro, &self.mag);
    defmt::write!(
      f,
      "accel ({}, {}, {}) gyro ({}, {}, {}) mag ({}, {}, {}) temp {}",
      a.x,
      a.y,
      a.z,
      g.x,
      g.y,
      g.z,
      m.x,
      m.y,
      m.z,
      self.temp
    )
  }
}

/// Three big-endian counts.
pub(crate) fn be_triple(b: &[u8]) -> Vector3d<i16> {
  Vector3d {
    x: i16::from_be_bytes([b[0], b[1]]),
    y: i16::from_be_bytes([b[2], b[3]]),
    z: i16::from_be_bytes([b[4], b[5]]),
  }
}

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Burst-read `buf.len()` output registers starting at `start`.
  pub async fn read_axes(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
    self.read_bytes(start, buf).await
  }

  /// Accelerometer and gyroscope counts from one burst.
  pub async fn read_motion6_counts(&mut self) -> Result<Motion6<i16>, Error<E>> {
    let m = self.read_motion7_counts().await?;
    Ok(Motion6 { accel: m.accel, gyro: m.gyro })
  }

  /// Accelerometer, gyroscope and temperature counts from one burst.
  pub async fn read_motion7_counts(&mut self) -> Result<Motion7<i16>, Error<E>> {
    let mut b = [0u8; MOTION_LEN];
    self.read_axes(Reg::AccelXoutH.into(), &mut b).await?;
    Ok(self.decode_motion(&b))
  }

  /// Accelerometer, gyroscope and magnetometer counts from one burst.
  pub async fn read_motion9_counts(&mut self) -> Result<Motion9<i16>, Error<E>> {
    let m = self.read_motion10_counts().await?;
    Ok(Motion9 { accel: m.accel, gyro: m.gyro, mag: m.mag })
  }

  /// Accelerometer, gyroscope, magnetometer and temperature counts from one
  /// burst. The magnetometer triple is zeroed when its `ST2` is not valid.
  pub async fn read_motion10_counts(&mut self) -> Result<Motion10<i16>, Error<E>> {
    let mut b = [0u8; MOTION_MAG_LEN];
    self.read_axes(Reg::AccelXoutH.into(), &mut b).await?;
    let m = self.decode_motion(&b[..MOTION_LEN]);

    let mut mb = [0u8; MAG_DATA_LEN];
    mb.copy_from_slice(&b[MOTION_LEN..]);
    let mag = MagData::try_from(mb).map_err(|_| Error::Data)?.counts();

    Ok(Motion10 { accel: m.accel, gyro: m.gyro, mag, temp: m.temp })
  }

  /// m/s² and rad/s.
  pub async fn read_motion6(&mut self) -> Result<Motion6<f32>, Error<E>> {
    let c = self.read_motion6_counts().await?;
    let s = &self.state.scales;
    Ok(Motion6 { accel: s.accel(c.accel), gyro: s.gyro(c.gyro) })
  }

  /// m/s², rad/s and °C.
  pub async fn read_motion7(&mut self) -> Result<Motion7<f32>, Error<E>> {
    let c = self.read_motion7_counts().await?;
    let s = &self.state.scales;
    Ok(Motion7 { accel: s.accel(c.accel), gyro: s.gyro(c.gyro), temp: s.temperature(c.temp) })
  }

  /// m/s², rad/s and µT.
  pub async fn read_motion9(&mut self) -> Result<Motion9<f32>, Error<E>> {
    let c = self.read_motion9_counts().await?;
    let s = &self.state.scales;
    Ok(Motion9 { accel: s.accel(c.accel), gyro: s.gyro(c.gyro), mag: s.mag(c.mag) })
  }

  /// m/s², rad/s, µT and °C.
  pub async fn read_motion10(&mut self) -> Result<Motion10<f32>, Error<E>> {
    let c = self.read_motion10_counts().await?;
    let s = &self.state.scales;
    Ok(Motion10 { accel: s.accel(c.accel), gyro: s.gyro(c.gyro), mag: s.mag(c.mag), temp: s.temperature(c.temp) })
  }

  fn decode_motion(&self, b: &[u8]) -> Motion7<i16> {
    let axes = &self.state.axes;
    Motion7 {
      accel: axes.apply(be_triple(&b[0..6])),
      gyro: axes.apply(be_triple(&b[8..14])),
      temp: i16::from_be_bytes([b[6], b[7]]),
    }
  }
}

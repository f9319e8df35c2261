//! Accelerometer range and data reading.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: mpu9250::Mpu9250<B, D, mpu9250::Ready>) -> Result<(), mpu9250::Error<B::Error>> {
//! // Counts after the mounting transform
//! let raw = imu.read_accel_counts().await?;
//! // m/s²
//! let accel = imu.read_accel().await?;
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;
use micromath::vector::Vector3d;

use super::{defs::*, motion::be_triple, Error, Interface, Mpu9250, Ready};

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Read accelerometer counts, remapped through the axis transform.
  pub async fn read_accel_counts(&mut self) -> Result<Vector3d<i16>, Error<E>> {
    let mut b = [0u8; 6];
    self.read_axes(Reg::AccelXoutH.into(), &mut b).await?;
    Ok(self.state.axes.apply(be_triple(&b)))
  }

  /// Read acceleration in m/s².
  pub async fn read_accel(&mut self) -> Result<Vector3d<f32>, Error<E>> {
    let c = self.read_accel_counts().await?;
    Ok(self.state.scales.accel(c))
  }
}

/// Accelerometer full-scale range (`ACCEL_CONFIG.ACCEL_FS_SEL`).
///
/// Higher ranges measure stronger accelerations at coarser resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
  /// ±2g range
  #[default]
  G2 = 0,
  /// ±4g range
  G4 = 1,
  /// ±8g range
  G8 = 2,
  /// ±16g range
  G16 = 3,
}

static ACCEL_FS_SEL: [u8; 4] = [0x00, 0x08, 0x10, 0x18];
static ACCEL_FS_G: [f32; 4] = [2.0, 4.0, 8.0, 16.0];

impl AccelRange {
  pub const ALL: [AccelRange; 4] = [AccelRange::G2, AccelRange::G4, AccelRange::G8, AccelRange::G16];

  /// `ACCEL_CONFIG` value selecting this range.
  pub fn register_value(self) -> u8 {
    ACCEL_FS_SEL[self as usize]
  }

  /// Full scale in g.
  pub fn full_scale(self) -> f32 {
    ACCEL_FS_G[self as usize]
  }
}

impl From<AccelRange> for u8 {
  fn from(value: AccelRange) -> Self {
    value.register_value()
  }
}

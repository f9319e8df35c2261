//! Gyroscope range and data reading.

use embedded_hal_async::delay::DelayNs;
use micromath::vector::Vector3d;

use super::{defs::*, motion::be_triple, Error, Interface, Mpu9250, Ready};

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Read gyroscope counts, remapped through the axis transform.
  pub async fn read_gyro_counts(&mut self) -> Result<Vector3d<i16>, Error<E>> {
    let mut b = [0u8; 6];
    self.read_axes(Reg::GyroXoutH.into(), &mut b).await?;
    Ok(self.state.axes.apply(be_triple(&b)))
  }

  /// Read angular rate in rad/s.
  pub async fn read_gyro(&mut self) -> Result<Vector3d<f32>, Error<E>> {
    let c = self.read_gyro_counts().await?;
    Ok(self.state.scales.gyro(c))
  }
}

/// Gyroscope full-scale range (`GYRO_CONFIG.GYRO_FS_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
  /// ±250°/s
  #[default]
  Dps250 = 0,
  /// ±500°/s
  Dps500 = 1,
  /// ±1000°/s
  Dps1000 = 2,
  /// ±2000°/s
  Dps2000 = 3,
}

static GYRO_FS_SEL: [u8; 4] = [0x00, 0x08, 0x10, 0x18];
static GYRO_FS_DPS: [f32; 4] = [250.0, 500.0, 1000.0, 2000.0];

impl GyroRange {
  pub const ALL: [GyroRange; 4] = [GyroRange::Dps250, GyroRange::Dps500, GyroRange::Dps1000, GyroRange::Dps2000];

  /// `GYRO_CONFIG` value selecting this range.
  pub fn register_value(self) -> u8 {
    GYRO_FS_SEL[self as usize]
  }

  /// Full scale in °/s.
  pub fn full_scale(self) -> f32 {
    GYRO_FS_DPS[self as usize]
  }
}

impl From<GyroRange> for u8 {
  fn from(value: GyroRange) -> Self {
    value.register_value()
  }
}

//! AK8963 magnetometer modes, fuse ROM and data reading.
//!
//! Once configured, the auxiliary master copies the seven bytes
//! `HXL..ST2` into `EXT_SENS_DATA_00..06` on every sample tick, so magnetic
//! field reads are plain main-die bursts. The AK8963 stores its counts
//! little-endian, unlike the rest of the MPU-9250.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: mpu9250::Mpu9250<B, D, mpu9250::Ready>) -> Result<(), mpu9250::Error<B::Error>> {
//! // µT; all zero when the sample overflowed
//! let field = imu.read_mag().await?;
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;
use micromath::vector::Vector3d;

use super::{defs::*, Error, Interface, Mpu9250, Ready};

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Read magnetometer counts from the shadow window.
  ///
  /// Returns `(0, 0, 0)` unless the accompanying `ST2` byte marks the sample
  /// as valid 16-bit data.
  pub async fn read_mag_counts(&mut self) -> Result<Vector3d<i16>, Error<E>> {
    let mut b = [0u8; MAG_DATA_LEN];
    self.read_axes(Reg::ExtSensData00.into(), &mut b).await?;
    MagData::try_from(b).map(|d| d.counts()).map_err(|_| Error::Data)
  }

  /// Read magnetic field in µT, adjusted by the fuse-ROM sensitivity.
  pub async fn read_mag(&mut self) -> Result<Vector3d<f32>, Error<E>> {
    let c = self.read_mag_counts().await?;
    Ok(self.state.scales.mag(c))
  }
}

impl<B, D, S, E> Mpu9250<B, D, S>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Write `CNTL1` and hold off for the mode-switch interval. The AK8963
  /// ignores a mode write issued too soon after the previous one.
  pub(crate) async fn set_mag_mode(&mut self, ctrl: MagControl) -> Result<(), Error<E>> {
    let [b]: [u8; 1] = ctrl.try_into().map_err(|_| Error::Data)?;
    debug!("AK8963 CNTL1 <- {=u8:#x}", b);
    self.write_mag(MagReg::Cntl1, b).await?;
    self.delay.delay_ms(MAG_MODE_SWITCH_MS).await;
    Ok(())
  }

  /// Read the three sensitivity adjustment bytes. The AK8963 must be in
  /// fuse-ROM access mode.
  pub(crate) async fn read_mag_sensitivity(&mut self) -> Result<[u8; 3], Error<E>> {
    let mut asa = [0u8; 3];
    self.read_mag_registers(MagReg::Asax, &mut asa).await?;
    Ok(asa)
  }

  /// Have slave 0 fetch `HXL..ST2` into the shadow window at the sample rate.
  pub(crate) async fn prime_mag_shadow(&mut self) -> Result<(), Error<E>> {
    let mut b = [0u8; MAG_DATA_LEN];
    self.read_mag_registers(MagReg::Hxl, &mut b).await
  }
}

/// AK8963 operating mode (`CNTL1.MODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
  PowerDown = 0x0,
  Single = 0x1,
  /// Continuous measurement mode 1
  Continuous8Hz = 0x2,
  /// Continuous measurement mode 2
  Continuous100Hz = 0x6,
  ExternalTrigger = 0x4,
  SelfTest = 0x8,
  FuseRom = 0xF,
}

impl From<MagMode> for u8 {
  fn from(value: MagMode) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for MagMode {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x0 => Ok(MagMode::PowerDown),
      0x1 => Ok(MagMode::Single),
      0x2 => Ok(MagMode::Continuous8Hz),
      0x4 => Ok(MagMode::ExternalTrigger),
      0x6 => Ok(MagMode::Continuous100Hz),
      0x8 => Ok(MagMode::SelfTest),
      0xF => Ok(MagMode::FuseRom),
      _ => Err(()),
    }
  }
}

/// AK8963 output resolution (`CNTL1.BIT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagOutput {
  /// 0.6 µT/LSB
  Bits14 = 0,
  /// 0.15 µT/LSB
  Bits16 = 1,
}

impl From<MagOutput> for u8 {
  fn from(value: MagOutput) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for MagOutput {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(MagOutput::Bits14),
      1 => Ok(MagOutput::Bits16),
      _ => Err(()),
    }
  }
}

/// AK8963 `CNTL1` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
pub struct MagControl {
  #[bits(4)]
  pub mode: MagMode,
  #[bits(1)]
  pub output: MagOutput,
}

impl MagControl {
  pub const POWER_DOWN: Self = Self { mode: MagMode::PowerDown, output: MagOutput::Bits14 };
  pub const FUSE_ROM: Self = Self { mode: MagMode::FuseRom, output: MagOutput::Bits14 };
  pub const CONTINUOUS_8HZ: Self = Self { mode: MagMode::Continuous8Hz, output: MagOutput::Bits16 };
  pub const CONTINUOUS_100HZ: Self = Self { mode: MagMode::Continuous100Hz, output: MagOutput::Bits16 };

  /// Continuous 16-bit mode whose update rate does not exceed the host rate
  /// set by `divider`.
  pub fn continuous_for_divider(divider: u8) -> Self {
    if divider > MAG_SLOW_DIVIDER {
      Self::CONTINUOUS_8HZ
    } else {
      Self::CONTINUOUS_100HZ
    }
  }
}

/// `HXL..ST2` as mirrored into `EXT_SENS_DATA_00..06`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 7)]
pub struct MagData {
  #[bits(16)]
  pub x: u16,
  #[bits(16)]
  pub y: u16,
  #[bits(16)]
  pub z: u16,
  /// `ST2`
  #[bits(8)]
  pub status: u8,
}

impl MagData {
  /// `ST2` equals the valid-data marker (16-bit output, no overflow).
  ///
  /// Only that exact value is accepted; any other status, including a set
  /// overflow bit, marks the sample invalid.
  pub fn is_valid(&self) -> bool {
    self.status == AK8963_DATA_VALID
  }

  /// Counts, or zeros for an invalid sample.
  pub fn counts(&self) -> Vector3d<i16> {
    if self.is_valid() {
      Vector3d { x: self.x as i16, y: self.y as i16, z: self.z as i16 }
    } else {
      Vector3d { x: 0, y: 0, z: 0 }
    }
  }
}

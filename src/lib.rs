#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]
//!
//! ## Design Principles
//!
//! - **Typed state**: sample readers only exist on a configured handle
//! - **Async-first**: Built on `embedded-hal-async` I2C/SPI traits
//! - **Write-then-verify**: every configuration write is read back
//! - **Exact scaling**: unit conversion matches the factory calibration model
//!
//! ## Module Organization
//!
//! - [`interface`]: SPI and I2C register transports
//! - [`config`]: Initialization sequence
//! - [`accel`]: Accelerometer range and data reading
//! - [`gyro`]: Gyroscope range and data reading
//! - [`mag`]: AK8963 modes, fuse ROM and data reading
//! - [`filter`]: Digital low-pass filter and sample-rate divider
//! - [`interrupt`]: Data-ready interrupt pin
//! - [`calib`]: Scale factors
//! - [`axes`]: Mounting axis transform
//! - [`motion`]: Coherent multi-sensor bursts

#[macro_use]
mod fmt;

pub mod accel;
pub mod axes;
pub mod calib;
pub mod config;
mod defs;
pub mod filter;
pub mod gyro;
pub mod interface;
pub mod interrupt;
pub mod mag;
pub mod motion;
mod passthrough;
pub(crate) mod rw;
#[cfg(test)]
mod sim;

use embedded_hal_async::delay::DelayNs;

pub use accel::AccelRange;
pub use axes::AxisTransform;
pub use calib::Scales;
pub use config::Config;
use defs::*;
pub use filter::Bandwidth;
pub use gyro::GyroRange;
pub use interface::Interface;
pub use motion::*;

/// Driver error type.
///
/// Wraps the transport error and adds the MPU-9250 protocol failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// Transport error
  Bus(E),
  /// A configuration write did not read back the value written
  WriteVerification { die: Die, reg: u8, wrote: u8, read: u8 },
  /// Identity register mismatch (expected `0x71` for the MPU-9250, `0x48` for the AK8963)
  IdentityMismatch { die: Die, found: u8 },
  /// Malformed register image or burst length
  Data,
}

/// Which die a register belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Die {
  /// Accelerometer/gyroscope die, addressed directly
  Mpu,
  /// AK8963, addressed through the auxiliary master
  Magnetometer,
}

/// Handle state before [`Mpu9250::init`] succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unconfigured;

/// Handle state after a complete initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ready {
  pub(crate) scales: Scales,
  pub(crate) accel_range: AccelRange,
  pub(crate) gyro_range: GyroRange,
  pub(crate) axes: AxisTransform,
  pub(crate) divider: u8,
}

/// MPU-9250 device driver instance.
///
/// Owns the register transport and the delay provider. The state parameter
/// tracks whether the configuration sequence has completed; sample readers
/// are only available on `Mpu9250<B, D, Ready>`.
///
/// # Type Parameters
///
/// - `B`: register transport (see [`Interface`])
/// - `D`: Delay provider (must implement `embedded_hal_async::delay::DelayNs`)
/// - `S`: [`Unconfigured`] or [`Ready`]
///
/// # Examples
///
/// ```no_run
/// # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(bus: B, delay: D) -> Result<(), mpu9250::Error<B::Error>> {
/// use mpu9250::{AccelRange, GyroRange, Mpu9250};
///
/// let imu = Mpu9250::new(bus, delay);
/// let mut imu = imu.init(AccelRange::G4, GyroRange::Dps500).await?;
/// let accel = imu.read_accel().await?;
/// # Ok(())
/// # }
/// ```
pub struct Mpu9250<B, D, S = Unconfigured> {
  bus: B,
  delay: D,
  state: S,
}

/// A failed initialization.
///
/// Carries the unconfigured handle back so the sequence can be run again
/// from scratch, or the bus released.
pub struct Faulted<B: Interface, D> {
  pub imu: Mpu9250<B, D, Unconfigured>,
  pub error: Error<B::Error>,
}

impl<B: Interface, D> Faulted<B, D> {
  pub fn into_inner(self) -> (Mpu9250<B, D, Unconfigured>, Error<B::Error>) {
    (self.imu, self.error)
  }
}

impl<B: Interface, D> core::fmt::Debug for Faulted<B, D>
where
  B::Error: core::fmt::Debug,
{
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Faulted").field("error", &self.error).finish_non_exhaustive()
  }
}

impl<B: Interface, D> From<Faulted<B, D>> for Error<B::Error> {
  fn from(f: Faulted<B, D>) -> Self {
    f.error
  }
}

// Constructor
impl<B, D> Mpu9250<B, D, Unconfigured>
where
  B: Interface,
  D: DelayNs,
{
  /// Create a new, unconfigured driver instance.
  ///
  /// No bus traffic happens until [`init`](Self::init).
  pub fn new(bus: B, delay: D) -> Self {
    Self { bus, delay, state: Unconfigured }
  }
}

// Common functionality (any state)
impl<B, D, S, E> Mpu9250<B, D, S>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Read the MPU-9250 `WHO_AM_I` register (`0x71` expected).
  pub async fn who_am_i(&mut self) -> Result<u8, Error<E>> {
    self.read_u8(Reg::WhoAmI).await
  }

  /// Read the AK8963 `WIA` register through the auxiliary master (`0x48` expected).
  ///
  /// The auxiliary master must be enabled, which is the case on a
  /// [`Ready`] handle.
  pub async fn mag_who_am_i(&mut self) -> Result<u8, Error<E>> {
    let mut b = [0u8; 1];
    self.read_mag_registers(MagReg::Wia, &mut b).await?;
    Ok(b[0])
  }

  /// Give back the transport and delay provider.
  pub fn release(self) -> (B, D) {
    (self.bus, self.delay)
  }
}

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Scale factors derived during initialization.
  pub fn scales(&self) -> &Scales {
    &self.state.scales
  }

  pub fn accel_range(&self) -> AccelRange {
    self.state.accel_range
  }

  pub fn gyro_range(&self) -> GyroRange {
    self.state.gyro_range
  }

  pub fn axes(&self) -> &AxisTransform {
    &self.state.axes
  }

  // -----------------
  // Misc. data reads
  // -----------------
  /// Read raw temperature counts (big-endian `TEMP_OUT`).
  pub async fn read_temperature_counts(&mut self) -> Result<i16, Error<E>> {
    let mut b = [0u8; 2];
    self.read_axes(Reg::TempOutH.into(), &mut b).await?;
    Ok(i16::from_be_bytes(b))
  }

  /// Read die temperature in °C.
  pub async fn read_temperature(&mut self) -> Result<f32, Error<E>> {
    let t = self.read_temperature_counts().await?;
    Ok(self.state.scales.temperature(t))
  }
}

//! Data-ready interrupt pin.
//!
//! The INT pin is configured as an active-high, push-pull, 50 µs pulse on
//! every new sample.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: mpu9250::Mpu9250<B, D, mpu9250::Ready>) -> Result<(), mpu9250::Error<B::Error>> {
//! // Stop pulsing while the host is busy, pin setup is kept
//! imu.set_interrupt(false).await?;
//! imu.set_interrupt(true).await?;
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;

use super::{defs::*, Error, Interface, Mpu9250, Ready};

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Enable or disable data-ready interrupt generation.
  ///
  /// Enabling also (re)writes the pin configuration. Disabling only clears
  /// `INT_ENABLE`.
  pub async fn set_interrupt(&mut self, enable: bool) -> Result<(), Error<E>> {
    if enable {
      self.write_reg(Reg::IntPinCfg, IntPinConfig::default()).await?;
      self.write_reg(Reg::IntEnable, IntFlags { raw_data_ready: true, ..Default::default() }).await
    } else {
      self.write_verified(Reg::IntEnable, INT_DISABLE).await
    }
  }

  /// Read `INT_STATUS`. Reading clears the pending flags.
  pub async fn get_int_status(&mut self) -> Result<IntFlags, Error<E>> {
    self.read(Reg::IntStatus).await
  }
}

/// `INT_PIN_CFG`. The default is an active-high, push-pull, 50 µs pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
pub struct IntPinConfig {
  #[skip(1)]
  pub bypass_en: bool,
  pub fsync_int_mode_en: bool,
  pub actl_fsync: bool,
  /// Any read clears the status, not only `INT_STATUS` reads
  pub int_anyrd_2clear: bool,
  /// Hold the pin until cleared instead of a 50 µs pulse
  pub latch_int_en: bool,
  pub open_drain: bool,
  pub active_low: bool,
}

/// Interrupt sources. `INT_ENABLE` and `INT_STATUS` share this layout: a set
/// bit enables the source in the former and reports it pending in the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
pub struct IntFlags {
  pub raw_data_ready: bool,
  #[skip(2)]
  pub fsync: bool,
  pub fifo_overflow: bool,
  #[skip(1)]
  pub wake_on_motion: bool,
}

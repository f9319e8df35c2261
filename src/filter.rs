//! Digital low-pass filter and output data rate.
//!
//! Output rate is `1 kHz / (1 + divider)`. The AK8963 must not update faster
//! than the host samples, so dividers above 9 (below 100 Hz) move it to its
//! 8 Hz continuous mode.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(mut imu: mpu9250::Mpu9250<B, D, mpu9250::Ready>) -> Result<(), mpu9250::Error<B::Error>> {
//! use mpu9250::Bandwidth;
//!
//! // 41 Hz bandwidth, 50 Hz output, data-ready interrupt on
//! imu.configure_filter(Bandwidth::Hz41, 19).await?;
//! assert_eq!(imu.sample_rate_hz(), 50.0);
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;

use super::{defs::*, mag::MagControl, Error, Interface, Mpu9250, Ready};

impl<B, D, E> Mpu9250<B, D, Ready>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Set DLPF bandwidth and sample-rate divider, then arm the data-ready
  /// interrupt.
  ///
  /// A divider above 9 reruns the AK8963 power-down -> 8 Hz continuous
  /// transition with the mode-switch delays.
  pub async fn configure_filter(&mut self, bandwidth: Bandwidth, divider: u8) -> Result<(), Error<E>> {
    let (accel, gyro) = bandwidth.register_values();
    self.write_verified(Reg::AccelConfig2, accel).await?;
    self.write_verified(Reg::Config, gyro).await?;

    self.write_verified(Reg::SmplrtDiv, divider).await?;
    self.state.divider = divider;

    if divider > MAG_SLOW_DIVIDER {
      debug!("divider {=u8} > {=u8}, AK8963 to 8 Hz", divider, MAG_SLOW_DIVIDER);
      self.set_mag_mode(MagControl::POWER_DOWN).await?;
      self.set_mag_mode(MagControl::CONTINUOUS_8HZ).await?;
      self.prime_mag_shadow().await?;
    }

    self.set_interrupt(true).await
  }

  /// Divider last written by [`configure_filter`](Self::configure_filter).
  pub fn sample_rate_divider(&self) -> u8 {
    self.state.divider
  }

  /// Output data rate in Hz.
  pub fn sample_rate_hz(&self) -> f32 {
    1000.0 / (1.0 + self.state.divider as f32)
  }
}

/// DLPF bandwidth, applied to both accelerometer and gyroscope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
  #[default]
  Hz184 = 0,
  Hz92 = 1,
  Hz41 = 2,
  Hz20 = 3,
  Hz10 = 4,
  Hz5 = 5,
}

/// (`ACCEL_CONFIG2`, `CONFIG`) per bandwidth.
static DLPF_CFG: [(u8, u8); 6] = [(0x01, 0x01), (0x02, 0x02), (0x03, 0x03), (0x04, 0x04), (0x05, 0x05), (0x06, 0x06)];

impl Bandwidth {
  pub const ALL: [Bandwidth; 6] = [Bandwidth::Hz184, Bandwidth::Hz92, Bandwidth::Hz41, Bandwidth::Hz20, Bandwidth::Hz10, Bandwidth::Hz5];

  /// `(ACCEL_CONFIG2, CONFIG)` register values.
  pub fn register_values(self) -> (u8, u8) {
    DLPF_CFG[self as usize]
  }
}

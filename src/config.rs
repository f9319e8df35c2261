//! Initialization sequence.
//!
//! [`Mpu9250::init`] walks the device from power-on to a configured state:
//!
//! 1. select the PLL clock, enable the auxiliary master at 400 kHz, power
//!    the AK8963 down
//! 2. reset the MPU-9250 (100 ms restart), best-effort AK8963 reset
//! 3. reselect the PLL clock, check `WHO_AM_I`
//! 4. enable accelerometer and gyroscope, apply full-scale ranges
//! 5. re-arm the auxiliary master, check the AK8963 `WIA`
//! 6. AK8963 calibration: power-down, fuse ROM, read `ASA`, power-down,
//!    continuous 16-bit mode, 100 ms between every mode write
//! 7. reselect the PLL clock, point slave 0 at `HXL..ST2`
//!
//! Every step except the two resets is write-then-verify and the first
//! failure aborts the sequence. There is no retry; the caller gets the
//! unconfigured handle back in [`Faulted`] and may run `init` again.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<B: mpu9250::Interface, D: embedded_hal_async::delay::DelayNs>(bus: B, delay: D) -> Result<(), mpu9250::Error<B::Error>> {
//! use mpu9250::{AccelRange, AxisTransform, Config, GyroRange, Mpu9250};
//!
//! let config = Config { accel_range: AccelRange::G8, gyro_range: GyroRange::Dps1000, axes: AxisTransform::IDENTITY };
//! let imu = Mpu9250::new(bus, delay).init_with(config).await?;
//! # Ok(())
//! # }
//! ```

use embedded_hal_async::delay::DelayNs;

use super::{
  defs::*, mag::MagControl, AccelRange, AxisTransform, Die, Error, Faulted, GyroRange, Interface, Mpu9250, Ready, Scales,
  Unconfigured,
};

/// Initialization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  pub accel_range: AccelRange,
  pub gyro_range: GyroRange,
  /// Mounting transform applied to accelerometer and gyroscope counts
  pub axes: AxisTransform,
}

impl<B, D, E> Mpu9250<B, D, Unconfigured>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Run the full initialization sequence with the board's default axis
  /// transform.
  pub async fn init(self, accel_range: AccelRange, gyro_range: GyroRange) -> Result<Mpu9250<B, D, Ready>, Faulted<B, D>> {
    self.init_with(Config { accel_range, gyro_range, ..Config::default() }).await
  }

  /// Run the full initialization sequence.
  pub async fn init_with(mut self, config: Config) -> Result<Mpu9250<B, D, Ready>, Faulted<B, D>> {
    match self.configure(&config).await {
      Ok(asa) => {
        let scales = Scales::new(config.accel_range, config.gyro_range, asa);
        info!("MPU-9250 ready, ASA {}", asa);
        Ok(Mpu9250 {
          bus: self.bus,
          delay: self.delay,
          state: Ready {
            scales,
            accel_range: config.accel_range,
            gyro_range: config.gyro_range,
            axes: config.axes,
            divider: 0,
          },
        })
      }
      Err(error) => {
        warn!("MPU-9250 initialization failed");
        Err(Faulted { imu: self, error })
      }
    }
  }

  async fn configure(&mut self, config: &Config) -> Result<[u8; 3], Error<E>> {
    self.select_pll().await?;
    self.enable_aux_master().await?;
    let [pd]: [u8; 1] = MagControl::POWER_DOWN.try_into().map_err(|_| Error::Data)?;
    self.write_mag(MagReg::Cntl1, pd).await?;
    debug!("clock selected, aux master enabled");

    self.write_u8(Reg::PwrMgmt1, PWR_RESET).await?;
    self.delay.delay_ms(RESET_DELAY_MS).await;
    // Best-effort: not readable back right away, and the reset above may have
    // stopped the auxiliary master
    if self.write_mag_unverified(MagReg::Cntl2, AK8963_RESET).await.is_err() {
      warn!("AK8963 reset not sent, continuing");
    }
    debug!("reset");

    self.select_pll().await?;

    let id = self.who_am_i().await?;
    if id != MPU9250_WHO_AM_I {
      warn!("WHO_AM_I {=u8:#x}, expected {=u8:#x}", id, MPU9250_WHO_AM_I);
      return Err(Error::IdentityMismatch { die: Die::Mpu, found: id });
    }

    self.write_verified(Reg::PwrMgmt2, SEN_ENABLE).await?;
    self.write_verified(Reg::AccelConfig, config.accel_range.register_value()).await?;
    self.write_verified(Reg::GyroConfig, config.gyro_range.register_value()).await?;
    debug!("ranges configured");

    self.enable_aux_master().await?;
    let id = self.mag_who_am_i().await?;
    if id != AK8963_WIA {
      warn!("AK8963 WIA {=u8:#x}, expected {=u8:#x}", id, AK8963_WIA);
      return Err(Error::IdentityMismatch { die: Die::Magnetometer, found: id });
    }
    debug!("AK8963 found");

    self.set_mag_mode(MagControl::POWER_DOWN).await?;
    self.set_mag_mode(MagControl::FUSE_ROM).await?;
    let asa = self.read_mag_sensitivity().await?;
    self.set_mag_mode(MagControl::POWER_DOWN).await?;
    self.set_mag_mode(MagControl::continuous_for_divider(0)).await?;
    debug!("calibration loaded");

    // Lost while the AK8963 was reconfigured
    self.select_pll().await?;
    self.prime_mag_shadow().await?;
    Ok(asa)
  }
}

impl<B, D, S, E> Mpu9250<B, D, S>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  async fn select_pll(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::PwrMgmt1, PwrMgmt1 { clksel: ClockSource::Pll, ..Default::default() }).await
  }

  /// Enable the auxiliary I2C master and set its clock to 400 kHz.
  pub(crate) async fn enable_aux_master(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::UserCtrl, UserCtrl { i2c_mst_en: true, ..Default::default() }).await?;
    self.write_verified(Reg::I2cMstCtrl, I2C_MST_CLK_400KHZ).await
  }
}

/// `PWR_MGMT_1.CLKSEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ClockSource {
  /// Internal 20 MHz oscillator
  #[default]
  Internal = 0,
  /// Gyro PLL when ready, internal oscillator otherwise
  Pll = 1,
  Stopped = 7,
}

impl From<ClockSource> for u8 {
  fn from(value: ClockSource) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for ClockSource {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 | 6 => Ok(ClockSource::Internal),
      1..=5 => Ok(ClockSource::Pll),
      7 => Ok(ClockSource::Stopped),
      _ => Err(()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct PwrMgmt1 {
  #[bits(3)]
  pub clksel: ClockSource,
  pub pd_ptat: bool,
  pub gyro_standby: bool,
  pub cycle: bool,
  pub sleep: bool,
  pub h_reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct UserCtrl {
  pub sig_cond_rst: bool,
  pub i2c_mst_rst: bool,
  pub fifo_rst: bool,
  #[skip(1)]
  pub i2c_if_dis: bool,
  pub i2c_mst_en: bool,
  pub fifo_en: bool,
}

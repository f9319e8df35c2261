#![allow(dead_code)]

/// MPU-9250 (main die) register addresses.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Reg {
  SmplrtDiv = 0x19,
  Config = 0x1A,
  GyroConfig = 0x1B,
  AccelConfig = 0x1C,
  AccelConfig2 = 0x1D,
  I2cMstCtrl = 0x24,
  I2cSlv0Addr = 0x25,
  I2cSlv0Reg = 0x26,
  I2cSlv0Ctrl = 0x27,
  IntPinCfg = 0x37,
  IntEnable = 0x38,
  IntStatus = 0x3A,
  AccelXoutH = 0x3B,
  TempOutH = 0x41,
  GyroXoutH = 0x43,
  ExtSensData00 = 0x49,
  I2cSlv0Do = 0x63,
  UserCtrl = 0x6A,
  PwrMgmt1 = 0x6B,
  PwrMgmt2 = 0x6C,
  WhoAmI = 0x75,
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

/// AK8963 (magnetometer die) register addresses, reached through slave 0.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum MagReg {
  Wia = 0x00,
  St1 = 0x02,
  Hxl = 0x03,
  St2 = 0x09,
  Cntl1 = 0x0A,
  Cntl2 = 0x0B,
  Asax = 0x10,
}

impl From<MagReg> for u8 {
  #[inline]
  fn from(r: MagReg) -> Self {
    r as u8
  }
}

// Identity constants
pub(crate) const MPU9250_WHO_AM_I: u8 = 0x71;
pub(crate) const AK8963_WIA: u8 = 0x48;

// Bus addresses
pub(crate) const ADDR_I2C_PRIM: u8 = 0x68;
pub(crate) const ADDR_I2C_ALT: u8 = 0x69;
pub(crate) const AK8963_ADDR: u8 = 0x0C;
pub(crate) const SPI_READ: u8 = 0x80;

// Raw command bytes
pub(crate) const PWR_RESET: u8 = 0x80;
pub(crate) const SEN_ENABLE: u8 = 0x00;
pub(crate) const I2C_MST_CLK_400KHZ: u8 = 0x0D;
pub(crate) const AK8963_RESET: u8 = 0x01;
pub(crate) const INT_DISABLE: u8 = 0x00;

/// ST2 value that accompanies a valid 16-bit magnetometer sample.
pub(crate) const AK8963_DATA_VALID: u8 = 0x10;

/// Device restart time after `PWR_MGMT_1.H_RESET`.
pub(crate) const RESET_DELAY_MS: u32 = 100;
/// Time the auxiliary master needs to fill `EXT_SENS_DATA` after a slave-0
/// read is armed. Must exceed the master's internal polling interval.
pub(crate) const AUX_SETTLE_MS: u32 = 100;
/// Minimum spacing between AK8963 `CNTL1` mode writes. Writes issued sooner
/// are silently dropped by the magnetometer.
pub(crate) const MAG_MODE_SWITCH_MS: u32 = 100;

/// Slave-0 can transfer at most 15 bytes per sample.
pub(crate) const AUX_MAX_LEN: usize = 15;

/// Dividers above this push the host rate under 100 Hz; the magnetometer
/// drops to its 8 Hz continuous mode.
pub(crate) const MAG_SLOW_DIVIDER: u8 = 9;

// Burst sizes
pub(crate) const MOTION_LEN: usize = 14;
pub(crate) const MOTION_MAG_LEN: usize = 21;
pub(crate) const MAG_DATA_LEN: usize = 7;

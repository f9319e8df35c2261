//! AK8963 access through the MPU-9250 auxiliary I2C master.
//!
//! The magnetometer is not on the host bus. Its registers are reached by
//! programming slave 0 of the auxiliary master and, for reads, collecting the
//! result from the `EXT_SENS_DATA` shadow window once the master has polled
//! it. Slave 0 and the shadow window are shared, so only one pass-through
//! transaction can be in flight; `&mut self` guarantees that.

use embedded_hal_async::delay::DelayNs;

use crate::{defs::*, Die, Error, Interface, Mpu9250};

impl<B, D, S, E> Mpu9250<B, D, S>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  /// Write one AK8963 register and confirm it by reading it back.
  pub(crate) async fn write_mag(&mut self, reg: MagReg, value: u8) -> Result<(), Error<E>> {
    self.send_mag(reg, value).await?;

    let mut b = [0u8; 1];
    self.read_mag_registers(reg, &mut b).await?;
    if b[0] != value {
      warn!("AK8963 register {=u8:#x} wrote {=u8:#x} read back {=u8:#x}", reg as u8, value, b[0]);
      return Err(Error::WriteVerification { die: Die::Magnetometer, reg: reg.into(), wrote: value, read: b[0] });
    }
    Ok(())
  }

  /// Write one AK8963 register without read-back. Used for self-clearing
  /// command registers such as the soft reset.
  pub(crate) async fn write_mag_unverified(&mut self, reg: MagReg, value: u8) -> Result<(), Error<E>> {
    self.send_mag(reg, value).await
  }

  /// Read `buf.len()` consecutive AK8963 registers.
  pub(crate) async fn read_mag_registers(&mut self, reg: MagReg, buf: &mut [u8]) -> Result<(), Error<E>> {
    if buf.is_empty() || buf.len() > AUX_MAX_LEN {
      return Err(Error::Data);
    }

    self.write_reg(Reg::I2cSlv0Addr, SlaveAddr { addr: AK8963_ADDR, read: true }).await?;
    self.write_verified(Reg::I2cSlv0Reg, reg.into()).await?;
    self.write_reg(Reg::I2cSlv0Ctrl, SlaveCtrl { len: buf.len() as u8, enable: true }).await?;
    // The master fills the shadow window on its next poll
    self.delay.delay_ms(AUX_SETTLE_MS).await;
    self.read_bytes(Reg::ExtSensData00.into(), buf).await
  }

  async fn send_mag(&mut self, reg: MagReg, value: u8) -> Result<(), Error<E>> {
    trace!("AK8963 write {=u8:#x} <- {=u8:#x}", reg as u8, value);
    self.write_reg(Reg::I2cSlv0Addr, SlaveAddr { addr: AK8963_ADDR, read: false }).await?;
    self.write_verified(Reg::I2cSlv0Reg, reg.into()).await?;
    self.write_verified(Reg::I2cSlv0Do, value).await?;
    self.write_reg(Reg::I2cSlv0Ctrl, SlaveCtrl { len: 1, enable: true }).await
  }
}

/// `I2C_SLV0_ADDR`: 7-bit target address and transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct SlaveAddr {
  #[bits(7)]
  pub addr: u8,
  pub read: bool,
}

/// `I2C_SLV0_CTRL`: transfer length and enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct SlaveCtrl {
  #[bits(4)]
  pub len: u8,
  #[skip(3)]
  pub enable: bool,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sim::{self, Op};
  use embassy_futures::block_on;

  #[test]
  fn slave_registers_pack_like_the_datasheet() {
    let a: Option<[u8; 1]> = SlaveAddr { addr: AK8963_ADDR, read: true }.try_into().ok();
    assert_eq!(a, Some([0x8C]));
    let a: Option<[u8; 1]> = SlaveAddr { addr: AK8963_ADDR, read: false }.try_into().ok();
    assert_eq!(a, Some([0x0C]));
    let c: Option<[u8; 1]> = SlaveCtrl { len: 7, enable: true }.try_into().ok();
    assert_eq!(c, Some([0x87]));
  }

  #[test]
  fn write_programs_slave_then_verifies() {
    let (bus, delay) = sim::device();
    let mut imu = Mpu9250::new(bus.clone(), delay);
    block_on(imu.enable_aux_master()).unwrap();
    bus.clear();

    assert_eq!(block_on(imu.write_mag(MagReg::Cntl1, 0x16)), Ok(()));

    let writes: Vec<_> = bus.ops().into_iter().filter(|op| matches!(op, Op::Write(..))).collect();
    assert_eq!(
      writes,
      [
        Op::Write(0x25, 0x0C),
        Op::Write(0x26, 0x0A),
        Op::Write(0x63, 0x16),
        Op::Write(0x27, 0x81),
        // read-back
        Op::Write(0x25, 0x8C),
        Op::Write(0x26, 0x0A),
        Op::Write(0x27, 0x81),
      ]
    );
    assert_eq!(bus.mag_reg(MagReg::Cntl1.into()), 0x16);
  }

  #[test]
  fn read_waits_before_collecting_shadow_window() {
    let (bus, delay) = sim::device();
    let mut imu = Mpu9250::new(bus.clone(), delay);
    block_on(imu.enable_aux_master()).unwrap();
    bus.clear();

    let mut b = [0u8; 3];
    block_on(imu.read_mag_registers(MagReg::Wia, &mut b)).unwrap();
    assert_eq!(b[0], AK8963_WIA);

    let ops = bus.ops();
    let n = ops.len();
    assert_eq!(ops[n - 5], Op::Write(0x27, 0x83));
    assert_eq!(ops[n - 4], Op::MagRead(0x00, 3));
    assert_eq!(ops[n - 3], Op::Read(0x27, 1));
    assert_eq!(ops[n - 2], Op::Delay(AUX_SETTLE_MS));
    assert_eq!(ops[n - 1], Op::Read(0x49, 3));
  }

  #[test]
  fn mismatched_readback_fails_on_magnetometer() {
    let (bus, delay) = sim::device();
    bus.stick_mag(MagReg::Cntl1.into());
    let mut imu = Mpu9250::new(bus.clone(), delay);
    block_on(imu.enable_aux_master()).unwrap();

    assert_eq!(
      block_on(imu.write_mag(MagReg::Cntl1, 0x0F)),
      Err(Error::WriteVerification { die: Die::Magnetometer, reg: 0x0A, wrote: 0x0F, read: 0x00 })
    );
  }

  #[test]
  fn burst_length_is_bounded_by_slave_ctrl() {
    let (bus, delay) = sim::device();
    let mut imu = Mpu9250::new(bus.clone(), delay);

    assert_eq!(block_on(imu.read_mag_registers(MagReg::Hxl, &mut [])), Err(Error::Data));
    assert_eq!(block_on(imu.read_mag_registers(MagReg::Hxl, &mut [0u8; 16])), Err(Error::Data));
    assert!(bus.ops().is_empty());
  }
}

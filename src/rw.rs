use embedded_hal_async::delay::DelayNs;

use crate::{defs::Reg, Die, Error, Interface, Mpu9250};

impl<B, D, S, E> Mpu9250<B, D, S>
where
  B: Interface<Error = E>,
  D: DelayNs,
{
  pub(crate) async fn read<const N: usize, T: TryFrom<[u8; N]>>(&mut self, reg: Reg) -> Result<T, Error<E>> {
    let mut b = [0u8; N];
    self.read_bytes(reg.into(), &mut b).await?;
    TryFrom::try_from(b).map_err(|_| Error::Data)
  }

  pub(crate) async fn read_u8(&mut self, reg: Reg) -> Result<u8, Error<E>> {
    let mut b = [0u8; 1];
    self.read_bytes(reg.into(), &mut b).await?;
    Ok(b[0])
  }

  pub(crate) async fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
    self.bus.read_registers(reg, buf).await.map_err(Error::Bus)
  }

  /// Plain write with no read-back. Only for self-clearing command bits.
  pub(crate) async fn write_u8(&mut self, reg: Reg, value: u8) -> Result<(), Error<E>> {
    self.bus.write_register(reg.into(), value).await.map_err(Error::Bus)
  }

  /// One write, one read of the same register, equality check.
  pub(crate) async fn write_verified(&mut self, reg: Reg, value: u8) -> Result<(), Error<E>> {
    self.write_u8(reg, value).await?;
    let read = self.read_u8(reg).await?;
    if read != value {
      warn!("register {=u8:#x} wrote {=u8:#x} read back {=u8:#x}", reg as u8, value, read);
      return Err(Error::WriteVerification { die: Die::Mpu, reg: reg.into(), wrote: value, read });
    }
    Ok(())
  }

  /// [`write_verified`](Self::write_verified) for a one-byte register struct.
  pub(crate) async fn write_reg<T: TryInto<[u8; 1]>>(&mut self, reg: Reg, v: T) -> Result<(), Error<E>> {
    let [b]: [u8; 1] = v.try_into().map_err(|_| Error::Data)?;
    self.write_verified(reg, b).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sim::{self, Op};
  use embassy_futures::block_on;

  #[test]
  fn verified_write_is_one_write_then_one_read() {
    let (bus, delay) = sim::device();
    let mut imu = Mpu9250::new(bus.clone(), delay);

    assert_eq!(block_on(imu.write_verified(Reg::SmplrtDiv, 19)), Ok(()));
    assert_eq!(bus.ops(), [Op::Write(0x19, 19), Op::Read(0x19, 1)]);
  }

  #[test]
  fn verified_write_reports_mismatch() {
    let (bus, delay) = sim::device();
    bus.stick(Reg::Config.into());
    let mut imu = Mpu9250::new(bus.clone(), delay);

    assert_eq!(
      block_on(imu.write_verified(Reg::Config, 0x03)),
      Err(Error::WriteVerification { die: Die::Mpu, reg: 0x1A, wrote: 0x03, read: 0x00 })
    );
    assert_eq!(bus.ops().len(), 2);
  }
}

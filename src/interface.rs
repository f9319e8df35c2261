//! Register transports.
//!
//! The driver only needs two primitives from the bus: write one byte to a
//! register and read a run of consecutive registers. Both SPI and I2C
//! wirings of the MPU-9250 are supported through [`Interface`].
//!
//! # Examples
//!
//! ```no_run
//! # fn example<I: embedded_hal_async::i2c::I2c, S: embedded_hal_async::spi::SpiDevice>(i2c: I, i2c2: I, spi: S) {
//! use mpu9250::interface::{I2cInterface, SpiInterface};
//!
//! // AD0 pulled low
//! let over_i2c = I2cInterface::new(i2c);
//! // AD0 pulled high
//! let alt = I2cInterface::with_address(i2c2, 0x69);
//! // Chip-select is owned by the `SpiDevice`
//! let over_spi = SpiInterface::new(spi);
//! # }
//! ```

use embedded_hal_async::{
  i2c::{I2c, SevenBitAddress},
  spi::{Operation, SpiDevice},
};

use crate::defs::*;

/// Byte-level register access to the main die.
///
/// Implementations must return exactly `buf.len()` bytes or an error; the
/// driver treats the transport as dependable and does not retry.
#[allow(async_fn_in_trait)]
pub trait Interface {
  type Error;

  /// Write `value` to register `reg`.
  async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error>;

  /// Read `buf.len()` consecutive registers starting at `reg`.
  async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// MPU-9250 on an I2C bus.
pub struct I2cInterface<I> {
  i2c: I,
  address: u8,
}

impl<I> I2cInterface<I>
where
  I: I2c<SevenBitAddress>,
{
  /// Device at the primary address `0x68` (AD0 low).
  pub fn new(i2c: I) -> Self {
    Self { i2c, address: ADDR_I2C_PRIM }
  }

  /// Device at a custom address, usually `0x69` (AD0 high).
  pub fn with_address(i2c: I, address: u8) -> Self {
    Self { i2c, address }
  }

  /// Device at the alternate address `0x69`.
  pub fn alternate(i2c: I) -> Self {
    Self::with_address(i2c, ADDR_I2C_ALT)
  }

  pub fn release(self) -> I {
    self.i2c
  }
}

impl<I> Interface for I2cInterface<I>
where
  I: I2c<SevenBitAddress>,
{
  type Error = I::Error;

  async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
    self.i2c.write(self.address, &[reg, value]).await
  }

  async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    self.i2c.write_read(self.address, &[reg], buf).await
  }
}

/// MPU-9250 on an SPI bus. Reads set the top address bit.
pub struct SpiInterface<S> {
  spi: S,
}

impl<S> SpiInterface<S>
where
  S: SpiDevice,
{
  pub fn new(spi: S) -> Self {
    Self { spi }
  }

  pub fn release(self) -> S {
    self.spi
  }
}

impl<S> Interface for SpiInterface<S>
where
  S: SpiDevice,
{
  type Error = S::Error;

  async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
    self.spi.write(&[reg, value]).await
  }

  async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    self.spi.transaction(&mut [Operation::Write(&[reg | SPI_READ]), Operation::Read(buf)]).await
  }
}

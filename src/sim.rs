//! Register-level MPU-9250/AK8963 model for unit tests.
//!
//! Records every bus transaction and delay in order, and emulates the parts
//! of the device the driver depends on: reset, identity registers, the
//! slave-0 auxiliary master and the AK8963 fuse ROM.

use core::convert::Infallible;
use std::{cell::RefCell, rc::Rc};

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;

use crate::{defs::*, interface::Interface, Config, Mpu9250, Ready};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  /// Main-die register write
  Write(u8, u8),
  /// Main-die burst read (start, length)
  Read(u8, usize),
  Delay(u32),
  /// AK8963 write performed by the auxiliary master
  MagWrite(u8, u8),
  /// AK8963 read performed by the auxiliary master (start, length)
  MagRead(u8, usize),
}

const SLV0_ENABLE: u8 = 0x80;
const SLV0_LEN_MASK: u8 = 0x0F;
const I2C_MST_EN: u8 = 0x20;
const CNTL1_MODE_MASK: u8 = 0x0F;
const FUSE_ROM_MODE: u8 = 0x0F;

struct State {
  regs: [u8; 128],
  mag: [u8; 32],
  who_am_i: u8,
  fuse: [u8; 3],
  stuck: Vec<u8>,
  stuck_mag: Vec<u8>,
  dropped: Vec<(u8, u8)>,
  ops: Vec<Op>,
}

impl State {
  fn new() -> Self {
    let mut s = Self {
      regs: [0; 128],
      mag: [0; 32],
      who_am_i: MPU9250_WHO_AM_I,
      fuse: [128; 3],
      stuck: Vec::new(),
      stuck_mag: Vec::new(),
      dropped: Vec::new(),
      ops: Vec::new(),
    };
    s.mag[MagReg::Wia as usize] = AK8963_WIA;
    s.reset();
    s
  }

  /// Power-on values. Stuck registers keep whatever they hold.
  fn reset(&mut self) {
    for (i, r) in self.regs.iter_mut().enumerate() {
      if !self.stuck.contains(&(i as u8)) {
        *r = 0;
      }
    }
    self.regs[Reg::PwrMgmt1 as usize] = 0x01;
    self.regs[Reg::WhoAmI as usize] = self.who_am_i;
  }

  fn write(&mut self, reg: u8, value: u8) {
    self.ops.push(Op::Write(reg, value));
    if reg == u8::from(Reg::PwrMgmt1) && value & PWR_RESET != 0 {
      self.reset();
      return;
    }
    if self.stuck.contains(&reg) {
      return;
    }
    if let Some(i) = self.dropped.iter().position(|&d| d == (reg, value)) {
      self.dropped.remove(i);
      return;
    }
    self.regs[reg as usize & 0x7F] = value;

    let aux_on = self.regs[Reg::UserCtrl as usize] & I2C_MST_EN != 0;
    let addr = self.regs[Reg::I2cSlv0Addr as usize];
    if reg == u8::from(Reg::I2cSlv0Ctrl) && value & SLV0_ENABLE != 0 && aux_on && addr & 0x7F == AK8963_ADDR {
      self.aux_transfer(addr & SPI_READ != 0, (value & SLV0_LEN_MASK) as usize);
    }
  }

  fn aux_transfer(&mut self, read: bool, len: usize) {
    let start = self.regs[Reg::I2cSlv0Reg as usize];
    if read {
      self.ops.push(Op::MagRead(start, len));
      for i in 0..len {
        let v = self.mag_read(start.wrapping_add(i as u8));
        self.regs[Reg::ExtSensData00 as usize + i] = v;
      }
    } else {
      let value = self.regs[Reg::I2cSlv0Do as usize];
      self.ops.push(Op::MagWrite(start, value));
      if self.stuck_mag.contains(&start) {
        return;
      }
      if start == u8::from(MagReg::Cntl2) {
        // SRST self-clears; the only other effect is back to power-down
        if value & AK8963_RESET != 0 {
          self.mag[MagReg::Cntl1 as usize] = 0;
        }
      } else {
        self.mag[start as usize & 0x1F] = value;
      }
    }
  }

  fn mag_read(&self, reg: u8) -> u8 {
    let asa = MagReg::Asax as u8;
    if (asa..asa + 3).contains(&reg) {
      if self.mag[MagReg::Cntl1 as usize] & CNTL1_MODE_MASK == FUSE_ROM_MODE {
        self.fuse[(reg - asa) as usize]
      } else {
        0
      }
    } else {
      self.mag[reg as usize & 0x1F]
    }
  }

  fn read(&mut self, reg: u8, buf: &mut [u8]) {
    self.ops.push(Op::Read(reg, buf.len()));
    for (i, b) in buf.iter_mut().enumerate() {
      *b = self.regs[(reg as usize + i) & 0x7F];
    }
  }
}

/// Simulated transport. Clones share the same device.
#[derive(Clone)]
pub struct SimBus(Rc<RefCell<State>>);

pub struct SimDelay(Rc<RefCell<State>>);

pub fn device() -> (SimBus, SimDelay) {
  let state = Rc::new(RefCell::new(State::new()));
  (SimBus(state.clone()), SimDelay(state))
}

/// A handle that has been through `init_with`, plus a handle on the simulated bus.
pub fn ready(config: Config) -> (Mpu9250<SimBus, SimDelay, Ready>, SimBus) {
  let (bus, delay) = device();
  let imu = block_on(Mpu9250::new(bus.clone(), delay).init_with(config)).unwrap();
  (imu, bus)
}

impl SimBus {
  pub fn ops(&self) -> Vec<Op> {
    self.0.borrow().ops.clone()
  }

  pub fn clear(&self) {
    self.0.borrow_mut().ops.clear();
  }

  pub fn last(&self) -> Option<Op> {
    self.0.borrow().ops.last().copied()
  }

  /// AK8963 writes, in order.
  pub fn mag_writes(&self) -> Vec<(u8, u8)> {
    self
      .0
      .borrow()
      .ops
      .iter()
      .filter_map(|op| match *op {
        Op::MagWrite(r, v) => Some((r, v)),
        _ => None,
      })
      .collect()
  }

  /// Set main-die registers directly, bypassing stuck registers and logging.
  pub fn set_regs(&self, start: u8, values: &[u8]) {
    let mut s = self.0.borrow_mut();
    for (i, v) in values.iter().enumerate() {
      s.regs[(start as usize + i) & 0x7F] = *v;
    }
  }

  pub fn reg(&self, reg: u8) -> u8 {
    self.0.borrow().regs[reg as usize & 0x7F]
  }

  pub fn mag_reg(&self, reg: u8) -> u8 {
    self.0.borrow().mag[reg as usize & 0x1F]
  }

  /// Make a main-die register ignore writes.
  pub fn stick(&self, reg: u8) {
    self.0.borrow_mut().stuck.push(reg);
  }

  /// Make an AK8963 register ignore writes.
  pub fn stick_mag(&self, reg: u8) {
    self.0.borrow_mut().stuck_mag.push(reg);
  }

  /// Ignore the next write of `value` to a main-die register.
  pub fn drop_write(&self, reg: u8, value: u8) {
    self.0.borrow_mut().dropped.push((reg, value));
  }

  pub fn set_who_am_i(&self, id: u8) {
    let mut s = self.0.borrow_mut();
    s.who_am_i = id;
    s.regs[Reg::WhoAmI as usize] = id;
  }

  pub fn set_mag_who_am_i(&self, id: u8) {
    self.0.borrow_mut().mag[MagReg::Wia as usize] = id;
  }

  pub fn set_fuse(&self, asa: [u8; 3]) {
    self.0.borrow_mut().fuse = asa;
  }
}

impl Interface for SimBus {
  type Error = Infallible;

  async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
    self.0.borrow_mut().write(reg, value);
    Ok(())
  }

  async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    self.0.borrow_mut().read(reg, buf);
    Ok(())
  }
}

impl DelayNs for SimDelay {
  async fn delay_ns(&mut self, _ns: u32) {}

  async fn delay_ms(&mut self, ms: u32) {
    self.0.borrow_mut().ops.push(Op::Delay(ms));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aux_read_needs_master_enabled() {
    let (mut bus, _) = device();
    block_on(bus.write_register(Reg::I2cSlv0Addr.into(), 0x8C)).unwrap();
    block_on(bus.write_register(Reg::I2cSlv0Ctrl.into(), 0x81)).unwrap();
    assert!(!bus.ops().iter().any(|op| matches!(op, Op::MagRead(..))));

    block_on(bus.write_register(Reg::UserCtrl.into(), I2C_MST_EN)).unwrap();
    block_on(bus.write_register(Reg::I2cSlv0Ctrl.into(), 0x81)).unwrap();
    assert_eq!(bus.last(), Some(Op::MagRead(0x00, 1)));
    assert_eq!(bus.reg(Reg::ExtSensData00.into()), AK8963_WIA);
  }

  #[test]
  fn reset_restores_defaults() {
    let (mut bus, _) = device();
    block_on(bus.write_register(Reg::UserCtrl.into(), I2C_MST_EN)).unwrap();
    block_on(bus.write_register(Reg::PwrMgmt1.into(), PWR_RESET)).unwrap();
    assert_eq!(bus.reg(Reg::UserCtrl.into()), 0);
    assert_eq!(bus.reg(Reg::PwrMgmt1.into()), 0x01);
    assert_eq!(bus.reg(Reg::WhoAmI.into()), MPU9250_WHO_AM_I);
  }
}

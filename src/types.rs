use std::cell::RefCell;
use std::rc::Rc;

use crate::apu::Apu;
use crate::bus::Bus;
use crate::graphics::ppu::Ppu;
use crate::interfaces::Memory;

pub type SharedPpu = Rc<RefCell<Ppu>>;
pub type SharedApu = Rc<RefCell<Apu>>;
pub type SharedBus = Rc<RefCell<Bus>>;
pub type SharedMemory = Rc<RefCell<dyn Memory>>;

// The eight buttons and direction keys are arranged as a 2x4 matrix. The program selects either
// the button or the direction group by writing to bits 4-5, then reads bits 0-3.
//
// FF00 - P1/JOYP - Joypad (R/W)
//
// Bit 5 - P15 Select Button Keys      (0=Select)
// Bit 4 - P14 Select Direction Keys   (0=Select)
// Bit 3 - P13 Input Down  or Start    (0=Pressed) (Read Only)
// Bit 2 - P12 Input Up    or Select   (0=Pressed) (Read Only)
// Bit 1 - P11 Input Left  or Button B (0=Pressed) (Read Only)
// Bit 0 - P10 Input Right or Button A (0=Pressed) (Read Only)
use super::intf::{Flag, Intf};
use std::cell::RefCell;
use std::rc::Rc;

#[rustfmt::skip]
#[derive(Clone, Copy)]
pub enum JoypadKey {
    Right  = 0b0000_0001,
    Left   = 0b0000_0010,
    Up     = 0b0000_0100,
    Down   = 0b0000_1000,
    A      = 0b0001_0000,
    B      = 0b0010_0000,
    Select = 0b0100_0000,
    Start  = 0b1000_0000,
}

pub struct Joypad {
    intf: Rc<RefCell<Intf>>,
    matrix: u8,
    select: u8,
}

impl Joypad {
    pub fn power_up(intf: Rc<RefCell<Intf>>) -> Self {
        Self { intf, matrix: 0xff, select: 0x00 }
    }

    pub fn keydown(&mut self, key: JoypadKey) {
        // Only a high-to-low transition requests the interrupt; key repeat does not.
        if self.matrix & key as u8 == 0x00 {
            return;
        }
        self.matrix &= !(key as u8);
        self.intf.borrow_mut().hi(Flag::HighToLow);
    }

    pub fn keyup(&mut self, key: JoypadKey) {
        self.matrix |= key as u8;
    }

    pub fn get(&self, a: u16) -> u8 {
        if a != 0xff00 {
            return 0xff;
        }
        if self.select & 0b0001_0000 == 0x00 {
            return self.select | (self.matrix & 0x0f);
        }
        if self.select & 0b0010_0000 == 0x00 {
            return self.select | (self.matrix >> 4);
        }
        self.select | 0x0f
    }

    pub fn set(&mut self, a: u16, v: u8) {
        if a == 0xff00 {
            self.select = v & 0b0011_0000;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_groups() {
        let intf = Rc::new(RefCell::new(Intf::power_up()));
        let mut pad = Joypad::power_up(intf);
        pad.keydown(JoypadKey::Right);
        pad.keydown(JoypadKey::Start);
        pad.set(0xff00, 0b0010_0000);
        assert_eq!(pad.get(0xff00) & 0x0f, 0b1110);
        pad.set(0xff00, 0b0001_0000);
        assert_eq!(pad.get(0xff00) & 0x0f, 0b0111);
        pad.keyup(JoypadKey::Right);
        pad.set(0xff00, 0b0010_0000);
        assert_eq!(pad.get(0xff00) & 0x0f, 0b1111);
    }

    #[test]
    fn interrupt_only_on_transition() {
        let intf = Rc::new(RefCell::new(Intf::power_up()));
        let mut pad = Joypad::power_up(intf.clone());
        pad.keydown(JoypadKey::A);
        assert_eq!(intf.borrow().data, 1 << Flag::HighToLow as u8);
        intf.borrow_mut().data = 0x00;
        // Held key: no second request.
        pad.keydown(JoypadKey::A);
        assert_eq!(intf.borrow().data, 0x00);
        pad.keyup(JoypadKey::A);
        pad.keydown(JoypadKey::A);
        assert_eq!(intf.borrow().data, 1 << Flag::HighToLow as u8);
    }
}

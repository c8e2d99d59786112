// The timer has a selectable frequency of 4096, 16384, 65536 or 262144 Hertz driving the Timer
// Counter (TIMA). On overflow TIMA is reloaded from the Timer Modulo (TMA) and a timer interrupt
// is requested. The divider (DIV) free-runs at 16384 Hz, which is one step per 256 cycles of the
// 4194304 Hz clock; in double speed mode it receives doubled cycle counts and so steps at 32768 Hz
// of wall time, like the hardware.
//
// See: http://gbdev.gg8.se/wiki/articles/Timer_and_Divider_Registers
use super::error::Error;
use super::intf::{Flag, Intf};
use super::state;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::rc::Rc;

pub struct Timer {
    intf: Rc<RefCell<Intf>>,
    div: u8,
    tima: u8,
    tma: u8,
    //  Bit  2   - Timer Enable
    //  Bits 1-0 - Input Clock Select
    //             00: CPU Clock / 1024
    //             01: CPU Clock / 16
    //             10: CPU Clock / 64
    //             11: CPU Clock / 256
    tac: u8,
    period: u32,
    div_clock: u32,
    tima_clock: u32,
    // On overflow TIMA reads zero for 4 cycles before the TMA reload lands and the interrupt is
    // requested.
    reload_delay: u32,
    reload_pending: bool,
}

fn tac_period(tac: u8) -> u32 {
    match tac & 0x03 {
        0x00 => 1024,
        0x01 => 16,
        0x02 => 64,
        _ => 256,
    }
}

impl Timer {
    pub fn power_up(intf: Rc<RefCell<Intf>>) -> Self {
        Self {
            intf,
            div: 0x00,
            tima: 0x00,
            tma: 0x00,
            tac: 0x00,
            period: 1024,
            div_clock: 0x00,
            tima_clock: 0x00,
            reload_delay: 0,
            reload_pending: false,
        }
    }

    pub fn get(&self, a: u16) -> u8 {
        match a {
            0xff04 => self.div,
            0xff05 => self.tima,
            0xff06 => self.tma,
            0xff07 => self.tac,
            _ => 0xff,
        }
    }

    pub fn set(&mut self, a: u16, v: u8) {
        match a {
            // Writing any value resets the divider.
            0xff04 => {
                self.div = 0x00;
                self.div_clock = 0x00;
            }
            0xff05 => self.tima = v,
            0xff06 => self.tma = v,
            0xff07 => {
                self.tac = v;
                self.period = tac_period(v);
            }
            _ => {}
        }
    }

    // The CGB speed switch zeroes the divider.
    pub fn reset_div(&mut self) {
        self.div = 0x00;
        self.div_clock = 0x00;
    }

    pub fn next(&mut self, cycles: u32) {
        if self.reload_pending {
            if cycles >= self.reload_delay {
                self.tima = self.tma;
                self.reload_pending = false;
                self.intf.borrow_mut().hi(Flag::Timer);
            } else {
                self.reload_delay -= cycles;
            }
        }

        self.div_clock += cycles;
        while self.div_clock >= 256 {
            self.div = self.div.wrapping_add(1);
            self.div_clock -= 256;
        }

        if self.tac & 0x04 != 0x00 {
            self.tima_clock += cycles;
            while self.tima_clock >= self.period {
                self.tima = self.tima.wrapping_add(1);
                if self.tima == 0x00 {
                    self.reload_delay = 4;
                    self.reload_pending = true;
                }
                self.tima_clock -= self.period;
            }
        }
    }

    pub fn save_state(&self, w: &mut dyn Write) -> Result<(), Error> {
        state::put_byte(w, self.div)?;
        state::put_byte(w, self.tima)?;
        state::put_byte(w, self.tma)?;
        state::put_byte(w, self.tac)?;
        state::put_dword(w, self.div_clock)?;
        state::put_dword(w, self.tima_clock)?;
        state::put_byte(w, self.reload_pending as u8)?;
        state::put_dword(w, self.reload_delay)
    }

    pub fn load_state(&mut self, r: &mut dyn Read) -> Result<(), Error> {
        self.div = state::get_byte(r)?;
        self.tima = state::get_byte(r)?;
        self.tma = state::get_byte(r)?;
        self.tac = state::get_byte(r)?;
        self.period = tac_period(self.tac);
        self.div_clock = state::get_dword(r)?;
        self.tima_clock = state::get_dword(r)?;
        self.reload_pending = state::get_byte(r)? != 0;
        self.reload_delay = state::get_dword(r)?;
        Ok(())
    }
}

// The memory management unit. Every CPU memory reference passes through here and is routed to the
// cartridge, video hardware, work RAM, I/O registers or HRAM. The unit also owns the tick pump
// glue: cycles consumed by the CPU are handed to the timer and the LCD, padded with the bus time
// that synchronous DMA transfers are supposed to take.
use super::cartridge::Cartridge;
use super::convention::Term;
use super::error::Error;
use super::hdma::{Hdma, HdmaMode};
use super::intf::Intf;
use super::joypad::Joypad;
use super::lcd::Lcd;
use super::memory::Memory;
use super::ram::Ram;
use super::serial::Serial;
use super::timer::Timer;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::rc::Rc;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Speed {
    Normal = 0x01,
    Double = 0x02,
}

pub struct Mmunit {
    pub cartridge: Cartridge,
    pub lcd: Lcd,
    pub joypad: Joypad,
    pub serial: Serial,
    pub timer: Timer,
    pub ram: Ram,
    pub term: Term,
    pub speed: Speed,
    // KEY1 bit 0: a speed switch has been armed and fires at the next STOP.
    pub shift: bool,
    pub intf: Rc<RefCell<Intf>>,
    inte: u8,
    hdma: Hdma,
    dma_reg: u8,
    // T-cycles of bus time owed to the peripherals by a synchronous OAM DMA.
    dma_debt: u32,
}

impl Mmunit {
    pub fn power_up(
        cartridge: Cartridge,
        term: Term,
        dmg_palette: [u32; 4],
        cgb_dmg_palettes: [[u32; 4]; 3],
        randomize: bool,
    ) -> Self {
        let intf = Rc::new(RefCell::new(Intf::power_up()));
        let cartridge_cgb = cartridge.cgb();
        let mut r = Self {
            cartridge,
            lcd: Lcd::power_up(term, cartridge_cgb, dmg_palette, cgb_dmg_palettes, randomize, intf.clone()),
            joypad: Joypad::power_up(intf.clone()),
            serial: Serial::power_up(intf.clone()),
            timer: Timer::power_up(intf.clone()),
            ram: Ram::power_up(term, randomize),
            term,
            speed: Speed::Normal,
            shift: false,
            intf,
            inte: 0x00,
            hdma: Hdma::power_up(),
            dma_reg: 0x00,
            dma_debt: 0,
        };
        // I/O register values after the boot rom has handed over control.
        r.set(0xff05, 0x00);
        r.set(0xff06, 0x00);
        r.set(0xff07, 0x00);
        r.set(0xff40, 0x91);
        r.set(0xff42, 0x00);
        r.set(0xff43, 0x00);
        r.set(0xff45, 0x00);
        r.set(0xff47, 0xfc);
        r.set(0xff48, 0xff);
        r.set(0xff49, 0xff);
        r.set(0xff4a, 0x00);
        r.set(0xff4b, 0x00);
        r
    }

    // Distribute the cycles of one CPU step to the peripherals. Returns the cycle count actually
    // accounted, including DMA bus time.
    pub fn next(&mut self, cycles: u32) -> u32 {
        let hdma_cycles = self.run_hdma();
        let total = cycles + hdma_cycles + self.dma_debt;
        self.dma_debt = 0;
        self.timer.next(total);
        self.lcd.tick(total);
        total
    }

    pub fn switch_speed(&mut self) {
        if self.shift {
            self.speed = if self.speed == Speed::Double { Speed::Normal } else { Speed::Double };
            self.lcd.double_speed = self.speed == Speed::Double;
            // The divider restarts from zero on a speed switch.
            self.timer.reset_div();
        }
        self.shift = false;
    }

    fn run_hdma(&mut self) -> u32 {
        if self.term != Term::GBC || !self.hdma.active {
            return 0;
        }
        let per_block = 32 * self.speed as u32;
        match self.hdma.mode {
            HdmaMode::Gdma => {
                // The whole transfer happens now; the program is stalled for its duration.
                let len = u32::from(self.hdma.remain) + 1;
                for _ in 0..len {
                    self.run_hdma_block();
                }
                self.hdma.active = false;
                len * per_block
            }
            HdmaMode::Hdma => {
                if !self.lcd.h_blank {
                    return 0;
                }
                self.run_hdma_block();
                if self.hdma.remain == 0x7f {
                    self.hdma.active = false;
                }
                per_block
            }
        }
    }

    fn run_hdma_block(&mut self) {
        let src = self.hdma.src;
        let dst = self.hdma.dst;
        for i in 0..0x10 {
            let b = self.get(src + i);
            self.lcd.set(dst + i, b);
        }
        self.hdma.src += 0x10;
        self.hdma.dst += 0x10;
        self.hdma.remain = if self.hdma.remain == 0 { 0x7f } else { self.hdma.remain - 1 };
    }

    // Writing FF46 copies 0xA0 bytes into OAM. The copy itself is synchronous but the 160 M-cycles
    // of wall time it takes are still charged to the bus.
    fn run_oam_dma(&mut self, v: u8) {
        self.dma_reg = v;
        let base = u16::from(v) << 8;
        for i in 0..0xa0 {
            let b = self.get(base + i);
            self.set(0xfe00 + i, b);
        }
        self.dma_debt += 640;
    }

    pub fn save_state(&self, w: &mut dyn Write) -> Result<(), Error> {
        self.hdma.save_state(w)?;
        self.serial.save_state(w)?;
        super::state::put_byte(w, (self.speed == Speed::Double) as u8)?;
        super::state::put_byte(w, self.shift as u8)
    }

    pub fn load_state(&mut self, r: &mut dyn Read) -> Result<(), Error> {
        self.hdma.load_state(r)?;
        self.serial.load_state(r)?;
        self.speed = if super::state::get_byte(r)? != 0 { Speed::Double } else { Speed::Normal };
        self.shift = super::state::get_byte(r)? != 0;
        Ok(())
    }
}

impl Memory for Mmunit {
    fn get(&self, a: u16) -> u8 {
        match a {
            0x0000..=0x7fff => self.cartridge.get(a),
            0x8000..=0x9fff => self.lcd.get(a),
            0xa000..=0xbfff => self.cartridge.get(a),
            0xc000..=0xcfff => self.ram.get_bank0(a - 0xc000),
            0xd000..=0xdfff => self.ram.get_banked(a - 0xd000),
            // Echo RAM mirrors C000-DDFF.
            0xe000..=0xefff => self.ram.get_bank0(a - 0xe000),
            0xf000..=0xfdff => self.ram.get_banked(a - 0xf000),
            0xfe00..=0xfe9f => self.lcd.get(a),
            // Forbidden region. Reads 0xFF while the panel scans OAM or transfers pixels.
            0xfea0..=0xfeff => {
                if self.lcd.stat.mode == 2 || self.lcd.stat.mode == 3 {
                    0xff
                } else {
                    0x00
                }
            }
            0xff00 => self.joypad.get(a),
            0xff01..=0xff02 => self.serial.get(a),
            0xff04..=0xff07 => self.timer.get(a),
            0xff0f => self.intf.borrow().data,
            0xff46 => self.dma_reg,
            0xff4d => {
                if self.term == Term::GBC {
                    let a = if self.speed == Speed::Double { 0x80 } else { 0x00 };
                    let b = if self.shift { 0x01 } else { 0x00 };
                    a | b
                } else {
                    0xff
                }
            }
            0xff40..=0xff45 | 0xff47..=0xff4b | 0xff4f => self.lcd.get(a),
            0xff51..=0xff55 => {
                if self.term == Term::GBC {
                    self.hdma.get(a)
                } else {
                    0xff
                }
            }
            0xff68..=0xff6b => self.lcd.get(a),
            0xff70 => self.ram.get_svbk(),
            0xff80..=0xfffe => self.ram.get_hram(a - 0xff80),
            0xffff => self.inte,
            // Unmapped I/O reads open bus.
            _ => 0xff,
        }
    }

    fn set(&mut self, a: u16, v: u8) {
        match a {
            0x0000..=0x7fff => self.cartridge.set(a, v),
            0x8000..=0x9fff => self.lcd.set(a, v),
            0xa000..=0xbfff => self.cartridge.set(a, v),
            0xc000..=0xcfff => self.ram.set_bank0(a - 0xc000, v),
            0xd000..=0xdfff => self.ram.set_banked(a - 0xd000, v),
            0xe000..=0xefff => self.ram.set_bank0(a - 0xe000, v),
            0xf000..=0xfdff => self.ram.set_banked(a - 0xf000, v),
            0xfe00..=0xfe9f => self.lcd.set(a, v),
            0xfea0..=0xfeff => {}
            0xff00 => self.joypad.set(a, v),
            0xff01..=0xff02 => self.serial.set(a, v),
            0xff04..=0xff07 => self.timer.set(a, v),
            0xff0f => self.intf.borrow_mut().data = v,
            0xff46 => self.run_oam_dma(v),
            0xff4d => {
                if self.term == Term::GBC {
                    self.shift = v & 0x01 == 0x01;
                }
            }
            0xff40..=0xff45 | 0xff47..=0xff4b | 0xff4f => self.lcd.set(a, v),
            0xff51..=0xff55 => {
                if self.term == Term::GBC {
                    self.hdma.set(a, v);
                }
            }
            0xff68..=0xff6b => self.lcd.set(a, v),
            0xff70 => self.ram.set_svbk(v),
            0xff80..=0xfffe => self.ram.set_hram(a - 0xff80, v),
            0xffff => self.inte = v,
            _ => {}
        }
    }
}

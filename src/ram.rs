// Internal work RAM and high RAM. The DMG maps a fixed 8 KiB at C000-DFFF. The CGB keeps bank 0 at
// C000-CFFF and switches banks 1-7 into D000-DFFF through SVBK (FF70). In real hardware the
// contents are scrambled at power on, which the randomize option reproduces.
use super::convention::Term;
use super::error::Error;
use super::state;
use rand::Rng;
use std::io::{Read, Write};

pub const WRAM_BANK_SIZE: usize = 0x1000;
pub const WRAM_BANKS: usize = 8;
pub const HRAM_SIZE: usize = 0x7f;

pub struct Ram {
    term: Term,
    wram: [[u8; WRAM_BANK_SIZE]; WRAM_BANKS],
    hram: [u8; HRAM_SIZE],
    wram_bank: usize,
}

impl Ram {
    pub fn power_up(term: Term, randomize: bool) -> Self {
        let mut r = Self { term, wram: [[0x00; WRAM_BANK_SIZE]; WRAM_BANKS], hram: [0x00; HRAM_SIZE], wram_bank: 0x01 };
        if randomize {
            let mut rng = rand::thread_rng();
            for bank in r.wram.iter_mut() {
                rng.fill(&mut bank[..]);
            }
            rng.fill(&mut r.hram[..]);
        }
        r
    }

    // C000-CFFF and the echo of it.
    pub fn get_bank0(&self, offset: u16) -> u8 {
        self.wram[0][offset as usize]
    }

    pub fn set_bank0(&mut self, offset: u16, v: u8) {
        self.wram[0][offset as usize] = v;
    }

    // D000-DFFF and the echo of it, through the selected bank.
    pub fn get_banked(&self, offset: u16) -> u8 {
        self.wram[self.wram_bank][offset as usize]
    }

    pub fn set_banked(&mut self, offset: u16, v: u8) {
        self.wram[self.wram_bank][offset as usize] = v;
    }

    pub fn get_hram(&self, offset: u16) -> u8 {
        self.hram[offset as usize]
    }

    pub fn set_hram(&mut self, offset: u16, v: u8) {
        self.hram[offset as usize] = v;
    }

    // FF70 - SVBK - WRAM bank select. Writing 0 selects bank 1. DMG ignores it and reads open 0xff.
    pub fn get_svbk(&self) -> u8 {
        match self.term {
            Term::GBC => self.wram_bank as u8,
            Term::GB => 0xff,
        }
    }

    pub fn set_svbk(&mut self, v: u8) {
        if self.term != Term::GBC {
            return;
        }
        self.wram_bank = match v & 0x07 {
            0 => 1,
            n => n as usize,
        };
    }

    pub fn save_state(&self, w: &mut dyn Write) -> Result<(), Error> {
        for bank in self.wram.iter() {
            state::put_blob(w, bank)?;
        }
        state::put_blob(w, &self.hram)?;
        state::put_byte(w, self.wram_bank as u8)
    }

    pub fn load_state(&mut self, r: &mut dyn Read) -> Result<(), Error> {
        for bank in self.wram.iter_mut() {
            state::get_blob(r, bank)?;
        }
        state::get_blob(r, &mut self.hram)?;
        self.wram_bank = usize::from(state::get_byte(r)?) & 0x07;
        if self.wram_bank == 0 {
            self.wram_bank = 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svbk_bank_switch() {
        let mut ram = Ram::power_up(Term::GBC, false);
        ram.set_banked(0x0010, 0xaa);
        ram.set_svbk(0x03);
        assert_eq!(ram.get_banked(0x0010), 0x00);
        ram.set_banked(0x0010, 0xbb);
        ram.set_svbk(0x01);
        assert_eq!(ram.get_banked(0x0010), 0xaa);
        // Writing 0 selects bank 1.
        ram.set_svbk(0x00);
        assert_eq!(ram.get_banked(0x0010), 0xaa);
    }

    #[test]
    fn svbk_ignored_on_dmg() {
        let mut ram = Ram::power_up(Term::GB, false);
        ram.set_banked(0x0000, 0x55);
        ram.set_svbk(0x04);
        assert_eq!(ram.get_banked(0x0000), 0x55);
        assert_eq!(ram.get_svbk(), 0xff);
    }
}

// The motherboard owns every subcomponent and is the only surface a frontend talks to. Each tick
// runs one CPU instruction, hands the consumed cycles to the memory unit for distribution, and
// reports whether the frame boundary was crossed.
use super::cartridge::Cartridge;
use super::convention::{Term, TermSelect};
use super::cpu::Cpu;
use super::error::Error;
use super::joypad::JoypadKey;
use super::lcd::{COLS, ROWS};
use super::memory::Memory;
use super::mmunit::Mmunit;
use super::state;
use std::io::{Read, Write};
use std::path::PathBuf;

const STATE_MAGIC: &[u8; 5] = b"PYBOY";
const STATE_VERSION: u8 = 1;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum FrameStatus {
    Ok,
    Stopped,
}

pub struct Options {
    // Override the CGB flag in the cartridge header instead of trusting it.
    pub term: TermSelect,
    // Scramble VRAM, OAM and work RAM at power up, like real hardware.
    pub randomize: bool,
    // Host colors for the four DMG shades, 0xRRGGBB.
    pub dmg_palette: [u32; 4],
    // Host colors used when a DMG cartridge runs on CGB hardware: BG, OBJ0, OBJ1.
    pub cgb_dmg_palettes: [[u32; 4]; 3],
    // Accepted for interface completeness. Boot rom execution is not performed; the core starts
    // from the post-boot register state.
    pub boot_rom: Option<Vec<u8>>,
    // Battery backed SRAM sidecar location. No persistence when absent.
    pub sav_path: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            term: TermSelect::Auto,
            randomize: false,
            dmg_palette: [0xff_ffff, 0x99_9999, 0x55_5555, 0x00_0000],
            cgb_dmg_palettes: [
                [0xff_ffff, 0x7bff31, 0x0063c5, 0x00_0000],
                [0xff_ffff, 0xff8484, 0x943a3a, 0x00_0000],
                [0xff_ffff, 0xff8484, 0x943a3a, 0x00_0000],
            ],
            boot_rom: None,
            sav_path: None,
        }
    }
}

pub struct MotherBoard {
    pub mmu: Mmunit,
    pub cpu: Cpu,
    pub frame_count: u64,
    stopped: bool,
}

impl MotherBoard {
    pub fn power_up(rom: Vec<u8>, options: Options) -> Result<Self, Error> {
        let cartridge = Cartridge::power_up(rom, options.sav_path)?;
        let term = match options.term {
            TermSelect::GB => Term::GB,
            TermSelect::GBC => Term::GBC,
            TermSelect::Auto => {
                if cartridge.cgb() {
                    Term::GBC
                } else {
                    Term::GB
                }
            }
        };
        if options.boot_rom.is_some() {
            rog::debugln!("Boot rom execution is unsupported; starting from post-boot state");
        }
        let mmu = Mmunit::power_up(cartridge, term, options.dmg_palette, options.cgb_dmg_palettes, options.randomize);
        Ok(Self { mmu, cpu: Cpu::power_up(term), frame_count: 0, stopped: false })
    }

    // Advance the machine by one CPU instruction. Returns true when the tick crossed a frame
    // boundary and the frame buffer holds a complete picture.
    pub fn tick(&mut self) -> bool {
        // STOP doubles as the speed switch trigger on CGB. An armed switch fires instead of
        // entering stop mode.
        let switching = self.mmu.shift && self.mmu.get(self.cpu.reg.pc) == 0x10;
        if self.mmu.get(self.cpu.reg.pc) == 0x10 {
            self.mmu.switch_speed();
        }
        let cycles = self.cpu.next(&mut self.mmu) * 4;
        if switching {
            self.cpu.stopped = false;
        }
        self.mmu.next(cycles);
        if self.mmu.lcd.frame_done {
            self.mmu.lcd.frame_done = false;
            self.frame_count += 1;
            true
        } else {
            false
        }
    }

    // Run instructions until the next frame boundary.
    pub fn tick_frame(&mut self) -> FrameStatus {
        if self.stopped {
            return FrameStatus::Stopped;
        }
        while !self.tick() {}
        FrameStatus::Ok
    }

    pub fn keydown(&mut self, key: JoypadKey) {
        self.mmu.joypad.keydown(key);
    }

    pub fn keyup(&mut self, key: JoypadKey) {
        self.mmu.joypad.keyup(key);
    }

    // Read-only view of the last completed frame, BGRA32.
    pub fn screen(&self) -> &[[u32; COLS]; ROWS] {
        &self.mmu.lcd.renderer.screen
    }

    // Bytes pushed through the serial port since the last call.
    pub fn serial_data(&mut self) -> Vec<u8> {
        self.mmu.serial.take_buffer()
    }

    pub fn is_cpu_stuck(&self) -> bool {
        self.cpu.is_stuck
    }

    pub fn title(&self) -> String {
        self.mmu.cartridge.title()
    }

    // Shut the core down. With save set and a battery cartridge, SRAM and RTC state are written
    // out atomically.
    pub fn stop(&mut self, save: bool) -> Result<(), Error> {
        if self.stopped {
            return Ok(());
        }
        if save {
            self.mmu.cartridge.sav()?;
        }
        self.stopped = true;
        Ok(())
    }

    pub fn save_state(&self, w: &mut dyn Write) -> Result<(), Error> {
        state::put_blob(w, STATE_MAGIC)?;
        state::put_byte(w, STATE_VERSION)?;
        self.mmu.cartridge.save_state(w)?;
        self.cpu.save_state(w)?;
        state::put_byte(w, self.mmu.get(0xff0f))?;
        state::put_byte(w, self.mmu.get(0xffff))?;
        self.mmu.timer.save_state(w)?;
        self.mmu.ram.save_state(w)?;
        self.mmu.lcd.save_state(w)?;
        self.mmu.save_state(w)?;
        state::put_qword(w, self.frame_count)
    }

    pub fn load_state(&mut self, r: &mut dyn Read) -> Result<(), Error> {
        let mut magic = [0x00; 5];
        state::get_blob(r, &mut magic)?;
        if &magic != STATE_MAGIC {
            return Err(Error::InvalidState(String::from("bad magic")));
        }
        let version = state::get_byte(r)?;
        if version != STATE_VERSION {
            return Err(Error::InvalidState(format!("unsupported version {}", version)));
        }
        self.mmu.cartridge.load_state(r)?;
        self.cpu.load_state(r)?;
        let intf = state::get_byte(r)?;
        self.mmu.set(0xff0f, intf);
        let inte = state::get_byte(r)?;
        self.mmu.set(0xffff, inte);
        self.mmu.timer.load_state(r)?;
        self.mmu.ram.load_state(r)?;
        self.mmu.lcd.load_state(r)?;
        self.mmu.load_state(r)?;
        self.frame_count = state::get_qword(r)?;
        Ok(())
    }
}

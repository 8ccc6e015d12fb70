/*
 * Evacuation of the loader's runtime region.
 *
 * Snapshot data whose destination falls inside the runtime region is
 * staged in the scratch region at 0x6000 instead, then flushed to the
 * controller SRAM in one move once the staging area is full. The loader
 * keeps using its stack and statics untouched until the context switch,
 * which restores the parked bytes as its very last memory traffic.
 */
use crate::error::FatalError;
use crate::memory::{self, HostMemory, RUNTIME_BASE, RUNTIME_SIZE, SCRATCH_BASE};
use crate::sram::{OffChipSram, EVACUATION_BASE};

// Bounce buffer size for moves between host RAM and controller SRAM.
const MOVE_CHUNK: u16 = 0x40;

pub struct Evacuator {
    evacuating: bool,
    flushed: bool,
    restored: bool,
}

impl Evacuator {
    pub const fn new() -> Self {
        Self {
            evacuating: false,
            flushed: false,
            restored: false,
        }
    }

    /// True between the first intercepted write and the flush.
    pub fn evacuating(&self) -> bool {
        self.evacuating
    }

    pub fn flushed(&self) -> bool {
        self.flushed
    }

    /// Route one byte into the logical map. Runtime-region destinations
    /// land in the scratch region until the flush has happened; anything
    /// else is stored directly.
    pub fn on_write<M: HostMemory>(&mut self, mem: &mut M, addr: u16, byte: u8) {
        if memory::in_runtime_region(addr) && !self.flushed {
            self.evacuating = true;
            mem.write(SCRATCH_BASE + (addr - RUNTIME_BASE), byte);
        } else {
            mem.write(addr, byte);
        }
    }

    /// Park the staged runtime-region bytes in controller SRAM. Runs once,
    /// when the last byte destined for the runtime region has been staged.
    pub fn flush<M: HostMemory, S: OffChipSram>(
        &mut self,
        mem: &M,
        sram: &mut S,
    ) -> Result<(), FatalError> {
        ensure!(!self.flushed, FatalError::InternalError)?;

        let mut chunk = [0u8; MOVE_CHUNK as usize];
        let mut off: u16 = 0;
        while off < RUNTIME_SIZE {
            for (i, slot) in chunk.iter_mut().enumerate() {
                *slot = mem.read(SCRATCH_BASE + off + i as u16);
            }
            sram.write_from(&chunk, EVACUATION_BASE + off)?;
            off += MOVE_CHUNK;
        }

        self.flushed = true;
        self.evacuating = false;
        Ok(())
    }

    /// Read the parked bytes back into the runtime region. Called by the
    /// context switch once the loader will never run again; a no-op when
    /// nothing was evacuated.
    pub fn restore<M: HostMemory, S: OffChipSram>(
        &mut self,
        sram: &mut S,
        mem: &mut M,
    ) -> Result<(), FatalError> {
        if !self.flushed {
            return Ok(());
        }
        ensure!(!self.restored, FatalError::InternalError)?;

        let mut chunk = [0u8; MOVE_CHUNK as usize];
        let mut off: u16 = 0;
        while off < RUNTIME_SIZE {
            sram.read_into(&mut chunk, EVACUATION_BASE + off)?;
            for (i, byte) in chunk.iter().enumerate() {
                mem.write(RUNTIME_BASE + off + i as u16, *byte);
            }
            off += MOVE_CHUNK;
        }

        self.restored = true;
        Ok(())
    }
}

impl Default for Evacuator {
    fn default() -> Self {
        Self::new()
    }
}

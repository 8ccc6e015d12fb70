/*
 * The context switch: the last thing the loader ever does.
 *
 * By the time it runs, the whole snapshot image is in RAM except for the
 * loader's own runtime region, which is parked in controller SRAM. The
 * switch builds a short trampoline in video RAM, programs the peripheral
 * registers the snapshot recorded, restores the parked region and leaps
 * into the loaded program through the trampoline.
 *
 * Everything up to the leap is ordinary code, and every peripheral
 * register (border, sound, paging) is programmed while the loader still
 * owns its stack. The runtime-region restore comes after all of that:
 * once it has run, the stack slots under SP hold the loaded program's
 * bytes, so not a single call or return may execute any more. The leap
 * is therefore the only thing left: one machine-specific primitive,
 * implemented in assembly by the platform, that pages the loader out,
 * reloads the full Z80 register file and jumps. The trampoline and its
 * two-byte AF staging word in video RAM exist precisely so those final
 * loads need neither the loader's stack nor its statics.
 */
use crate::error::FatalError;
use crate::evacuate::Evacuator;
use crate::header::SnapshotHeader;
use crate::memory::{HostMemory, BITMAP_BASE};
use crate::sram::OffChipSram;

/// Where the trampoline is synthesized: the first bitmap cells. The
/// loaded program's screen refresh repaints this soon enough.
pub const TRAMPOLINE_BASE: u16 = BITMAP_BASE;

/// Trampoline size: LD A,n / IM x / EI or NOP / JP nn.
pub const TRAMPOLINE_LEN: u16 = 8;

/// The stack pointer is parked here for the final `pop af`; the staged
/// AF word sits in the two bytes below.
pub const FINAL_STACK_TOP: u16 = 0x4100;

/// The full architectural state handed to the leap primitive, in the
/// order the final register loads consume it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct CpuState {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub im: u8,
}

impl CpuState {
    pub fn from_header(header: &SnapshotHeader) -> Self {
        Self {
            af: header.af(),
            bc: header.bc(),
            de: header.de(),
            hl: header.hl(),
            af_alt: header.af_alt(),
            bc_alt: header.bc_alt(),
            de_alt: header.de_alt(),
            hl_alt: header.hl_alt(),
            ix: header.ix(),
            iy: header.iy(),
            sp: header.sp(),
            pc: header.pc(),
            i: header.resident.i,
            r: header.effective_r(),
            iff1: header.iff1(),
            im: header.interrupt_mode(),
        }
    }
}

/// Control-port and jump primitives of the host machine: the narrow
/// surface the context switch and the fatal-error stop are built on.
///
/// `leap` is the single post-restore primitive. It pages the native ROM
/// back into the bottom 16K over the loader, performs the final register
/// loads from the given state (the alternate bank first, AF last via the
/// word staged below [`FINAL_STACK_TOP`]) and jumps through the
/// trampoline. On hardware it never returns, and it must run without
/// stack or static accesses outside video RAM: by the time it is called
/// the runtime region already belongs to the loaded program.
pub trait Hardware {
    fn disable_interrupts(&mut self);
    fn set_border(&mut self, color: u8);
    /// Select an AY-3-8912 register on the sound chip's address port.
    fn select_sound_register(&mut self, reg: u8);
    /// Write the data port for the currently selected sound register.
    fn write_sound_register(&mut self, value: u8);
    /// Program the 128K paging port.
    fn set_paging(&mut self, value: u8);
    fn leap(&mut self, state: &CpuState);
    /// Reset into the native ROM BASIC.
    fn exit_to_rom(&mut self);
    fn halt(&mut self);
}

/// Restore the loaded program's machine state and jump into it.
///
/// The restore is deliberately the second-to-last action: everything the
/// snapshot asks of the peripherals happens first, on the loader's own
/// stack, and once the runtime region has been repopulated the only
/// remaining operation is the leap.
pub fn switch_to<M: HostMemory, S: OffChipSram, H: Hardware>(
    mem: &mut M,
    sram: &mut S,
    evacuator: &mut Evacuator,
    hw: &mut H,
    header: &SnapshotHeader,
) -> Result<(), FatalError> {
    let state = CpuState::from_header(header);

    hw.disable_interrupts();
    build_trampoline(mem, &state);

    hw.set_border(header.border_color());
    if let Some((selected, regs)) = header.sound_state() {
        for (reg, value) in regs.iter().enumerate() {
            hw.select_sound_register(reg as u8);
            hw.write_sound_register(*value);
        }
        hw.select_sound_register(selected);
    }
    if let Some(paging) = header.paging() {
        hw.set_paging(paging);
    }

    evacuator.restore(sram, mem)?;
    hw.leap(&state);
    Ok(())
}

/// Synthesize the trampoline and stage the AF word for the final pop.
fn build_trampoline<M: HostMemory>(mem: &mut M, state: &CpuState) {
    let im_opcode = match state.im {
        0 => 0x46,
        1 => 0x56,
        _ => 0x5E,
    };
    let int_opcode = if state.iff1 { 0xFB } else { 0x00 }; // ei / nop
    let [pc_lo, pc_hi] = state.pc.to_le_bytes();
    let [f, a] = state.af.to_le_bytes();

    let code: [u8; TRAMPOLINE_LEN as usize] = [
        0x3E, a, // ld a, n
        0xED, im_opcode, // im 0/1/2
        int_opcode, // ei / nop
        0xC3, pc_lo, pc_hi, // jp nn
    ];
    for (i, byte) in code.iter().enumerate() {
        mem.write(TRAMPOLINE_BASE + i as u16, *byte);
    }

    mem.write(FINAL_STACK_TOP - 2, f);
    mem.write(FINAL_STACK_TOP - 1, a);
}

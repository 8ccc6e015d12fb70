/*
 * The .z80 snapshot header.
 *
 * The resident part is 30 bytes of architectural registers plus a flag
 * byte, laid out exactly as on the wire (16-bit fields low byte first).
 * If the resident PC word is zero, an extended header follows: a length
 * word selecting version 2 or 3, the real PC, a hardware type, the 128K
 * paging register, and the sound chip state. Anything past the first 23
 * extended bytes is ignored.
 */
use bitflags::bitflags;

use crate::error::FatalError;

/// Size of the resident register block.
pub const RESIDENT_HEADER_LEN: usize = 30;

/// Extended-header lengths selecting the version.
pub const EXT_LEN_V2: u16 = 23;
pub const EXT_LEN_V3: u16 = 54;
pub const EXT_LEN_V3X: u16 = 55;

/// Portion of the extended header we keep; the rest is skipped.
pub const EXT_CAPTURE_LEN: usize = 23;

bitflags! {
    /// The flag byte at resident offset 12.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MiscFlags: u8 {
        /// Bit 7 of the R register, stored out of line.
        const R_BIT7 = 0b0000_0001;
        /// Border color, three bits.
        const BORDER = 0b0000_1110;
        const SAMROM = 0b0001_0000;
        /// Version-1 memory image is run-length compressed.
        const COMPRESSED = 0b0010_0000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotVersion {
    V1,
    V2,
    V3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MachineKind {
    Spectrum48 = 0,
    Spectrum128 = 1,
}

/// Resident register block in wire order.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C, packed)]
pub struct ResidentHeader {
    pub a: u8,
    pub f: u8,
    pub bc: [u8; 2],
    pub hl: [u8; 2],
    pub pc: [u8; 2],
    pub sp: [u8; 2],
    pub i: u8,
    pub r: u8,
    pub misc: u8,
    pub de: [u8; 2],
    pub bc_alt: [u8; 2],
    pub de_alt: [u8; 2],
    pub hl_alt: [u8; 2],
    pub a_alt: u8,
    pub f_alt: u8,
    pub iy: [u8; 2],
    pub ix: [u8; 2],
    pub iff1: u8,
    pub iff2: u8,
    pub int_mode: u8,
}

impl ResidentHeader {
    pub fn parse(raw: &[u8; RESIDENT_HEADER_LEN]) -> Self {
        Self {
            a: raw[0],
            f: raw[1],
            bc: [raw[2], raw[3]],
            hl: [raw[4], raw[5]],
            pc: [raw[6], raw[7]],
            sp: [raw[8], raw[9]],
            i: raw[10],
            r: raw[11],
            misc: raw[12],
            de: [raw[13], raw[14]],
            bc_alt: [raw[15], raw[16]],
            de_alt: [raw[17], raw[18]],
            hl_alt: [raw[19], raw[20]],
            a_alt: raw[21],
            f_alt: raw[22],
            iy: [raw[23], raw[24]],
            ix: [raw[25], raw[26]],
            iff1: raw[27],
            iff2: raw[28],
            int_mode: raw[29],
        }
    }
}

/// Captured part of the version 2/3 extension.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C, packed)]
pub struct ExtendedHeader {
    pub pc: [u8; 2],
    pub hw_type: u8,
    pub paging: u8,
    pub reserved: [u8; 2],
    pub sound_reg_select: u8,
    pub sound_regs: [u8; 16],
}

impl ExtendedHeader {
    pub fn parse(raw: &[u8; EXT_CAPTURE_LEN]) -> Self {
        let mut sound_regs = [0u8; 16];
        sound_regs.copy_from_slice(&raw[7..23]);
        Self {
            pc: [raw[0], raw[1]],
            hw_type: raw[2],
            paging: raw[3],
            reserved: [raw[4], raw[5]],
            sound_reg_select: raw[6],
            sound_regs,
        }
    }
}

/// The fully parsed header, owned by the loader until the context switch
/// consumes it.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotHeader {
    pub resident: ResidentHeader,
    pub ext: Option<ExtendedHeader>,
    pub version: SnapshotVersion,
    pub machine: MachineKind,
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self {
            resident: ResidentHeader::default(),
            ext: None,
            version: SnapshotVersion::V1,
            machine: MachineKind::Spectrum48,
        }
    }
}

impl SnapshotHeader {
    pub fn misc(&self) -> MiscFlags {
        MiscFlags::from_bits_truncate(self.resident.misc)
    }

    pub fn af(&self) -> u16 {
        u16::from_le_bytes([self.resident.f, self.resident.a])
    }

    pub fn bc(&self) -> u16 {
        u16::from_le_bytes(self.resident.bc)
    }

    pub fn de(&self) -> u16 {
        u16::from_le_bytes(self.resident.de)
    }

    pub fn hl(&self) -> u16 {
        u16::from_le_bytes(self.resident.hl)
    }

    pub fn af_alt(&self) -> u16 {
        u16::from_le_bytes([self.resident.f_alt, self.resident.a_alt])
    }

    pub fn bc_alt(&self) -> u16 {
        u16::from_le_bytes(self.resident.bc_alt)
    }

    pub fn de_alt(&self) -> u16 {
        u16::from_le_bytes(self.resident.de_alt)
    }

    pub fn hl_alt(&self) -> u16 {
        u16::from_le_bytes(self.resident.hl_alt)
    }

    pub fn ix(&self) -> u16 {
        u16::from_le_bytes(self.resident.ix)
    }

    pub fn iy(&self) -> u16 {
        u16::from_le_bytes(self.resident.iy)
    }

    pub fn sp(&self) -> u16 {
        u16::from_le_bytes(self.resident.sp)
    }

    /// The program counter the loaded program resumes at: the resident
    /// word for version 1, the extension word otherwise.
    pub fn pc(&self) -> u16 {
        match self.ext {
            Some(ext) => u16::from_le_bytes(ext.pc),
            None => u16::from_le_bytes(self.resident.pc),
        }
    }

    /// R with its stored bit 7 folded back in.
    pub fn effective_r(&self) -> u8 {
        let hi = if self.misc().contains(MiscFlags::R_BIT7) {
            0x80
        } else {
            0
        };
        (self.resident.r & 0x7F) | hi
    }

    pub fn border_color(&self) -> u8 {
        (self.resident.misc >> 1) & 0x07
    }

    /// Version-1 memory image compression flag.
    pub fn v1_compressed(&self) -> bool {
        self.misc().contains(MiscFlags::COMPRESSED)
    }

    pub fn iff1(&self) -> bool {
        self.resident.iff1 != 0
    }

    pub fn interrupt_mode(&self) -> u8 {
        self.resident.int_mode & 0x03
    }

    pub fn is_128k(&self) -> bool {
        self.machine == MachineKind::Spectrum128
    }

    /// Last value written to the 128K paging port, honored only when the
    /// hardware type selects a 128K machine.
    pub fn paging(&self) -> Option<u8> {
        match (self.machine, self.ext) {
            (MachineKind::Spectrum128, Some(ext)) => Some(ext.paging),
            _ => None,
        }
    }

    pub fn sound_state(&self) -> Option<(u8, [u8; 16])> {
        match (self.machine, self.ext) {
            (MachineKind::Spectrum128, Some(ext)) => Some((ext.sound_reg_select, ext.sound_regs)),
            _ => None,
        }
    }
}

/// Map an extended header's hardware type onto a machine we can load.
pub fn classify_hw_type(version: SnapshotVersion, hw_type: u8) -> Result<MachineKind, FatalError> {
    match (version, hw_type) {
        (_, 0) | (_, 1) => Ok(MachineKind::Spectrum48),
        (SnapshotVersion::V2, 3) | (SnapshotVersion::V2, 4) => Ok(MachineKind::Spectrum128),
        (SnapshotVersion::V3, 4) | (SnapshotVersion::V3, 5) | (SnapshotVersion::V3, 6) => {
            Ok(MachineKind::Spectrum128)
        }
        _ => Err(FatalError::Incompatible),
    }
}

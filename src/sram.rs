/*
 * The Ethernet controller's 8K on-chip SRAM, used as an opaque byte
 * store. The controller keeps its packet buffers in the low part; the
 * top of the address space is reserved for the evacuated runtime region.
 * The two ranges never overlap.
 */
use crate::error::FatalError;

/// Size of the addressable off-chip region.
pub const SRAM_SIZE: u16 = 0x2000;

/// Where the evacuated runtime region is parked.
#[cfg(not(feature = "dgboot"))]
pub const EVACUATION_BASE: u16 = 0x1800;
#[cfg(feature = "dgboot")]
pub const EVACUATION_BASE: u16 = 0x1400;

/// Bulk access to the controller SRAM.
///
/// Implementations sit on top of the SPI driver and may keep the
/// controller's auto-increment read/write pointers to make sequential
/// transfers cheap; the contract here is only offset + length. The single
/// failure mode is the controller not becoming ready within a bounded
/// time, which is terminal.
pub trait OffChipSram {
    fn read_into(&mut self, dst: &mut [u8], src_off: u16) -> Result<(), FatalError>;
    fn write_from(&mut self, src: &[u8], dst_off: u16) -> Result<(), FatalError>;
}

/// Bounds check shared by implementations.
pub fn check_range(off: u16, len: usize) -> Result<(), FatalError> {
    ensure!(
        (off as usize) + len <= SRAM_SIZE as usize,
        FatalError::InternalError
    )
}

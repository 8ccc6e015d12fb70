/*
 * Block delivery from the TFTP collaborator. One stateless entry point:
 * the network stack calls it for every DATA block, in file order, and
 * acknowledges the block once the parser has taken it.
 */
use crate::boot::Loader;
use crate::error::FatalError;
use crate::memory::HostMemory;
use crate::sram::OffChipSram;

/// TFTP DATA payload size; the final block of a transfer is shorter.
pub const TFTP_BLOCK_SIZE: usize = 512;

/// Acknowledgement hook back into the TFTP collaborator.
pub trait TftpAck {
    fn ack(&mut self);
}

/// Feed one received block to the snapshot parser and acknowledge it.
/// `more` is false on the final block of the transfer, at which point the
/// snapshot must be complete.
pub fn on_tftp_block<M: HostMemory, S: OffChipSram, A: TftpAck>(
    loader: &mut Loader,
    mem: &mut M,
    sram: &mut S,
    tftp: &mut A,
    block: &[u8],
    more: bool,
) -> Result<(), FatalError> {
    loader.parser.offer(
        mem,
        sram,
        &mut loader.evacuator,
        &mut loader.progress,
        block,
        more,
    )?;
    tftp.ack();
    if !more {
        ensure!(loader.parser.complete(), FatalError::EndOfData)?;
    }
    Ok(())
}

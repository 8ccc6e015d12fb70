#![allow(dead_code)]
/*
 * Shared harness for the end-to-end tests: array-backed memory and
 * controller SRAM, a hardware recorder, and .z80 file builders.
 */
use speccyboot::boot::Loader;
use speccyboot::context::{CpuState, Hardware};
use speccyboot::error::FatalError;
use speccyboot::memory::HostMemory;
use speccyboot::sram::{check_range, OffChipSram};
use speccyboot::tftp::{on_tftp_block, TftpAck, TFTP_BLOCK_SIZE};

pub struct TestMemory {
    pub bytes: Vec<u8>,
}

impl TestMemory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; 0x10000],
        }
    }
}

impl HostMemory for TestMemory {
    fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }
    fn write(&mut self, addr: u16, byte: u8) {
        self.bytes[addr as usize] = byte;
    }
    fn select_high_bank(&mut self, _bank: u8) {}
}

/// 128K memory model: banks 5 and 2 are statically visible at 0x4000 and
/// 0x8000 (stored in `low`), the selected bank appears at 0xC000.
pub struct BankedMemory {
    pub low: Vec<u8>,
    pub banks: Vec<Vec<u8>>,
    pub selected: u8,
}

impl BankedMemory {
    pub fn new() -> Self {
        Self {
            low: vec![0; 0xC000],
            banks: vec![vec![0; 0x4000]; 8],
            selected: 0,
        }
    }
}

impl HostMemory for BankedMemory {
    fn read(&self, addr: u16) -> u8 {
        if addr >= 0xC000 {
            self.banks[self.selected as usize][(addr - 0xC000) as usize]
        } else {
            self.low[addr as usize]
        }
    }
    fn write(&mut self, addr: u16, byte: u8) {
        if addr >= 0xC000 {
            self.banks[self.selected as usize][(addr - 0xC000) as usize] = byte;
        } else {
            self.low[addr as usize] = byte;
        }
    }
    fn select_high_bank(&mut self, bank: u8) {
        self.selected = bank;
    }
}

pub struct TestSram {
    pub bytes: Vec<u8>,
}

impl TestSram {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; 0x2000],
        }
    }
}

impl OffChipSram for TestSram {
    fn read_into(&mut self, dst: &mut [u8], src_off: u16) -> Result<(), FatalError> {
        check_range(src_off, dst.len())?;
        dst.copy_from_slice(&self.bytes[src_off as usize..src_off as usize + dst.len()]);
        Ok(())
    }
    fn write_from(&mut self, src: &[u8], dst_off: u16) -> Result<(), FatalError> {
        check_range(dst_off, src.len())?;
        self.bytes[dst_off as usize..dst_off as usize + src.len()].copy_from_slice(src);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HwOp {
    DisableInterrupts,
    SetBorder(u8),
    SelectSound(u8),
    WriteSound(u8),
    SetPaging(u8),
    Leap(CpuState),
    ExitToRom,
    Halt,
}

#[derive(Default)]
pub struct RecordingHardware {
    pub ops: Vec<HwOp>,
}

impl RecordingHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaped(&self) -> Option<CpuState> {
        self.ops.iter().find_map(|op| match op {
            HwOp::Leap(state) => Some(*state),
            _ => None,
        })
    }

    pub fn border(&self) -> Option<u8> {
        self.ops.iter().rev().find_map(|op| match op {
            HwOp::SetBorder(color) => Some(*color),
            _ => None,
        })
    }
}

impl Hardware for RecordingHardware {
    fn disable_interrupts(&mut self) {
        self.ops.push(HwOp::DisableInterrupts);
    }
    fn set_border(&mut self, color: u8) {
        self.ops.push(HwOp::SetBorder(color));
    }
    fn select_sound_register(&mut self, reg: u8) {
        self.ops.push(HwOp::SelectSound(reg));
    }
    fn write_sound_register(&mut self, value: u8) {
        self.ops.push(HwOp::WriteSound(value));
    }
    fn set_paging(&mut self, value: u8) {
        self.ops.push(HwOp::SetPaging(value));
    }
    fn leap(&mut self, state: &CpuState) {
        self.ops.push(HwOp::Leap(*state));
    }
    fn exit_to_rom(&mut self) {
        self.ops.push(HwOp::ExitToRom);
    }
    fn halt(&mut self) {
        self.ops.push(HwOp::Halt);
    }
}

#[derive(Default)]
pub struct CountingAck {
    pub count: usize,
}

impl TftpAck for CountingAck {
    fn ack(&mut self) {
        self.count += 1;
    }
}

/// Resident 30-byte header with the given PC and flag byte, IM 1.
pub fn resident_header(pc: u16, misc: u8) -> [u8; 30] {
    let mut raw = [0u8; 30];
    raw[6] = (pc & 0xFF) as u8;
    raw[7] = (pc >> 8) as u8;
    raw[12] = misc;
    raw[29] = 0x01;
    raw
}

/// Extension body: real PC, hardware type, rest zeroed.
pub fn v2_body(hw_type: u8, ext_pc: u16) -> [u8; 23] {
    let mut body = [0u8; 23];
    body[0] = (ext_pc & 0xFF) as u8;
    body[1] = (ext_pc >> 8) as u8;
    body[2] = hw_type;
    body
}

/// Version 2 file: zeroed resident header plus extension, then chunks.
pub fn v2_file(hw_type: u8, ext_pc: u16, chunks: &[Vec<u8>]) -> Vec<u8> {
    v2_file_with_body(v2_body(hw_type, ext_pc), chunks)
}

pub fn v2_file_with_body(body: [u8; 23], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut file = resident_header(0, 0).to_vec();
    file.extend_from_slice(&[23, 0]);
    file.extend_from_slice(&body);
    for chunk in chunks {
        file.extend_from_slice(chunk);
    }
    file
}

/// Raw 16K chunk (length sentinel 0xFFFF).
pub fn raw_chunk(page: u8, data: &[u8]) -> Vec<u8> {
    assert_eq!(data.len(), 0x4000);
    let mut out = vec![0xFF, 0xFF, page];
    out.extend_from_slice(data);
    out
}

/// Compressed chunk around an already-encoded payload.
pub fn compressed_chunk(page: u8, encoded: &[u8]) -> Vec<u8> {
    assert!(encoded.len() < 0x4000);
    let len = encoded.len() as u16;
    let mut out = vec![(len & 0xFF) as u8, (len >> 8) as u8, page];
    out.extend_from_slice(encoded);
    out
}

/// Run-length encode with the doubled-escape scheme: `ED ED count value`,
/// count byte 0 standing for 256. Escape bytes are always safe: a lone ED
/// is emitted as a literal (the byte after it is never ED), a repeated ED
/// always becomes a run.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        let mut run = 1;
        while i + run < data.len() && data[i + run] == b && run < 256 {
            run += 1;
        }
        let count = if run == 256 { 0 } else { run as u8 };
        if b == 0xED {
            if run == 1 {
                out.push(0xED);
            } else {
                out.extend_from_slice(&[0xED, 0xED, count, 0xED]);
            }
        } else if run >= 5 {
            out.extend_from_slice(&[0xED, 0xED, count, b]);
        } else {
            out.resize(out.len() + run, b);
        }
        i += run;
    }
    out
}

/// Deliver a file the way TFTP does: 512-byte blocks in order, the
/// transfer ending on the first short block (an empty one if the file
/// length is an exact multiple).
pub fn deliver<M: HostMemory, S: OffChipSram>(
    loader: &mut Loader,
    mem: &mut M,
    sram: &mut S,
    file: &[u8],
) -> Result<usize, FatalError> {
    let mut ack = CountingAck::default();
    for block in file.chunks(TFTP_BLOCK_SIZE) {
        let more = block.len() == TFTP_BLOCK_SIZE;
        on_tftp_block(loader, mem, sram, &mut ack, block, more)?;
    }
    if file.len() % TFTP_BLOCK_SIZE == 0 {
        on_tftp_block(loader, mem, sram, &mut ack, &[], false)?;
    }
    Ok(ack.count)
}

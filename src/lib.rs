#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod debug;
#[macro_use]
pub mod error;

pub mod boot;
pub mod context;
pub mod evacuate;
pub mod header;
pub mod memory;
pub mod parser;
pub mod progress;
pub mod sram;
pub mod tftp;
pub mod timer;

pub use boot::{boot, fatal, netboot, BootKey, Keyboard, Loader, NetConfig, NetStack};
pub use context::{switch_to, CpuState, Hardware};
pub use error::FatalError;
pub use evacuate::Evacuator;
pub use header::SnapshotHeader;
pub use memory::{DirectMemory, HostMemory};
pub use parser::SnapshotParser;
pub use progress::Progress;
pub use sram::OffChipSram;
pub use tftp::{on_tftp_block, TftpAck};

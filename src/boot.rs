/*
 * The boot pipeline. One task owns one Loader for the whole boot cycle:
 * wait for a key, bring the network up through the external stack, let
 * TFTP stream the snapshot through the parser, then hand everything to
 * the context switch. The switch is the last call made on the record.
 *
 * All failures funnel into the fatal stop: border set to the kind's
 * palette value, interrupts off, machine halted until power-cycle.
 */
use core::fmt::{self, Display};

use heapless::String;

use crate::context::{self, Hardware};
use crate::error::FatalError;
use crate::evacuate::Evacuator;
use crate::memory::HostMemory;
use crate::parser::SnapshotParser;
use crate::progress::Progress;
use crate::sram::OffChipSram;

/// Longest boot filename we accept from BOOTP/DHCP.
pub const MAX_FILENAME: usize = 128;

pub const DEFAULT_SNAPSHOT_NAME: &str = "menu.z80";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ipv4(pub [u8; 4]);

impl Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

/// What BOOTP/DHCP hands back: who we are, who serves us, what to fetch.
#[derive(Clone, Debug, Default)]
pub struct NetConfig {
    pub local_ip: Ipv4,
    pub server_ip: Ipv4,
    pub filename: String<MAX_FILENAME>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootKey {
    /// "J": fetch a snapshot over the network.
    NetBoot,
    /// ENTER: leave for the native ROM BASIC.
    RomBasic,
}

/// Polled keyboard rows. Only the boot row matters here; the platform
/// scans it and reports which of the two entry keys is down.
pub trait Keyboard {
    fn poll(&mut self) -> Option<BootKey>;
}

/// The external network stack: BOOTP/DHCP configuration followed by the
/// TFTP transfer. `fetch` must deliver the file's data blocks in order
/// through [`crate::tftp::on_tftp_block`].
pub trait NetStack<M: HostMemory, S: OffChipSram> {
    fn configure(&mut self) -> Result<NetConfig, FatalError>;
    fn fetch(
        &mut self,
        config: &NetConfig,
        loader: &mut Loader,
        mem: &mut M,
        sram: &mut S,
    ) -> Result<(), FatalError>;
}

/// Everything the boot task mutates, in one place.
pub struct Loader {
    pub parser: SnapshotParser,
    pub evacuator: Evacuator,
    pub progress: Progress,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            parser: SnapshotParser::new(),
            evacuator: Evacuator::new(),
            progress: Progress::new(),
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Acquire an address, stream the snapshot, switch into it.
pub fn netboot<M, S, H, N>(
    mem: &mut M,
    sram: &mut S,
    hw: &mut H,
    net: &mut N,
) -> Result<(), anyhow::Error>
where
    M: HostMemory,
    S: OffChipSram,
    H: Hardware,
    N: NetStack<M, S>,
{
    let mut loader = Loader::new();

    let config = net.configure()?;
    debug!(
        "{} booting \"{}\" from {}",
        config.local_ip, config.filename, config.server_ip
    );

    net.fetch(&config, &mut loader, mem, sram)?;
    ensure!(loader.parser.complete(), FatalError::EndOfData)?;
    debug!("snapshot loaded, {}K", loader.parser.kilobytes_loaded());

    let header = *loader.parser.header();
    context::switch_to(mem, sram, &mut loader.evacuator, hw, &header)?;
    Ok(())
}

/// Entry point of the boot task: dispatch on the key the user holds.
pub fn boot<M, S, K, H, N>(mem: &mut M, sram: &mut S, keyboard: &mut K, hw: &mut H, net: &mut N)
where
    M: HostMemory,
    S: OffChipSram,
    K: Keyboard,
    H: Hardware,
    N: NetStack<M, S>,
{
    let key = loop {
        if let Some(key) = keyboard.poll() {
            break key;
        }
    };

    match key {
        BootKey::RomBasic => hw.exit_to_rom(),
        BootKey::NetBoot => {
            if let Err(err) = netboot(mem, sram, hw, net) {
                let kind = err
                    .downcast_ref::<FatalError>()
                    .copied()
                    .unwrap_or(FatalError::InternalError);
                fatal(hw, kind);
            }
        }
    }
}

/// Terminal stop: palette-coded border, interrupts off, halt.
pub fn fatal<H: Hardware>(hw: &mut H, err: FatalError) {
    debug!("fatal: {}", err);
    hw.disable_interrupts();
    hw.set_border(err.border_color());
    hw.halt();
}

/*
 * Fatal error kinds. Every failure in the boot path is terminal: the
 * handler paints the border with the kind's palette value, disables
 * interrupts and stops the machine. There is no recovery short of a
 * power cycle, so none of these carry retry information.
 */
use core::{error::Error, fmt::Display};

use crate::memory::{BLUE, CYAN, MAGENTA, RED, WHITE, YELLOW};

/// Guard a precondition, failing out with the given kind.
macro_rules! ensure {
    ($cond:expr, $error:expr) => {
        if $cond {
            Ok(())
        } else {
            Err($error)
        }
    };
}

pub(crate) use ensure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// BOOTP/DHCP or ARP stayed silent past the retry budget.
    NoNetworkResponse,
    /// The TFTP server answered with a not-found error.
    FileNotFound,
    /// Snapshot hardware type, chunk page id or header version we cannot load.
    Incompatible,
    /// The boot server's address reply was malformed.
    InvalidBootServer,
    /// SPI timeout, impossible parser state, unreachable branch.
    InternalError,
    /// The transfer ended before the snapshot was complete.
    EndOfData,
}

impl FatalError {
    /// Border palette value shown by the fatal-error stop for this kind.
    pub fn border_color(self) -> u8 {
        match self {
            FatalError::NoNetworkResponse => RED,
            FatalError::FileNotFound => YELLOW,
            FatalError::Incompatible => CYAN,
            FatalError::InvalidBootServer => MAGENTA,
            FatalError::InternalError => WHITE,
            FatalError::EndOfData => BLUE,
        }
    }
}

impl Display for FatalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoNetworkResponse => write!(f, "no response from network"),
            Self::FileNotFound => write!(f, "file not found on boot server"),
            Self::Incompatible => write!(f, "incompatible snapshot"),
            Self::InvalidBootServer => write!(f, "invalid boot server reply"),
            Self::InternalError => write!(f, "internal error"),
            Self::EndOfData => write!(f, "premature end of data"),
        }
    }
}

impl Error for FatalError {}

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::sdk::mcu::pinmux::Pin;

// General stuff

/// Hardware UART instances on the chip.
pub const NUM_UARTS: usize = 3;

/// Depth of the hardware transmit FIFO. Transmission is chunked to this size.
pub const UART_TX_FIFO_SIZE: usize = 16;

/// NVIC priority of the UART receive interrupts.
pub const UART_IRQ_PRIORITY: u8 = 3;

pub const DEFAULT_BAUDRATE: u32 = 115200;

/// Lock wait that never expires.
pub const LOCK_WAIT_FOREVER: u32 = 0xFFFF_FFFF;

/// Polls of the transmit-empty flag before a flush gives up.
pub const DEFAULT_FLUSH_SPIN_LIMIT: u32 = 1 << 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Parity {
    None = 0,
    Odd = 1,
    Even = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StopBits {
    One = 0,
    Two = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WordLength {
    Seven = 0,
    Eight = 1,
}

/// Receive FIFO fill level that raises the "receive data available" interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxTriggerLevel(u8);

impl RxTriggerLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 29;
    pub const DEFAULT: RxTriggerLevel = RxTriggerLevel(16);

    /// `None` unless `level` is within `MIN..=MAX`.
    pub const fn new(level: u8) -> Option<Self> {
        if level >= Self::MIN && level <= Self::MAX {
            Some(RxTriggerLevel(level))
        } else {
            None
        }
    }

    pub const fn level(self) -> u8 {
        self.0
    }
}

/// Silence on the receive line, in byte times, after which the idle flag is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum IdleTime {
    Bytes1 = 0,
    Bytes2 = 1,
    Bytes4 = 2,
    Bytes8 = 3,
    Bytes16 = 4,
    Bytes32 = 5,
    Bytes64 = 6,
    Bytes128 = 7,
    Bytes256 = 8,
    Bytes512 = 9,
    Bytes1024 = 10,
    Bytes2048 = 11,
    Bytes4096 = 12,
    Bytes8192 = 13,
    Bytes16384 = 14,
    Bytes32768 = 15,
}

impl IdleTime {
    /// Maps a byte count to its register code. Only powers of two from 1 to
    /// 32768 are representable.
    pub fn from_bytes(bytes: u32) -> Option<Self> {
        if !bytes.is_power_of_two() {
            return None;
        }
        IdleTime::from_u32(bytes.trailing_zeros())
    }

    pub const fn bytes(self) -> u32 {
        1 << self as u32
    }
}

/// Pads used by one UART. Either may be `Pin::NC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pads {
    pub tx: Pin,
    pub rx: Pin,
}

/// Line and pad setup of one UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub pads: Pads,
    pub baudrate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub word_length: WordLength,
    pub rx_trigger_level: RxTriggerLevel,
    pub idle_time: IdleTime,
    /// Longest time a transmit waits for the lock, in milliseconds
    pub lock_wait_ms: u32,
    /// Polls of the transmit-empty flag before a flush gives up
    pub flush_spin_limit: u32,
}

impl UartConfig {
    /// 115200 8N1 on `pads`.
    pub const fn new(pads: Pads) -> Self {
        Self {
            pads,
            baudrate: DEFAULT_BAUDRATE,
            parity: Parity::None,
            stop_bits: StopBits::One,
            word_length: WordLength::Eight,
            rx_trigger_level: RxTriggerLevel::DEFAULT,
            idle_time: IdleTime::Bytes2,
            lock_wait_ms: LOCK_WAIT_FOREVER,
            flush_spin_limit: DEFAULT_FLUSH_SPIN_LIMIT,
        }
    }

    pub const fn baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub const fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub const fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub const fn word_length(mut self, word_length: WordLength) -> Self {
        self.word_length = word_length;
        self
    }

    pub const fn rx_trigger_level(mut self, level: RxTriggerLevel) -> Self {
        self.rx_trigger_level = level;
        self
    }

    pub const fn idle_time(mut self, idle_time: IdleTime) -> Self {
        self.idle_time = idle_time;
        self
    }

    pub const fn lock_wait_ms(mut self, wait_ms: u32) -> Self {
        self.lock_wait_ms = wait_ms;
        self
    }

    pub const fn flush_spin_limit(mut self, limit: u32) -> Self {
        self.flush_spin_limit = limit;
        self
    }
}

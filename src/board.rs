//! Pad assignment of the development board.

use crate::config::Pads;
use crate::sdk::mcu::pinmux::{Pin, P0_6, P3_0, P3_1};

pub const BOARD_NAME: &str = "devboard";
pub const MCU_NAME: &str = "RTL8762CKF";

pub const BOARD_TX_PAD: Pin = P3_0;
pub const BOARD_RX_PAD: Pin = P3_1;

pub const LED_PAD: Pin = P0_6;

/// Pads of the board's debug UART.
pub const fn board_pads() -> Pads {
    Pads { tx: BOARD_TX_PAD, rx: BOARD_RX_PAD }
}

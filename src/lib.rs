#![cfg_attr(not(test), no_std)]

// must stay first, the logging macros are textually scoped
#[macro_use]
mod fmt;

pub mod sdk;

pub mod board;
pub mod config;
pub mod error;
pub mod sync;

pub use config::{IdleTime, Pads, Parity, RxTriggerLevel, StopBits, UartConfig, WordLength};
pub use error::UartError;
pub use sdk::drivers::baud::{solve as baud_solve, BaudConfig};
pub use sdk::drivers::uart::{
    dispatch, uart_vector, InitStatus, RxBuffer, Uart, UartInstance, UartIrqHandler, UartRegistry, UART0, UART1,
    UART2, UART_REGISTRY, UART_VECTORS,
};
pub use sdk::mcu::pinmux::Pin;

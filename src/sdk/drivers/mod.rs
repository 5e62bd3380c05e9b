pub mod baud;
pub mod uart;
pub mod uart_periph;

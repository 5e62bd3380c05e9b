use paste::paste;

use crate::config::NUM_UARTS;
use crate::sdk::mcu::irq_i::IrqChannel;
use crate::sdk::mcu::pinmux::{self, PinFunction};
use crate::sdk::mcu::rcc::RccPeriph;
use crate::sdk::mcu::register::{UART0_REG_BASE, UART1_REG_BASE, UART2_REG_BASE};

/// Fixed description of one hardware UART.
#[derive(Debug, PartialEq, Eq)]
pub struct UartInstance {
    pub index: usize,
    pub base: u32,
    pub rcc: RccPeriph,
    pub irq: IrqChannel,
    pub tx_function: PinFunction,
    pub rx_function: PinFunction,
    pub cts_function: PinFunction,
    pub rts_function: PinFunction,
}

macro_rules! uart_instance {
    ( $n:literal ) => {
        paste! {
            pub static [<UART $n>]: UartInstance = UartInstance {
                index: $n,
                base: [<UART $n _REG_BASE>],
                rcc: RccPeriph::[<UART $n>],
                irq: IrqChannel::[<UART $n>],
                tx_function: pinmux::[<UART $n _TX>],
                rx_function: pinmux::[<UART $n _RX>],
                cts_function: pinmux::[<UART $n _CTS>],
                rts_function: pinmux::[<UART $n _RTS>],
            };
        }
    };
}

uart_instance!(0);
uart_instance!(1);
uart_instance!(2);

pub static UART_INSTANCES: [&UartInstance; NUM_UARTS] = [&UART0, &UART1, &UART2];

/// Looks up the descriptor of UART `index`.
pub fn uart_instance(index: usize) -> Option<&'static UartInstance> {
    UART_INSTANCES.get(index).copied()
}

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::config::NUM_UARTS;
use crate::sdk::drivers::uart::Uart;
use crate::sdk::drivers::uart_periph::{
    uart_get_flag_state, uart_get_iid, uart_get_rx_fifo_len, uart_int_config, uart_receive_byte, UartFlag, UartInt,
};
use crate::sdk::mcu::irq_i::IrqHandler;
use crate::sdk::mcu::register::FLD_UART_INTID;

/// Interrupt causes reported in the interrupt identification register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
enum IntId {
    TxEmpty = 0x02,
    RxLevelReached = 0x04,
    LineStatus = 0x06,
    RxTimeout = 0x0C,
}

/// Something that services the interrupt of one UART.
pub trait UartIrqHandler: Sync {
    fn on_interrupt(&self);
}

type Slot = Mutex<Cell<Option<&'static dyn UartIrqHandler>>>;

/// Maps a UART index to the driver that services its interrupt.
pub struct UartRegistry {
    slots: [Slot; NUM_UARTS],
}

impl UartRegistry {
    pub const fn new() -> Self {
        const EMPTY: Slot = Mutex::new(Cell::new(None));
        Self { slots: [EMPTY; NUM_UARTS] }
    }

    /// Installs `handler` for UART `index`, replacing any previous one.
    /// Returns `false` if there is no such UART.
    pub fn register(&self, index: usize, handler: &'static dyn UartIrqHandler) -> bool {
        match self.slots.get(index) {
            Some(slot) => {
                critical_section::with(|cs| slot.borrow(cs).set(Some(handler)));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&'static dyn UartIrqHandler> {
        let slot = self.slots.get(index)?;
        critical_section::with(|cs| slot.borrow(cs).get())
    }
}

impl Default for UartRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub static UART_REGISTRY: UartRegistry = UartRegistry::new();

/// Runs the handler registered for UART `index` in `registry`, if any.
pub fn dispatch_from(registry: &UartRegistry, index: usize) {
    if let Some(handler) = registry.get(index) {
        handler.on_interrupt();
    }
}

pub fn dispatch(index: usize) {
    dispatch_from(&UART_REGISTRY, index)
}

/// Interrupt entry point of UART `INDEX`.
pub extern "C" fn uart_vector<const INDEX: usize>() {
    dispatch(INDEX)
}

/// Entry points of all UARTs, by index.
pub static UART_VECTORS: [IrqHandler; NUM_UARTS] = [uart_vector::<0>, uart_vector::<1>, uart_vector::<2>];

impl<const RX_LEN: usize, const TX_LEN: usize> Uart<RX_LEN, TX_LEN> {
    /// Services one UART interrupt.
    ///
    /// # Notes
    ///
    /// * Runs with all interrupts masked
    /// * The idle callback runs before the FIFO is drained, so it only sees bytes
    ///   that arrived in earlier interrupts
    /// * The FIFO is always drained completely; bytes that do not fit the
    ///   receive buffer are counted as overruns
    fn handle_interrupt(&self) {
        let base = self.instance.base;

        critical_section::with(|cs| {
            let iid = uart_get_iid(base);
            uart_int_config(base, UartInt::RD_AVA | UartInt::LINE_STS, false);

            if uart_get_flag_state(base, UartFlag::RX_IDLE) {
                uart_int_config(base, UartInt::RX_IDLE, false);
                if let Some(callback) = self.rx_callback {
                    callback(self);
                }
                uart_int_config(base, UartInt::RX_IDLE, true);
            }

            match IntId::from_u32(iid & FLD_UART_INTID::INT_ID.bits()) {
                Some(IntId::RxTimeout) | Some(IntId::RxLevelReached) => self.drain_fifo(cs),
                // line status and tx empty need no buffer work
                Some(IntId::LineStatus) | Some(IntId::TxEmpty) | None => {}
            }

            uart_int_config(base, UartInt::RD_AVA, true);
        });
    }

    fn drain_fifo(&self, cs: CriticalSection) {
        let base = self.instance.base;
        let mut rx = self.rx.borrow_ref_mut(cs);

        for _ in 0..uart_get_rx_fifo_len(base) {
            rx.push(uart_receive_byte(base));
        }
    }
}

impl<const RX_LEN: usize, const TX_LEN: usize> UartIrqHandler for Uart<RX_LEN, TX_LEN> {
    fn on_interrupt(&self) {
        self.handle_interrupt()
    }
}

//! Interrupt driven UART driver.
//!
//! A [`Uart`] lives in a `static` for the whole program. After
//! [`Uart::initialize`] received bytes are collected by the interrupt handler
//! into a fixed size buffer, and transmission blocks the calling task on an
//! RTOS mutex until every byte is in the hardware FIFO.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{String, Vec};

use crate::config::{UartConfig, UART_IRQ_PRIORITY};
use crate::error::UartError;
use crate::sdk::drivers::baud::{solve, BaudConfig};
use crate::sdk::drivers::uart_periph::{uart_hw_init, uart_int_config, UartInitParams, UartInt};
use crate::sdk::mcu::irq_i::{nvic_init, ram_vector_table_update};
use crate::sdk::mcu::pinmux::{pad_config, pinmux_config, PadConfig, Pin, PinFunction};
use crate::sdk::mcu::rcc::rcc_periph_set;
use crate::sync::OsMutex;

pub mod instance;
pub mod irq;
pub mod tx;

pub use instance::{uart_instance, UartInstance, UART0, UART1, UART2, UART_INSTANCES};
pub use irq::{dispatch, dispatch_from, uart_vector, UartIrqHandler, UartRegistry, UART_REGISTRY, UART_VECTORS};

/// How initialization configured the baud generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// Baud rate programmed as requested
    Configured,
    /// The requested baud rate is unreachable, the reset default (115200) was
    /// programmed instead
    BaudRateFallback,
}

/// Bytes received by the interrupt handler.
#[derive(Debug)]
pub struct RxBuffer<const N: usize> {
    data: Vec<u8, N>,
    overruns: u32,
}

impl<const N: usize> RxBuffer<N> {
    pub const fn new() -> Self {
        Self { data: Vec::new(), overruns: 0 }
    }

    /// Appends `byte`, or counts it as an overrun when full.
    fn push(&mut self, byte: u8) {
        if self.data.push(byte).is_err() {
            self.overruns = self.overruns.saturating_add(1);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.is_full()
    }

    /// Bytes dropped because the buffer was full, since start up.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Discards the received bytes. The overrun count is kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Moves the oldest bytes into `out` and returns how many were moved.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.data.len());
        out[..n].copy_from_slice(&self.data[..n]);

        let remaining = self.data.len() - n;
        self.data.copy_within(n.., 0);
        self.data.truncate(remaining);
        n
    }
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Driver state of one UART.
///
/// `RX_LEN` is the capacity of the receive buffer, `TX_LEN` the capacity of the
/// staging buffer used by formatted output.
pub struct Uart<const RX_LEN: usize, const TX_LEN: usize> {
    instance: &'static UartInstance,
    config: UartConfig,
    rx: Mutex<RefCell<RxBuffer<RX_LEN>>>,
    tx: OsMutex<String<TX_LEN>>,
    rx_callback: Option<fn(&Uart<RX_LEN, TX_LEN>)>,
}

impl<const RX_LEN: usize, const TX_LEN: usize> Uart<RX_LEN, TX_LEN> {
    pub const fn new(instance: &'static UartInstance, config: UartConfig) -> Self {
        Self::build(instance, config, None)
    }

    /// Same as `new`, plus a callback the interrupt handler invokes when the
    /// receive line goes idle. The callback runs in interrupt context.
    pub const fn with_rx_callback(
        instance: &'static UartInstance,
        config: UartConfig,
        callback: fn(&Uart<RX_LEN, TX_LEN>),
    ) -> Self {
        Self::build(instance, config, Some(callback))
    }

    const fn build(
        instance: &'static UartInstance,
        config: UartConfig,
        rx_callback: Option<fn(&Uart<RX_LEN, TX_LEN>)>,
    ) -> Self {
        Self {
            instance,
            config,
            rx: Mutex::new(RefCell::new(RxBuffer::new())),
            tx: OsMutex::new(String::new()),
            rx_callback,
        }
    }

    pub fn instance(&self) -> &'static UartInstance {
        self.instance
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Brings up the UART and registers it with the global interrupt registry.
    ///
    /// See [`Uart::initialize_in`].
    pub fn initialize(&'static self) -> Result<InitStatus, UartError> {
        self.initialize_in(&irq::UART_REGISTRY)
    }

    /// Brings up the UART, registering it for interrupts in `registry`.
    ///
    /// # Steps
    ///
    /// 1. Register for interrupt dispatch, replacing any earlier driver of the
    ///    same UART
    /// 2. Create the transmit mutex
    /// 3. Route the tx and rx pads, skipping unassigned ones
    /// 4. Enable the peripheral clock
    /// 5. Program baud rate and line settings
    /// 6. With an rx pad: enable the receive and idle interrupts, install the
    ///    interrupt vector and enable the interrupt in the NVIC
    ///
    /// # Returns
    ///
    /// * `Ok(InitStatus::Configured)` on success
    /// * `Ok(InitStatus::BaudRateFallback)` if the baud rate had to fall back to the
    ///   reset default
    /// * `Err(UartError::InvalidInstance)` if the instance index is out of range;
    ///   nothing is touched
    /// * `Err(UartError::MutexCreateFailed)` if the RTOS mutex could not be
    ///   created; the hardware is left untouched
    pub fn initialize_in(&'static self, registry: &UartRegistry) -> Result<InitStatus, UartError> {
        let index = self.instance.index;
        let base = self.instance.base;

        if !registry.register(index, self) {
            error!("uart{}: no such instance", index);
            return Err(UartError::InvalidInstance);
        }

        if !self.tx.create() {
            error!("uart{}: mutex create failed", index);
            return Err(UartError::MutexCreateFailed);
        }

        self.pinmux();

        rcc_periph_set(self.instance.rcc, true);

        let (baud, status) = match solve(self.config.baudrate) {
            Some(baud) => (baud, InitStatus::Configured),
            None => {
                warn!("uart{}: baud rate {} unreachable, using reset default", index, self.config.baudrate);
                (BaudConfig::RESET_DEFAULT, InitStatus::BaudRateFallback)
            }
        };

        uart_hw_init(
            base,
            UartInitParams {
                baud,
                parity: self.config.parity,
                stop_bits: self.config.stop_bits,
                word_length: self.config.word_length,
                rx_trigger_level: self.config.rx_trigger_level,
                idle_time: self.config.idle_time,
            },
        );

        if self.config.pads.rx.is_valid() {
            uart_int_config(base, UartInt::RD_AVA | UartInt::RX_IDLE, true);

            let irq = self.instance.irq;
            if let Some(&vector) = UART_VECTORS.get(index) {
                if !ram_vector_table_update(irq.vector(), vector) {
                    debug!("uart{}: vector table not updated", index);
                }
            }
            nvic_init(irq, UART_IRQ_PRIORITY, true);
        }

        info!("uart{}: initialized at {} baud", index, baud.effective_baud());
        Ok(status)
    }

    fn pinmux(&self) {
        let pads = self.config.pads;
        Self::route_pad(pads.tx, self.instance.tx_function);
        Self::route_pad(pads.rx, self.instance.rx_function);
    }

    fn route_pad(pin: Pin, function: PinFunction) {
        if pin.is_valid() {
            pad_config(pin, PadConfig::PERIPHERAL_PULL_UP);
            pinmux_config(pin, function);
        }
    }

    /// Runs `f` on the receive buffer with interrupts masked.
    pub fn with_rx<R>(&self, f: impl FnOnce(&mut RxBuffer<RX_LEN>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.rx.borrow_ref_mut(cs)))
    }

    pub fn rx_count(&self) -> usize {
        self.with_rx(|rx| rx.len())
    }

    /// Moves received bytes into `out`, oldest first. Returns the number of bytes moved.
    pub fn drain_rx(&self, out: &mut [u8]) -> usize {
        self.with_rx(|rx| rx.drain_into(out))
    }

    pub fn clear_rx(&self) {
        self.with_rx(|rx| rx.clear())
    }

    pub fn rx_overruns(&self) -> u32 {
        self.with_rx(|rx| rx.overruns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::board_pads;
    use crate::config::{Pads, Parity, StopBits, WordLength};
    use crate::sdk::drivers::uart_periph::{mock_uart_hw_init, mock_uart_int_config};
    use crate::sdk::mcu::irq_i::{mock_nvic_init, mock_ram_vector_table_update, IrqChannel};
    use crate::sdk::mcu::pinmux::{
        mock_pad_config, mock_pinmux_config, P2_4, P3_0, P3_1, UART0_CTS, UART0_RTS, UART0_RX, UART0_TX,
    };
    use crate::sdk::mcu::rcc::{mock_rcc_periph_set, RccPeriph};
    use crate::sdk::mcu::register::{UART0_REG_BASE, UART2_REG_BASE};
    use crate::sync::os::{mock_os_mutex_create, os_mutex_create};

    fn mock_init_hardware(mutex: Option<usize>) {
        mock_os_mutex_create().returns(mutex);
        mock_pad_config(mry::Any, mry::Any).returns(());
        mock_pinmux_config(mry::Any, mry::Any).returns(());
        mock_rcc_periph_set(mry::Any, mry::Any).returns(());
        mock_uart_hw_init(mry::Any, mry::Any).returns(());
        mock_uart_int_config(mry::Any, mry::Any, mry::Any).returns(());
        mock_ram_vector_table_update(mry::Any, mry::Any).returns(true);
        mock_nvic_init(mry::Any, mry::Any, mry::Any).returns(());
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize() {
        mock_init_hardware(Some(1));

        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(&UART0, UartConfig::new(board_pads()))));
        let registry = UartRegistry::new();

        assert_eq!(uart.initialize_in(&registry), Ok(InitStatus::Configured));
        assert!(registry.get(0).is_some());

        mock_pad_config(P3_0, PadConfig::PERIPHERAL_PULL_UP).assert_called(1);
        mock_pad_config(P3_1, PadConfig::PERIPHERAL_PULL_UP).assert_called(1);
        mock_pinmux_config(P3_0, UART0_TX).assert_called(1);
        mock_pinmux_config(P3_1, UART0_RX).assert_called(1);
        mock_rcc_periph_set(RccPeriph::UART0, true).assert_called(1);
        mock_uart_hw_init(
            UART0_REG_BASE,
            UartInitParams {
                baud: BaudConfig { div: 19, ovsr: 13, ovsr_adj: 0x488 },
                parity: Parity::None,
                stop_bits: StopBits::One,
                word_length: WordLength::Eight,
                rx_trigger_level: uart.config().rx_trigger_level,
                idle_time: uart.config().idle_time,
            },
        )
        .assert_called(1);
        mock_uart_int_config(UART0_REG_BASE, UartInt::RD_AVA | UartInt::RX_IDLE, true).assert_called(1);
        mock_ram_vector_table_update(29u8, mry::Any).assert_called(1);
        mock_nvic_init(IrqChannel::UART0, 3u8, true).assert_called(1);
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize_mutex_failure_touches_no_hardware() {
        mock_init_hardware(None);

        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(&UART0, UartConfig::new(board_pads()))));
        let registry = UartRegistry::new();

        assert_eq!(uart.initialize_in(&registry), Err(UartError::MutexCreateFailed));

        // registration happens first
        assert!(registry.get(0).is_some());
        mock_pad_config(mry::Any, mry::Any).assert_called(0);
        mock_rcc_periph_set(mry::Any, mry::Any).assert_called(0);
        mock_uart_hw_init(mry::Any, mry::Any).assert_called(0);
        mock_nvic_init(mry::Any, mry::Any, mry::Any).assert_called(0);
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize_without_rx_pad_arms_no_interrupt() {
        mock_init_hardware(Some(1));

        let config = UartConfig::new(Pads { tx: P2_4, rx: Pin::NC });
        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(&UART2, config)));
        let registry = UartRegistry::new();

        assert_eq!(uart.initialize_in(&registry), Ok(InitStatus::Configured));

        mock_pad_config(P2_4, PadConfig::PERIPHERAL_PULL_UP).assert_called(1);
        mock_pad_config(mry::Any, mry::Any).assert_called(1);
        mock_rcc_periph_set(RccPeriph::UART2, true).assert_called(1);
        mock_uart_hw_init(UART2_REG_BASE, mry::Any).assert_called(1);
        mock_uart_int_config(mry::Any, mry::Any, mry::Any).assert_called(0);
        mock_ram_vector_table_update(mry::Any, mry::Any).assert_called(0);
        mock_nvic_init(mry::Any, mry::Any, mry::Any).assert_called(0);
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize_unreachable_baud_falls_back() {
        mock_init_hardware(Some(1));

        let config = UartConfig::new(board_pads()).baudrate(0);
        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(&UART1, config)));
        let registry = UartRegistry::new();

        assert_eq!(uart.initialize_in(&registry), Ok(InitStatus::BaudRateFallback));

        mock_uart_hw_init(
            UART1.base,
            UartInitParams {
                baud: BaudConfig::RESET_DEFAULT,
                parity: Parity::None,
                stop_bits: StopBits::One,
                word_length: WordLength::Eight,
                rx_trigger_level: config.rx_trigger_level,
                idle_time: config.idle_time,
            },
        )
        .assert_called(1);
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize_twice_creates_mutex_once() {
        mock_init_hardware(Some(1));

        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(&UART0, UartConfig::new(board_pads()))));
        let registry = UartRegistry::new();

        assert!(uart.initialize_in(&registry).is_ok());
        assert!(uart.initialize_in(&registry).is_ok());

        mock_os_mutex_create().assert_called(1);
        mock_uart_hw_init(mry::Any, mry::Any).assert_called(2);
    }

    #[test]
    #[mry::lock(
        os_mutex_create,
        pad_config,
        pinmux_config,
        rcc_periph_set,
        uart_hw_init,
        uart_int_config,
        ram_vector_table_update,
        nvic_init
    )]
    fn test_initialize_out_of_range_instance_touches_nothing() {
        mock_init_hardware(Some(1));

        let instance: &'static UartInstance = Box::leak(Box::new(UartInstance {
            index: 3,
            base: UART0_REG_BASE,
            rcc: RccPeriph::UART0,
            irq: IrqChannel::UART0,
            tx_function: UART0_TX,
            rx_function: UART0_RX,
            cts_function: UART0_CTS,
            rts_function: UART0_RTS,
        }));
        let uart: &'static Uart<32, 64> = Box::leak(Box::new(Uart::new(instance, UartConfig::new(board_pads()))));
        let registry = UartRegistry::new();

        assert_eq!(uart.initialize_in(&registry), Err(UartError::InvalidInstance));

        mock_os_mutex_create().assert_called(0);
        mock_pad_config(mry::Any, mry::Any).assert_called(0);
        mock_rcc_periph_set(mry::Any, mry::Any).assert_called(0);
        mock_uart_hw_init(mry::Any, mry::Any).assert_called(0);
        mock_uart_int_config(mry::Any, mry::Any, mry::Any).assert_called(0);
        mock_nvic_init(mry::Any, mry::Any, mry::Any).assert_called(0);
    }

    #[test]
    fn test_rx_buffer_drain_keeps_rest_in_order() {
        let mut rx: RxBuffer<8> = RxBuffer::new();
        for byte in 1..=5u8 {
            rx.push(byte);
        }

        let mut out = [0u8; 3];
        assert_eq!(rx.drain_into(&mut out), 3);
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(rx.as_slice(), &[4, 5]);

        let mut out = [0u8; 8];
        assert_eq!(rx.drain_into(&mut out), 2);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_rx_buffer_overrun() {
        let mut rx: RxBuffer<2> = RxBuffer::new();
        rx.push(1);
        rx.push(2);
        rx.push(3);

        assert!(rx.is_full());
        assert_eq!(rx.as_slice(), &[1, 2]);
        assert_eq!(rx.overruns(), 1);

        rx.clear();
        assert!(rx.is_empty());
        assert_eq!(rx.overruns(), 1);
    }
}

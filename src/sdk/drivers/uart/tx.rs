use core::fmt::{self, Write};

use crate::config::UART_TX_FIFO_SIZE;
use crate::error::UartError;
use crate::sdk::drivers::uart::Uart;
use crate::sdk::drivers::uart_periph::{uart_get_flag_state, uart_send_data, UartFlag};

/// Writes a string to a [`Uart`], blocking until it is in the transmit FIFO.
///
/// Expands to `Uart::send_str` and evaluates to its `Result`.
#[macro_export]
macro_rules! uart_print {
    ( $uart:expr, $s:expr ) => {
        $uart.send_str($s)
    };
}

/// Formats into the staging buffer of a [`Uart`] and transmits the result.
///
/// Evaluates to `Result<usize, UartError>` with the number of bytes sent.
///
/// ```ignore
/// uart_printf!(DEBUG_UART, "temp={}.{}\r\n", whole, frac)?;
/// ```
#[macro_export]
macro_rules! uart_printf {
    ( $uart:expr, $($arg:tt)* ) => {
        $uart.send_fmt(core::format_args!($($arg)*))
    };
}

impl<const RX_LEN: usize, const TX_LEN: usize> Uart<RX_LEN, TX_LEN> {
    /// Sends `bytes`, blocking the calling task until the last byte is in the
    /// transmit FIFO.
    ///
    /// # Errors
    ///
    /// * `UartError::NotInitialized` / `UartError::LockTimeout` if the transmit
    ///   mutex could not be taken; nothing is sent
    /// * `UartError::FlushTimeout` if the transmitter stopped draining
    ///
    /// # Notes
    ///
    /// * The mutex is held for the whole transfer, and released on every path
    pub fn send(&self, bytes: &[u8]) -> Result<(), UartError> {
        let _guard = self.tx.lock(self.config.lock_wait_ms)?;
        self.transmit(bytes)
    }

    pub fn send_str(&self, s: &str) -> Result<(), UartError> {
        self.send(s.as_bytes())
    }

    /// Renders `args` into the staging buffer and sends it, all while holding
    /// the transmit mutex.
    ///
    /// # Returns
    ///
    /// * `Ok(len)` with the number of bytes rendered and sent; `Ok(0)` for empty
    ///   output, which touches no hardware
    /// * `Err(UartError::FormatOverflow)` if the output does not fit `TX_LEN`;
    ///   nothing is sent
    /// * the errors of [`Uart::send`]
    pub fn send_fmt(&self, args: fmt::Arguments) -> Result<usize, UartError> {
        let mut staging = self.tx.lock(self.config.lock_wait_ms)?;

        staging.clear();
        if staging.write_fmt(args).is_err() {
            return Err(UartError::FormatOverflow);
        }

        let len = staging.len();
        if len > 0 {
            self.transmit(staging.as_bytes())?;
        }
        Ok(len)
    }

    /// Waits until both the holding and the shift register are empty.
    pub fn flush(&self) -> Result<(), UartError> {
        for _ in 0..self.config.flush_spin_limit.max(1) {
            if uart_get_flag_state(self.instance.base, UartFlag::THR_TSR_EMPTY) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(UartError::FlushTimeout)
    }

    // caller holds the transmit mutex
    fn transmit(&self, bytes: &[u8]) -> Result<(), UartError> {
        let base = self.instance.base;

        self.flush()?;

        let mut chunks = bytes.chunks_exact(UART_TX_FIFO_SIZE);
        for chunk in &mut chunks {
            uart_send_data(base, chunk);
            self.flush()?;
        }

        let rest = chunks.remainder();
        if !rest.is_empty() {
            uart_send_data(base, rest);
        }
        Ok(())
    }
}

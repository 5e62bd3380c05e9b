use core::fmt;

use crate::sync::LockError;

/// Failures reported by the UART driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// The RTOS could not provide the transmit lock during initialization
    MutexCreateFailed,
    /// The instance descriptor names a UART the chip does not have
    InvalidInstance,
    /// Transmit on a UART whose lock was never created
    NotInitialized,
    /// The transmit lock could not be taken within the configured wait
    LockTimeout,
    /// The transmitter never reported empty
    FlushTimeout,
    /// Formatted output did not fit the staging buffer
    FormatOverflow,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::MutexCreateFailed => write!(f, "failed to create uart mutex"),
            UartError::InvalidInstance => write!(f, "no such uart instance"),
            UartError::NotInitialized => write!(f, "uart not initialized"),
            UartError::LockTimeout => write!(f, "timed out waiting for uart mutex"),
            UartError::FlushTimeout => write!(f, "timed out waiting for transmitter empty"),
            UartError::FormatOverflow => write!(f, "formatted output exceeds tx buffer"),
        }
    }
}

impl From<LockError> for UartError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::NotCreated => UartError::NotInitialized,
            LockError::Timeout => UartError::LockTimeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_error_conversion() {
        assert_eq!(UartError::from(LockError::NotCreated), UartError::NotInitialized);
        assert_eq!(UartError::from(LockError::Timeout), UartError::LockTimeout);
    }

    #[test]
    fn test_display() {
        assert_eq!(UartError::FormatOverflow.to_string(), "formatted output exceeds tx buffer");
        assert_eq!(UartError::InvalidInstance.to_string(), "no such uart instance");
    }
}

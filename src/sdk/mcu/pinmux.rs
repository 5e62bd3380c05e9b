use crate::sdk::mcu::register::{read_reg_pinmux_cfg, write_reg_pinmux_cfg};

/// Number of pads on the package. Pad indices at or above this value are
/// treated as "not connected".
pub const TOTAL_PIN_NUM: u8 = 39;

/// A pad index, or the explicit "not connected" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin(u8);

impl Pin {
    /// Marks a signal as unassigned.
    pub const NC: Pin = Pin(0xFF);

    pub const fn new(index: u8) -> Self {
        Pin(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// `true` for a real pad, `false` for `NC` or any other out of range index
    pub const fn is_valid(self) -> bool {
        self.0 < TOTAL_PIN_NUM
    }
}

pub const P0_0: Pin = Pin(0);
pub const P0_1: Pin = Pin(1);
pub const P0_2: Pin = Pin(2);
pub const P0_3: Pin = Pin(3);
pub const P0_4: Pin = Pin(4);
pub const P0_5: Pin = Pin(5);
pub const P0_6: Pin = Pin(6);
pub const P0_7: Pin = Pin(7);
pub const P1_0: Pin = Pin(8);
pub const P1_1: Pin = Pin(9);
pub const P1_2: Pin = Pin(10);
pub const P1_3: Pin = Pin(11);
pub const P1_4: Pin = Pin(12);
pub const P1_5: Pin = Pin(13);
pub const P1_6: Pin = Pin(14);
pub const P1_7: Pin = Pin(15);
pub const P2_0: Pin = Pin(16);
pub const P2_1: Pin = Pin(17);
pub const P2_2: Pin = Pin(18);
pub const P2_3: Pin = Pin(19);
pub const P2_4: Pin = Pin(20);
pub const P2_5: Pin = Pin(21);
pub const P2_6: Pin = Pin(22);
pub const P2_7: Pin = Pin(23);
pub const P3_0: Pin = Pin(24);
pub const P3_1: Pin = Pin(25);
pub const P3_2: Pin = Pin(26);
pub const P3_3: Pin = Pin(27);
pub const P3_4: Pin = Pin(28);
pub const P3_5: Pin = Pin(29);
pub const P3_6: Pin = Pin(30);
pub const P3_7: Pin = Pin(31);
pub const P4_0: Pin = Pin(32);
pub const P4_1: Pin = Pin(33);
pub const P4_2: Pin = Pin(34);
pub const P4_3: Pin = Pin(35);
pub const H_0: Pin = Pin(36);
pub const H_1: Pin = Pin(37);
pub const H_2: Pin = Pin(38);

/// Peripheral signal selected on a pad through the pinmux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFunction(pub u8);

pub const IDLE_MODE: PinFunction = PinFunction(0);
pub const HCI_UART_TX: PinFunction = PinFunction(1);
pub const HCI_UART_RX: PinFunction = PinFunction(2);
pub const HCI_UART_CTS: PinFunction = PinFunction(3);
pub const HCI_UART_RTS: PinFunction = PinFunction(4);
pub const UART1_TX: PinFunction = PinFunction(5);
pub const UART1_RX: PinFunction = PinFunction(6);
pub const UART0_TX: PinFunction = PinFunction(7);
pub const UART0_RX: PinFunction = PinFunction(8);
pub const UART0_CTS: PinFunction = PinFunction(9);
pub const UART0_RTS: PinFunction = PinFunction(10);
pub const UART1_CTS: PinFunction = PinFunction(11);
pub const UART1_RTS: PinFunction = PinFunction(12);
pub const UART2_TX: PinFunction = PinFunction(13);
pub const UART2_RX: PinFunction = PinFunction(14);
pub const UART2_CTS: PinFunction = PinFunction(15);
pub const UART2_RTS: PinFunction = PinFunction(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PadMode {
    Software = 0,
    Pinmux = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PadPull {
    None = 0,
    Up = 1,
    Down = 2,
}

/// Electrical pad setup, applied through the ROM `Pad_Config` routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadConfig {
    pub mode: PadMode,
    pub powered: bool,
    pub pull: PadPull,
    pub output_enable: bool,
    pub output_high: bool,
}

impl PadConfig {
    /// Pad handed to a peripheral: powered, pulled up, software output
    /// disabled with a high idle level.
    pub const PERIPHERAL_PULL_UP: PadConfig = PadConfig {
        mode: PadMode::Pinmux,
        powered: true,
        pull: PadPull::Up,
        output_enable: false,
        output_high: true,
    };
}

#[cfg(target_os = "none")]
mod rom {
    use super::{PadConfig, Pin};

    extern "C" {
        #[link_name = "Pad_Config"]
        fn rom_pad_config(pin: u8, mode: u8, pwr: u8, pull: u8, out_en: u8, out_val: u8);
    }

    pub fn pad_config(pin: Pin, config: PadConfig) {
        unsafe {
            rom_pad_config(
                pin.index(),
                config.mode as u8,
                config.powered as u8,
                config.pull as u8,
                config.output_enable as u8,
                config.output_high as u8,
            )
        }
    }
}

#[cfg(not(target_os = "none"))]
mod rom {
    use super::{PadConfig, Pin};

    pub fn pad_config(_pin: Pin, _config: PadConfig) {}
}

/// Applies the electrical configuration of a pad.
#[cfg_attr(test, mry::mry)]
pub fn pad_config(pin: Pin, config: PadConfig) {
    rom::pad_config(pin, config)
}

/// Routes a peripheral signal to a pad.
///
/// # Notes
///
/// * Each 32 bit pinmux word holds the function of four consecutive pads,
///   one byte per pad
#[cfg_attr(test, mry::mry)]
pub fn pinmux_config(pin: Pin, function: PinFunction) {
    let offset = ((pin.index() >> 2) as u32) << 2;
    let shift = ((pin.index() & 0x03) as u32) << 3;

    let val = read_reg_pinmux_cfg(offset) & !(0xFF << shift);
    write_reg_pinmux_cfg(val | ((function.0 as u32) << shift), offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mcu::register::{mock_read_reg_pinmux_cfg, mock_write_reg_pinmux_cfg};

    #[test]
    fn test_pin_validity() {
        assert!(P0_0.is_valid());
        assert!(H_2.is_valid());
        assert!(!Pin::NC.is_valid());
        assert!(!Pin::new(TOTAL_PIN_NUM).is_valid());
    }

    /// P3_1 is pad 25: word 6 (offset 24), byte 1.
    #[test]
    #[mry::lock(read_reg_pinmux_cfg, write_reg_pinmux_cfg)]
    fn test_pinmux_config_replaces_only_own_byte() {
        mock_read_reg_pinmux_cfg(24u32).returns(0xAABB_CCDDu32);
        mock_write_reg_pinmux_cfg(mry::Any, mry::Any).returns(());

        pinmux_config(P3_1, UART0_RX);

        mock_write_reg_pinmux_cfg(0xAABB_08DDu32, 24u32).assert_called(1);
    }

    #[test]
    #[mry::lock(read_reg_pinmux_cfg, write_reg_pinmux_cfg)]
    fn test_pinmux_config_first_pad_of_word() {
        mock_read_reg_pinmux_cfg(0u32).returns(0xFFFF_FFFFu32);
        mock_write_reg_pinmux_cfg(mry::Any, mry::Any).returns(());

        pinmux_config(P0_0, UART2_TX);

        mock_write_reg_pinmux_cfg(0xFFFF_FF0Du32, 0u32).assert_called(1);
    }
}

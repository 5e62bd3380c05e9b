#![allow(non_camel_case_types)]

use bitflags::bitflags;

use crate::{BIT, BIT_RNG};

/// Generates a volatile accessor pair for an array of registers. `i` is a
/// byte offset from the first element.
#[macro_export]
macro_rules! regrw_idx {
    ( $x:ident, $a:expr, $s:ty ) => {
        paste::paste! {
            #[cfg_attr(test, mry::mry)]
            pub fn [<read_ $x>](i: u32) -> $s {
                unsafe {
                    core::ptr::read_volatile((($a) + i) as usize as *const $s)
                }
            }

            #[cfg_attr(test, mry::mry)]
            pub fn [<write_ $x>](value: $s, i: u32) {
                unsafe {
                    core::ptr::write_volatile((($a) + i) as usize as *mut $s, value)
                }
            }
        }
    };
}

/// Generates a volatile accessor pair for a register inside a UART register
/// block. All three UART instances share the same layout, so the block base
/// is passed in at runtime.
#[macro_export]
macro_rules! regrw_uart {
    ( $x:ident, $offset:expr ) => {
        paste::paste! {
            #[cfg_attr(test, mry::mry)]
            pub fn [<read_reg_uart_ $x>](base: u32) -> u32 {
                unsafe {
                    core::ptr::read_volatile((base + $offset) as usize as *const u32)
                }
            }

            #[cfg_attr(test, mry::mry)]
            pub fn [<write_reg_uart_ $x>](base: u32, value: u32) {
                unsafe {
                    core::ptr::write_volatile((base + $offset) as usize as *mut u32, value)
                }
            }
        }
    };
}

/****************************************************
 peripheral base addresses
 *****************************************************/
pub const SYSBLKCTRL_REG_BASE: u32 = 0x4000_0200;
pub const PINMUX_REG_BASE: u32 = 0x4000_0280;
pub const UART1_REG_BASE: u32 = 0x4001_1000;
pub const UART0_REG_BASE: u32 = 0x4001_2000;
pub const UART2_REG_BASE: u32 = 0x4002_4000;
pub const NVIC_ISER_BASE: u32 = 0xE000_E100;
pub const NVIC_IPR_BASE: u32 = 0xE000_E400;

/****************************************************
 system block: peripheral function / clock gates
 *****************************************************/
// i = PERI_FUNC0 (0x18) or PERI_FUNC1 (0x1C)
regrw_idx!(reg_peri_func_en, SYSBLKCTRL_REG_BASE, u32);
// i = PERI_CLK_CTRL0 (0x30) or PERI_CLK_CTRL1 (0x34)
regrw_idx!(reg_peri_clk_ctrl, SYSBLKCTRL_REG_BASE, u32);

/****************************************************
 pinmux: four pins per 32 bit word, one byte each
 *****************************************************/
regrw_idx!(reg_pinmux_cfg, PINMUX_REG_BASE, u32);

/****************************************************
 NVIC
 *****************************************************/
regrw_idx!(reg_nvic_iser, NVIC_ISER_BASE, u32);
regrw_idx!(reg_nvic_ipr, NVIC_IPR_BASE, u8);

/****************************************************
 uart regs struct: offsets from the instance base
 *****************************************************/
// DLAB set: divisor latch low byte. DLAB clear: unused.
regrw_uart!(dll, 0x00);
// DLAB set: divisor latch high byte. DLAB clear: interrupt enable.
regrw_uart!(dlh_intcr, 0x04);
// read: interrupt identification. write: fifo control.
regrw_uart!(intid_fcr, 0x08);
regrw_uart!(lcr, 0x0C);
regrw_uart!(lsr, 0x14);
regrw_uart!(stsr, 0x20);
// read: receive buffer. write: transmit holding.
regrw_uart!(rb_thr, 0x24);
regrw_uart!(rx_idle_tocr, 0x40);
regrw_uart!(rx_idle_sr, 0x44);
regrw_uart!(rxidle_intcr, 0x48);
regrw_uart!(fifo_level, 0x4C);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_IER: u32 {
        const RD_AVA =          BIT!(0);
        const TX_EMPTY =        BIT!(1);
        const LINE_STS =        BIT!(2);
        const MODEM_STS =       BIT!(3);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_INTID: u32 {
        const INT_PENDING_N =   BIT!(0);
        const INT_ID =          BIT_RNG!(1, 3);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_FCR: u32 {
        const CLEAR_RX_FIFO =   BIT!(1);
        const CLEAR_TX_FIFO =   BIT!(2);
        const DMA_MODE =        BIT!(3);
        const RX_TRIGGER =      BIT_RNG!(8, 12);
    }
}
pub const FLD_UART_FCR_RX_TRIGGER_SHIFT: u32 = 8;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_LCR: u32 {
        const WORD_LEN_8 =      BIT!(0);
        const STOP_BITS_2 =     BIT!(2);
        const PARITY_EN =       BIT!(3);
        const PARITY_EVEN =     BIT!(4);
        const BREAK_CTRL =      BIT!(6);
        const DLAB =            BIT!(7);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_LSR: u32 {
        const RX_DATA_RDY =     BIT!(0);
        const RX_OVERRUN =      BIT!(1);
        const PARITY_ERR =      BIT!(2);
        const FRAME_ERR =       BIT!(3);
        const BREAK_INT =       BIT!(4);
        const THR_EMPTY =       BIT!(5);
        const THR_TSR_EMPTY =   BIT!(6);
        const RX_FIFO_ERR =     BIT!(7);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_STSR: u32 {
        const OVSR =            BIT_RNG!(4, 7);
        const OVSR_ADJ =        BIT_RNG!(16, 26);
    }
}
pub const FLD_UART_STSR_OVSR_SHIFT: u32 = 4;
pub const FLD_UART_STSR_OVSR_ADJ_SHIFT: u32 = 16;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_RX_IDLE_TOCR: u32 {
        const IDLE_TIME =       BIT_RNG!(0, 3);
        const IDLE_EN =         BIT!(31);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_RX_IDLE_SR: u32 {
        const IDLE_FLAG =       BIT!(0);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_RXIDLE_INTCR: u32 {
        const IDLE_INT_EN =     BIT!(0);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_UART_FIFO_LEVEL: u32 {
        const TX_LEVEL =        BIT_RNG!(0, 4);
        const RX_LEVEL =        BIT_RNG!(8, 13);
    }
}
pub const FLD_UART_FIFO_LEVEL_RX_SHIFT: u32 = 8;

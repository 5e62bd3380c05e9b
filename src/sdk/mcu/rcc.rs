use crate::sdk::mcu::register::{
    read_reg_peri_clk_ctrl, read_reg_peri_func_en, write_reg_peri_clk_ctrl, write_reg_peri_func_en,
};
use crate::{BIT, BIT_RNG};

pub const PERI_FUNC0_EN: u32 = 0x18;
pub const PERI_FUNC1_EN: u32 = 0x1C;
pub const PERI_CLK_CTRL0: u32 = 0x30;
pub const PERI_CLK_CTRL1: u32 = 0x34;

/// Clock and function gate of one peripheral in the system block.
///
/// A peripheral is usable once both its function enable bit and its clock
/// enable bits are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RccPeriph {
    /// Offset of the function enable register (`PERI_FUNC0_EN` / `PERI_FUNC1_EN`)
    pub func_reg: u32,
    pub func_bits: u32,
    /// Offset of the clock control register (`PERI_CLK_CTRL0` / `PERI_CLK_CTRL1`)
    pub clk_reg: u32,
    /// Active clock enable and sleep clock enable bits
    pub clk_bits: u32,
}

impl RccPeriph {
    pub const UART0: RccPeriph = RccPeriph {
        func_reg: PERI_FUNC0_EN,
        func_bits: BIT!(0),
        clk_reg: PERI_CLK_CTRL0,
        clk_bits: BIT_RNG!(0, 1),
    };

    pub const UART1: RccPeriph = RccPeriph {
        func_reg: PERI_FUNC0_EN,
        func_bits: BIT!(12),
        clk_reg: PERI_CLK_CTRL0,
        clk_bits: BIT_RNG!(20, 21),
    };

    pub const UART2: RccPeriph = RccPeriph {
        func_reg: PERI_FUNC1_EN,
        func_bits: BIT!(1),
        clk_reg: PERI_CLK_CTRL1,
        clk_bits: BIT_RNG!(2, 3),
    };
}

/// Gates a peripheral's function and clock on or off.
///
/// # Notes
///
/// * Enabling sets the function bit before the clock bits; disabling clears
///   them in the reverse order
#[cfg_attr(test, mry::mry)]
pub fn rcc_periph_set(periph: RccPeriph, enable: bool) {
    if enable {
        write_reg_peri_func_en(read_reg_peri_func_en(periph.func_reg) | periph.func_bits, periph.func_reg);
        write_reg_peri_clk_ctrl(read_reg_peri_clk_ctrl(periph.clk_reg) | periph.clk_bits, periph.clk_reg);
    } else {
        write_reg_peri_clk_ctrl(read_reg_peri_clk_ctrl(periph.clk_reg) & !periph.clk_bits, periph.clk_reg);
        write_reg_peri_func_en(read_reg_peri_func_en(periph.func_reg) & !periph.func_bits, periph.func_reg);
    }
}

use bitflags::bitflags;

use crate::config::{IdleTime, Parity, RxTriggerLevel, StopBits, WordLength};
use crate::sdk::drivers::baud::BaudConfig;
use crate::sdk::mcu::register::{
    read_reg_uart_dlh_intcr, read_reg_uart_fifo_level, read_reg_uart_intid_fcr, read_reg_uart_lsr,
    read_reg_uart_rb_thr, read_reg_uart_rx_idle_sr, read_reg_uart_rxidle_intcr, write_reg_uart_dlh_intcr,
    write_reg_uart_dll, write_reg_uart_intid_fcr, write_reg_uart_lcr, write_reg_uart_rb_thr,
    write_reg_uart_rx_idle_tocr, write_reg_uart_rxidle_intcr, write_reg_uart_stsr, FLD_UART_FCR,
    FLD_UART_FCR_RX_TRIGGER_SHIFT, FLD_UART_FIFO_LEVEL, FLD_UART_FIFO_LEVEL_RX_SHIFT, FLD_UART_IER,
    FLD_UART_INTID, FLD_UART_LCR, FLD_UART_LSR, FLD_UART_RXIDLE_INTCR, FLD_UART_RX_IDLE_SR,
    FLD_UART_RX_IDLE_TOCR, FLD_UART_STSR, FLD_UART_STSR_OVSR_ADJ_SHIFT, FLD_UART_STSR_OVSR_SHIFT,
};
use crate::{BIT, FLD_VAL};

bitflags! {
    /// UART interrupt sources. The first four live in the interrupt enable
    /// register, `RX_IDLE` in the separate idle interrupt control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UartInt: u32 {
        const RD_AVA =      FLD_UART_IER::RD_AVA.bits();
        const TX_EMPTY =    FLD_UART_IER::TX_EMPTY.bits();
        const LINE_STS =    FLD_UART_IER::LINE_STS.bits();
        const MODEM_STS =   FLD_UART_IER::MODEM_STS.bits();
        const RX_IDLE =     BIT!(7);
    }
}

bitflags! {
    /// Status flags. All but `RX_IDLE` are line status register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UartFlag: u32 {
        const RX_DATA_RDY =     FLD_UART_LSR::RX_DATA_RDY.bits();
        const RX_OVERRUN =      FLD_UART_LSR::RX_OVERRUN.bits();
        const PARITY_ERR =      FLD_UART_LSR::PARITY_ERR.bits();
        const FRAME_ERR =       FLD_UART_LSR::FRAME_ERR.bits();
        const BREAK_INT =       FLD_UART_LSR::BREAK_INT.bits();
        const THR_EMPTY =       FLD_UART_LSR::THR_EMPTY.bits();
        const THR_TSR_EMPTY =   FLD_UART_LSR::THR_TSR_EMPTY.bits();
        const RX_FIFO_ERR =     FLD_UART_LSR::RX_FIFO_ERR.bits();
        const RX_IDLE =         BIT!(8);
    }
}

/// Everything `uart_hw_init` programs into a UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartInitParams {
    pub baud: BaudConfig,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub word_length: WordLength,
    pub rx_trigger_level: RxTriggerLevel,
    pub idle_time: IdleTime,
}

impl UartInitParams {
    fn lcr(&self) -> u32 {
        let mut lcr = FLD_UART_LCR::empty();
        if self.word_length == WordLength::Eight {
            lcr |= FLD_UART_LCR::WORD_LEN_8;
        }
        if self.stop_bits == StopBits::Two {
            lcr |= FLD_UART_LCR::STOP_BITS_2;
        }
        match self.parity {
            Parity::None => {}
            Parity::Odd => lcr |= FLD_UART_LCR::PARITY_EN,
            Parity::Even => lcr |= FLD_UART_LCR::PARITY_EN | FLD_UART_LCR::PARITY_EVEN,
        }
        lcr.bits()
    }
}

/// Programs a UART from scratch.
///
/// # Parameters
///
/// * `base` - Register block of the UART
/// * `params` - Baud generator and line settings
///
/// # Notes
///
/// * Both FIFOs are cleared
/// * The divisor latch is opened only while the divisor is written
/// * All interrupt sources are left disabled
#[cfg_attr(test, mry::mry)]
pub fn uart_hw_init(base: u32, params: UartInitParams) {
    write_reg_uart_intid_fcr(
        base,
        (FLD_UART_FCR::CLEAR_RX_FIFO | FLD_UART_FCR::CLEAR_TX_FIFO).bits()
            | FLD_VAL!(
                FLD_UART_FCR::RX_TRIGGER.bits(),
                FLD_UART_FCR_RX_TRIGGER_SHIFT,
                params.rx_trigger_level.level()
            ),
    );

    write_reg_uart_lcr(base, FLD_UART_LCR::DLAB.bits());
    write_reg_uart_dll(base, (params.baud.div & 0xFF) as u32);
    write_reg_uart_dlh_intcr(base, (params.baud.div >> 8) as u32);
    write_reg_uart_stsr(
        base,
        FLD_VAL!(FLD_UART_STSR::OVSR.bits(), FLD_UART_STSR_OVSR_SHIFT, params.baud.ovsr)
            | FLD_VAL!(FLD_UART_STSR::OVSR_ADJ.bits(), FLD_UART_STSR_OVSR_ADJ_SHIFT, params.baud.ovsr_adj),
    );

    // clears DLAB, dlh_intcr is the interrupt enable register again
    write_reg_uart_lcr(base, params.lcr());

    write_reg_uart_rx_idle_tocr(
        base,
        FLD_UART_RX_IDLE_TOCR::IDLE_EN.bits()
            | FLD_VAL!(FLD_UART_RX_IDLE_TOCR::IDLE_TIME.bits(), 0, params.idle_time as u8),
    );

    write_reg_uart_dlh_intcr(base, 0);
    write_reg_uart_rxidle_intcr(base, 0);
}

/// Enables or disables a set of interrupt sources, leaving the others untouched.
#[cfg_attr(test, mry::mry)]
pub fn uart_int_config(base: u32, ints: UartInt, enable: bool) {
    let ier = ints.bits() & FLD_UART_IER::all().bits();
    if ier != 0 {
        let val = read_reg_uart_dlh_intcr(base);
        write_reg_uart_dlh_intcr(base, if enable { val | ier } else { val & !ier });
    }

    if ints.contains(UartInt::RX_IDLE) {
        let idle = FLD_UART_RXIDLE_INTCR::IDLE_INT_EN.bits();
        let val = read_reg_uart_rxidle_intcr(base);
        write_reg_uart_rxidle_intcr(base, if enable { val | idle } else { val & !idle });
    }
}

/// Raw interrupt identification: pending bit and interrupt id.
#[cfg_attr(test, mry::mry)]
pub fn uart_get_iid(base: u32) -> u32 {
    read_reg_uart_intid_fcr(base) & (FLD_UART_INTID::INT_PENDING_N | FLD_UART_INTID::INT_ID).bits()
}

/// `true` if any bit of `flag` is set.
#[cfg_attr(test, mry::mry)]
pub fn uart_get_flag_state(base: u32, flag: UartFlag) -> bool {
    if flag.contains(UartFlag::RX_IDLE)
        && read_reg_uart_rx_idle_sr(base) & FLD_UART_RX_IDLE_SR::IDLE_FLAG.bits() != 0
    {
        return true;
    }

    let lsr = flag.bits() & FLD_UART_LSR::all().bits();
    lsr != 0 && read_reg_uart_lsr(base) & lsr != 0
}

/// Number of bytes waiting in the receive FIFO.
#[cfg_attr(test, mry::mry)]
pub fn uart_get_rx_fifo_len(base: u32) -> u8 {
    ((read_reg_uart_fifo_level(base) & FLD_UART_FIFO_LEVEL::RX_LEVEL.bits()) >> FLD_UART_FIFO_LEVEL_RX_SHIFT) as u8
}

#[cfg_attr(test, mry::mry)]
pub fn uart_receive_byte(base: u32) -> u8 {
    read_reg_uart_rb_thr(base) as u8
}

#[cfg_attr(test, mry::mry)]
pub fn uart_send_byte(base: u32, byte: u8) {
    write_reg_uart_rb_thr(base, byte as u32);
}

/// Writes `data` into the transmit FIFO. The caller keeps `data` within the
/// free FIFO space.
pub fn uart_send_data(base: u32, data: &[u8]) {
    for &byte in data {
        uart_send_byte(base, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mcu::register::{
        mock_read_reg_uart_dlh_intcr, mock_read_reg_uart_fifo_level, mock_read_reg_uart_intid_fcr,
        mock_read_reg_uart_lsr, mock_read_reg_uart_rx_idle_sr, mock_read_reg_uart_rxidle_intcr,
        mock_write_reg_uart_dlh_intcr, mock_write_reg_uart_dll, mock_write_reg_uart_intid_fcr,
        mock_write_reg_uart_lcr, mock_write_reg_uart_rb_thr, mock_write_reg_uart_rx_idle_tocr,
        mock_write_reg_uart_rxidle_intcr, mock_write_reg_uart_stsr, read_reg_uart_dlh_intcr,
        read_reg_uart_fifo_level, read_reg_uart_intid_fcr, read_reg_uart_lsr, read_reg_uart_rx_idle_sr,
        read_reg_uart_rxidle_intcr, write_reg_uart_dlh_intcr, write_reg_uart_dll, write_reg_uart_intid_fcr,
        write_reg_uart_lcr, write_reg_uart_rb_thr, write_reg_uart_rx_idle_tocr, write_reg_uart_rxidle_intcr,
        write_reg_uart_stsr, UART0_REG_BASE,
    };

    const BASE: u32 = UART0_REG_BASE;

    fn params() -> UartInitParams {
        UartInitParams {
            baud: BaudConfig { div: 0x0123, ovsr: 13, ovsr_adj: 0x488 },
            parity: Parity::Even,
            stop_bits: StopBits::One,
            word_length: WordLength::Eight,
            rx_trigger_level: RxTriggerLevel::DEFAULT,
            idle_time: IdleTime::Bytes4,
        }
    }

    #[test]
    #[mry::lock(
        write_reg_uart_intid_fcr,
        write_reg_uart_lcr,
        write_reg_uart_dll,
        write_reg_uart_dlh_intcr,
        write_reg_uart_stsr,
        write_reg_uart_rx_idle_tocr,
        write_reg_uart_rxidle_intcr
    )]
    fn test_uart_hw_init() {
        mock_write_reg_uart_intid_fcr(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_lcr(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_dll(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_dlh_intcr(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_stsr(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_rx_idle_tocr(mry::Any, mry::Any).returns(());
        mock_write_reg_uart_rxidle_intcr(mry::Any, mry::Any).returns(());

        uart_hw_init(BASE, params());

        // both fifos cleared, trigger level 16
        mock_write_reg_uart_intid_fcr(BASE, 0x0000_1006u32).assert_called(1);
        // divisor latch opened, then 8 bits even parity
        mock_write_reg_uart_lcr(BASE, 0x80u32).assert_called(1);
        mock_write_reg_uart_lcr(BASE, 0x19u32).assert_called(1);
        mock_write_reg_uart_dll(BASE, 0x23u32).assert_called(1);
        mock_write_reg_uart_dlh_intcr(BASE, 0x01u32).assert_called(1);
        mock_write_reg_uart_stsr(BASE, 0x0488_00D0u32).assert_called(1);
        mock_write_reg_uart_rx_idle_tocr(BASE, 0x8000_0002u32).assert_called(1);
        // interrupts left disabled
        mock_write_reg_uart_dlh_intcr(BASE, 0u32).assert_called(1);
        mock_write_reg_uart_rxidle_intcr(BASE, 0u32).assert_called(1);
    }

    #[test]
    #[mry::lock(
        read_reg_uart_dlh_intcr,
        write_reg_uart_dlh_intcr,
        read_reg_uart_rxidle_intcr,
        write_reg_uart_rxidle_intcr
    )]
    fn test_uart_int_config_enable_rx_and_idle() {
        mock_read_reg_uart_dlh_intcr(BASE).returns(0x04u32);
        mock_write_reg_uart_dlh_intcr(mry::Any, mry::Any).returns(());
        mock_read_reg_uart_rxidle_intcr(BASE).returns(0u32);
        mock_write_reg_uart_rxidle_intcr(mry::Any, mry::Any).returns(());

        uart_int_config(BASE, UartInt::RD_AVA | UartInt::RX_IDLE, true);

        mock_write_reg_uart_dlh_intcr(BASE, 0x05u32).assert_called(1);
        mock_write_reg_uart_rxidle_intcr(BASE, 0x01u32).assert_called(1);
    }

    #[test]
    #[mry::lock(
        read_reg_uart_dlh_intcr,
        write_reg_uart_dlh_intcr,
        read_reg_uart_rxidle_intcr,
        write_reg_uart_rxidle_intcr
    )]
    fn test_uart_int_config_disable_leaves_idle_alone() {
        mock_read_reg_uart_dlh_intcr(BASE).returns(0x07u32);
        mock_write_reg_uart_dlh_intcr(mry::Any, mry::Any).returns(());

        uart_int_config(BASE, UartInt::RD_AVA | UartInt::LINE_STS, false);

        mock_write_reg_uart_dlh_intcr(BASE, 0x02u32).assert_called(1);
        mock_read_reg_uart_rxidle_intcr(mry::Any).assert_called(0);
        mock_write_reg_uart_rxidle_intcr(mry::Any, mry::Any).assert_called(0);
    }

    #[test]
    #[mry::lock(read_reg_uart_intid_fcr)]
    fn test_uart_get_iid_masks_fifo_bits() {
        mock_read_reg_uart_intid_fcr(BASE).returns(0xC4u32);

        assert_eq!(uart_get_iid(BASE), 0x04);
    }

    #[test]
    #[mry::lock(read_reg_uart_lsr, read_reg_uart_rx_idle_sr)]
    fn test_uart_get_flag_state() {
        mock_read_reg_uart_lsr(BASE).returns(0x40u32);
        mock_read_reg_uart_rx_idle_sr(BASE).returns(0x01u32);

        assert!(uart_get_flag_state(BASE, UartFlag::THR_TSR_EMPTY));
        assert!(!uart_get_flag_state(BASE, UartFlag::RX_DATA_RDY));
        assert!(uart_get_flag_state(BASE, UartFlag::RX_IDLE));

        // only the idle query reads the idle status register
        mock_read_reg_uart_rx_idle_sr(BASE).assert_called(1);
        mock_read_reg_uart_lsr(BASE).assert_called(2);
    }

    #[test]
    #[mry::lock(read_reg_uart_fifo_level)]
    fn test_uart_get_rx_fifo_len() {
        mock_read_reg_uart_fifo_level(BASE).returns(0x0000_1A05u32);

        assert_eq!(uart_get_rx_fifo_len(BASE), 0x1A);
    }

    #[test]
    #[mry::lock(write_reg_uart_rb_thr)]
    fn test_uart_send_data() {
        mock_write_reg_uart_rb_thr(mry::Any, mry::Any).returns(());

        uart_send_data(BASE, b"abca");

        mock_write_reg_uart_rb_thr(BASE, b'a' as u32).assert_called(2);
        mock_write_reg_uart_rb_thr(BASE, b'b' as u32).assert_called(1);
        mock_write_reg_uart_rb_thr(BASE, b'c' as u32).assert_called(1);
    }
}

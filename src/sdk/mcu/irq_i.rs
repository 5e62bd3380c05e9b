use crate::sdk::mcu::register::{read_reg_nvic_iser, write_reg_nvic_iser, write_reg_nvic_ipr};

/// Implemented priority bits of the NVIC.
pub const NVIC_PRIO_BITS: u8 = 3;

/// Number of system exception slots in front of the first peripheral
/// interrupt in the vector table.
const VECTOR_IRQ_OFFSET: u8 = 16;

/// Bare interrupt service routine, as stored in the vector table.
pub type IrqHandler = extern "C" fn();

/// A peripheral interrupt line of the NVIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqChannel(pub u8);

impl IrqChannel {
    pub const UART1: IrqChannel = IrqChannel(12);
    pub const UART0: IrqChannel = IrqChannel(13);
    pub const UART2: IrqChannel = IrqChannel(25);

    /// Slot of this interrupt in the vector table.
    pub const fn vector(self) -> u8 {
        self.0 + VECTOR_IRQ_OFFSET
    }
}

/// Masks all maskable interrupts and returns whether they were enabled.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(always)]
pub fn irq_disable() -> bool {
    let primask: u32;
    unsafe {
        core::arch::asm!("mrs {}, PRIMASK", out(reg) primask, options(nomem, nostack, preserves_flags));
        core::arch::asm!("cpsid i", options(nomem, nostack, preserves_flags));
    }
    primask & 1 == 0
}

/// Restores the interrupt state returned by `irq_disable`.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(always)]
pub fn irq_restore(was_enabled: bool) {
    if was_enabled {
        unsafe { core::arch::asm!("cpsie i", options(nomem, nostack, preserves_flags)) };
    }
}

#[cfg(all(feature = "critical-section-impl", target_arch = "arm", target_os = "none"))]
mod cs {
    use super::{irq_disable, irq_restore};

    struct PrimaskCriticalSection;
    critical_section::set_impl!(PrimaskCriticalSection);

    unsafe impl critical_section::Impl for PrimaskCriticalSection {
        unsafe fn acquire() -> critical_section::RawRestoreState {
            irq_disable()
        }

        unsafe fn release(was_enabled: critical_section::RawRestoreState) {
            irq_restore(was_enabled)
        }
    }
}

/// Sets the priority of an interrupt line and enables it.
///
/// # Parameters
///
/// * `channel` - Interrupt line to configure
/// * `priority` - Priority level, 0 (highest) to 7
/// * `enable` - Whether to enable the line after setting the priority
///
/// # Notes
///
/// * Only the top `NVIC_PRIO_BITS` of each priority byte are implemented
/// * Disabling goes through the clear-enable register, which is not touched here;
///   passing `false` only updates the priority
#[cfg_attr(test, mry::mry)]
pub fn nvic_init(channel: IrqChannel, priority: u8, enable: bool) {
    write_reg_nvic_ipr(priority << (8 - NVIC_PRIO_BITS), channel.0 as u32);

    if enable {
        let offset = ((channel.0 >> 5) as u32) << 2;
        let bit = 1u32 << (channel.0 & 0x1F);
        write_reg_nvic_iser(read_reg_nvic_iser(offset) | bit, offset);
    }
}

#[cfg(target_os = "none")]
mod rom {
    extern "C" {
        #[link_name = "RamVectorTableUpdate"]
        fn rom_ram_vector_table_update(vector: u8, handler: super::IrqHandler) -> bool;
    }

    pub fn update(vector: u8, handler: super::IrqHandler) -> bool {
        unsafe { rom_ram_vector_table_update(vector, handler) }
    }
}

#[cfg(not(target_os = "none"))]
mod rom {
    pub fn update(_vector: u8, _handler: super::IrqHandler) -> bool {
        false
    }
}

/// Installs `handler` in the RAM vector table slot `vector`.
///
/// # Returns
///
/// * `true` if the slot was updated
/// * `false` if the vector is out of range, or no RAM vector table exists
///   (always the case off target)
#[cfg_attr(test, mry::mry)]
pub fn ram_vector_table_update(vector: u8, handler: IrqHandler) -> bool {
    rom::update(vector, handler)
}

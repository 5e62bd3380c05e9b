pub mod irq_i;
pub mod pinmux;
pub mod rcc;
pub mod register;

pub mod common;
pub mod mcu;
pub mod drivers;

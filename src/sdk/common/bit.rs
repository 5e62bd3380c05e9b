#[macro_export]
macro_rules! BIT {
    ( $x:expr ) => {
        1 << $x
    };
}

#[macro_export]
macro_rules! BIT_MASK_LEN {
    ( $x:expr ) => {
        $crate::BIT!($x) - 1
    };
}

// bits range: BIT_RNG!(4, 8)  0b000111110000,  start from 4, end at 8
#[macro_export]
macro_rules! BIT_RNG {
    ( $s:expr, $e:expr ) => {
        $crate::BIT_MASK_LEN!($e - $s + 1) << $s
    };
}

/// Places `value` into the field described by `mask`, where `shift` is the
/// position of the lowest bit of the field.
#[macro_export]
macro_rules! FLD_VAL {
    ( $mask:expr, $shift:expr, $value:expr ) => {
        (($value as u32) << $shift) & $mask
    };
}

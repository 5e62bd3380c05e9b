/// UART source clock.
pub const UART_CLOCK_HZ: u32 = 40_000_000;

/// Largest accepted deviation of the achieved rate from the requested one.
pub const MAX_BAUD_ERROR_PPM: u32 = 10_000;

const OVSR_BASE: u32 = 5;
const OVSR_MAX: u8 = 15;
const ADJ_BITS: u32 = 11;

// one bit time in elevenths of a clock tick, before the divisor
const MIN_BIT_ELEVENTHS: u32 = ADJ_BITS * OVSR_BASE;
const MAX_BIT_ELEVENTHS: u32 = ADJ_BITS * (OVSR_BASE + OVSR_MAX as u32) + (ADJ_BITS - 1);

/// Divisor and oversampling fields of the UART baud generator.
///
/// One bit lasts `div * (5 + ovsr + ones(ovsr_adj) / 11)` UART clock ticks,
/// where `ones` is the number of set bits in the 11 bit adjustment pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudConfig {
    pub div: u16,
    pub ovsr: u8,
    pub ovsr_adj: u16,
}

impl BaudConfig {
    /// Power on values of the baud generator (115200 baud).
    pub const RESET_DEFAULT: BaudConfig = BaudConfig { div: 20, ovsr: 12, ovsr_adj: 0x252 };

    fn bit_elevenths(&self) -> u32 {
        ADJ_BITS * (OVSR_BASE + self.ovsr as u32) + (self.ovsr_adj & 0x7FF).count_ones()
    }

    /// Baud rate actually produced by these settings, rounded to the nearest integer.
    pub fn effective_baud(&self) -> u32 {
        let ticks = self.div as u64 * self.bit_elevenths() as u64;
        if ticks == 0 {
            return 0;
        }
        ((UART_CLOCK_HZ as u64 * ADJ_BITS as u64 + ticks / 2) / ticks) as u32
    }
}

/// Spreads `ones` set bits evenly over the 11 bit adjustment pattern.
const fn adj_pattern(ones: u32) -> u16 {
    let mut pattern = 0u16;
    let mut i = 0;
    while i < ADJ_BITS {
        if (i + 1) * ones / ADJ_BITS > i * ones / ADJ_BITS {
            pattern |= 1 << i;
        }
        i += 1;
    }
    pattern
}

/// Finds the baud generator settings closest to `baud`.
///
/// # Returns
///
/// * `Some(BaudConfig)` with the smallest error found, if that error is at most
///   `MAX_BAUD_ERROR_PPM`
/// * `None` for a zero rate or a rate the generator cannot reach
///
/// # Notes
///
/// * Every oversampling step is tried with the rounded divisor for that step;
///   among equally good candidates the higher oversampling ratio wins
pub fn solve(baud: u32) -> Option<BaudConfig> {
    if baud == 0 {
        return None;
    }

    let target = UART_CLOCK_HZ as u64 * ADJ_BITS as u64;
    let mut best: Option<(u64, BaudConfig)> = None;

    for elevenths in (MIN_BIT_ELEVENTHS..=MAX_BIT_ELEVENTHS).rev() {
        let per_div = baud as u64 * elevenths as u64;
        let div = ((target + per_div / 2) / per_div).clamp(1, u16::MAX as u64);

        let actual = per_div * div;
        let error_ppm = target.abs_diff(actual) * 1_000_000 / actual;

        if best.map_or(true, |(best_ppm, _)| error_ppm < best_ppm) {
            let ones = elevenths % ADJ_BITS;
            best = Some((
                error_ppm,
                BaudConfig {
                    div: div as u16,
                    ovsr: (elevenths / ADJ_BITS - OVSR_BASE) as u8,
                    ovsr_adj: adj_pattern(ones),
                },
            ));
        }
    }

    match best {
        Some((error_ppm, config)) if error_ppm <= MAX_BAUD_ERROR_PPM as u64 => Some(config),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rates_within_tolerance() {
        let rates = [
            9600u32, 19200, 38400, 57600, 115200, 230400, 460800, 921600, 1_000_000, 2_000_000, 3_000_000,
        ];

        for baud in rates {
            let config = solve(baud).unwrap();
            let achieved = config.effective_baud() as u64;
            let error_ppm = achieved.abs_diff(baud as u64) * 1_000_000 / baud as u64;
            assert!(error_ppm <= MAX_BAUD_ERROR_PPM as u64, "{} baud off by {} ppm", baud, error_ppm);
            assert!(config.ovsr <= OVSR_MAX);
            assert!(config.div >= 1);
            assert_eq!(config.ovsr_adj & !0x7FF, 0);
        }
    }

    #[test]
    fn test_115200() {
        let config = solve(115200).unwrap();
        assert_eq!(config, BaudConfig { div: 19, ovsr: 13, ovsr_adj: 0x488 });
        assert_eq!(config.effective_baud(), 115213);
    }

    #[test]
    fn test_exact_rate_prefers_highest_oversampling() {
        // 1M is exact with div 2 / ovsr 15 as well as div 4 / ovsr 5
        assert_eq!(solve(1_000_000), Some(BaudConfig { div: 2, ovsr: 15, ovsr_adj: 0 }));
        assert_eq!(solve(8_000_000), Some(BaudConfig { div: 1, ovsr: 0, ovsr_adj: 0 }));
    }

    #[test]
    fn test_unreachable_rates() {
        assert_eq!(solve(0), None);
        // too slow for the largest divisor
        assert_eq!(solve(10), None);
        // faster than the shortest bit time
        assert_eq!(solve(10_000_000), None);
    }

    #[test]
    fn test_reset_default_is_115200() {
        assert_eq!(BaudConfig::RESET_DEFAULT.effective_baud(), 115183);
    }

    #[test]
    fn test_adj_pattern() {
        assert_eq!(adj_pattern(0), 0);
        assert_eq!(adj_pattern(4), 0x524);
        assert_eq!(adj_pattern(10), 0x7FE);
        for ones in 0..=10 {
            assert_eq!(adj_pattern(ones).count_ones(), ones);
        }
    }
}

/// Tuning of the clock servo
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ServoConfig {
    /// Proportional attenuation, the offset is divided by this value
    pub ap: i32,
    /// Integral attenuation
    pub ai: i32,
    /// Smoothing of the one way delay filter, as a power of two
    pub delay_filter_shift: u8,
    /// Smoothing of the offset filter, as a power of two
    pub offset_filter_shift: u8,
    /// Never step the clock, slew at the maximum rate instead
    pub no_reset_clock: bool,
    /// Measure, but never touch the clock
    pub no_adjust: bool,
    /// Largest frequency correction in parts per billion
    pub max_frequency_adjustment: i32,
}

/// Default bound on frequency corrections, in parts per billion
pub const ADJ_FREQ_MAX: i32 = 512_000;

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            ap: 2,
            ai: 16,
            delay_filter_shift: 6,
            offset_filter_shift: 1,
            no_reset_clock: false,
            no_adjust: false,
            max_frequency_adjustment: ADJ_FREQ_MAX,
        }
    }
}

//! Simulated MCU peripheral snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of GPIO pins on the simulated MCU.
pub const GPIO_PIN_COUNT: u8 = 16;

/// Number of ADC channels on the simulated MCU.
pub const ADC_CHANNEL_COUNT: u8 = 8;

/// Number of hardware timers on the simulated MCU.
pub const TIMER_COUNT: u8 = 4;

/// ADC reference voltage. Channel readings never exceed it.
pub const ADC_MAX_VOLTAGE: f64 = 3.3;

/// Period every timer is created with.
pub const TIMER_DEFAULT_PERIOD: u32 = 1000;

/// Direction of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Pin is sampled.
    Input,
    /// Pin is driven.
    Output,
}

/// One GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GpioPin {
    /// Pin index, `0..GPIO_PIN_COUNT`.
    pub pin: u8,
    /// Logic level.
    pub state: bool,
    /// Configured direction.
    pub direction: PinDirection,
}

/// One ADC channel reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdcChannel {
    /// Channel index, `0..ADC_CHANNEL_COUNT`.
    pub channel: u8,
    /// Sampled voltage in `[0, ADC_MAX_VOLTAGE]`.
    pub voltage: f64,
}

/// One hardware timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimerChannel {
    /// Timer index, `0..TIMER_COUNT`.
    pub timer: u8,
    /// Whether the timer is counting.
    pub enabled: bool,
    /// Reload period in timer ticks.
    pub period: u32,
}

/// Fixed-size, ordered peripheral snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Peripherals {
    /// GPIO pins ordered by pin index.
    pub gpio: Vec<GpioPin>,
    /// ADC channels ordered by channel index.
    pub adc: Vec<AdcChannel>,
    /// Timers ordered by timer index.
    pub timers: Vec<TimerChannel>,
}

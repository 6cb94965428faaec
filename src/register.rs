// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
//! Register-level model of the sensor.
//!
//! The sensor exposes 16-bit registers behind 8-bit addresses. A handful of
//! them are read, modified, and written back at runtime; those get typed
//! wrappers here that keep the whole raw word, so reserved bits survive a
//! read-modify-write cycle. Everything else is programmed once from
//! [`POWER_ON_DEFAULTS`].

use num_enum::{IntoPrimitive, TryFromPrimitive};
use paste::paste;

use crate::util::is_bit_set;

/// Register addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum Reg {
    ChipVersion = 0x00,
    ColumnStart = 0x01,
    RowStart = 0x02,
    WindowHeight = 0x03,
    WindowWidth = 0x04,
    HorizontalBlanking = 0x05,
    VerticalBlanking = 0x06,
    ChipControl = 0x07,
    ShutterWidth1 = 0x08,
    ShutterWidth2 = 0x09,
    ShutterWidthControl = 0x0A,
    TotalShutterWidth = 0x0B,
    Reset = 0x0C,
    ReadMode = 0x0D,
    MonitorMode = 0x0E,
    PixelOperationMode = 0x0F,
    LedOutControl = 0x1B,
    AdcModeControl = 0x1C,
    VrefAdcControl = 0x2C,
    V1 = 0x31,
    V2 = 0x32,
    V3 = 0x33,
    V4 = 0x34,
    AnalogGain = 0x35,
    MaximumAnalogGain = 0x36,
    FrameDarkAverage = 0x42,
    DarkAverageThresholds = 0x46,
    BlackLevelCalibControl = 0x47,
    BlackLevelCalibValue = 0x48,
    BlackLevelCalibStep = 0x4C,
    RowNoiseCorrControl1 = 0x70,
    RowNoiseConstant = 0x72,
    RowNoiseCorrControl2 = 0x73,
    PixclkFvLv = 0x74,
    DigitalTestPattern = 0x7F,
    AecAgcDesiredBin = 0xA5,
    AecUpdateFrequency = 0xA6,
    AecLpf = 0xA8,
    AgcUpdateFrequency = 0xA9,
    AgcLpf = 0xAB,
    AecAgcEnable = 0xAF,
    AecAgcPixelCount = 0xB0,
    AgcOutput = 0xBA,
    AecOutput = 0xBB,
    MaxShutterWidth = 0xBD,
    BinDifferenceThreshold = 0xBE,
}

/// Trait for typed register words.
pub trait RegisterWord: Copy + From<u16> + Into<u16> {
    /// The address this word is read from and written back to.
    fn address() -> Reg;
}

/// DRY macro for a single-bit flag on a raw register word.
macro_rules! register_flag {
    { $field:ident, $bit:literal, $doc:literal } => {
        paste! {
            #[doc = $doc]
            pub fn $field(&self) -> bool {
                is_bit_set(self.0, $bit)
            }

            #[doc = "Set or clear the " $field " bit."]
            pub fn [< set_ $field >](&mut self, enable: bool) {
                self.0 &= !(1u16 << $bit);
                if enable {
                    self.0 |= 1u16 << $bit;
                }
            }
        }
    };
}

/// DRY macro for the register word newtypes.
macro_rules! register_word {
    { $name:ident, $address:expr, $doc:literal } => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        pub struct $name(u16);

        impl $name {
            /// The raw register value.
            pub fn raw(&self) -> u16 {
                self.0
            }
        }

        impl RegisterWord for $name {
            fn address() -> Reg {
                $address
            }
        }

        impl From<u16> for $name {
            fn from(raw: u16) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u16 {
            fn from(word: $name) -> u16 {
                word.0
            }
        }
    };
}

register_word! {
    ChipControl,
    Reg::ChipControl,
    "Chip control word: scan, sampling, and capture-mode bits."
}

impl ChipControl {
    register_flag! {
        snapshot_mode,
        4,
        "Snapshot (non-streaming) capture mode. The sensor holds a frame until explicitly advanced."
    }
}

register_word! {
    ReadMode,
    Reg::ReadMode,
    "Read mode word: readout direction and binning bits."
}

impl ReadMode {
    register_flag! { vertical_flip, 4, "Read rows bottom to top." }
    register_flag! { horizontal_flip, 5, "Read columns right to left." }
}

register_word! {
    AecAgcEnable,
    Reg::AecAgcEnable,
    "Enable word for the hardware exposure and gain loops."
}

impl AecAgcEnable {
    register_flag! { auto_exposure, 0, "Automatic exposure control." }
    register_flag! { auto_gain, 1, "Automatic gain control." }
}

register_word! {
    PixelOperationMode,
    Reg::PixelOperationMode,
    "Pixel operation mode word: color/mono and dynamic-range bits."
}

impl PixelOperationMode {
    register_flag! { color, 2, "Color pixel array fitted." }
    register_flag! { high_dynamic_range, 6, "High-dynamic-range pixel operation." }
}

/// ADC response modes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum AdcMode {
    /// Linear 10-bit output.
    Linear = 0x0002,

    /// 12-to-10-bit companding. Trades precision in the highlights for
    /// resolution in the shadows.
    Companding = 0x0003,
}

/// Chip version codes this driver knows how to program.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum ChipVersion {
    Rev1 = 0x1311,
    Rev3 = 0x1313,
}

/// One entry of the sensor's known-good power-on programming.
#[derive(Clone, Copy, Debug)]
pub struct RegisterDefault {
    pub address: Reg,
    pub value: u16,
    pub name: &'static str,
}

/// The sensor's power-on programming, applied in order by the configuration
/// sequence.
///
/// The order is significant: the sensor latches some values only after
/// related registers are in place, so entries must be written exactly as
/// listed.
#[rustfmt::skip]
pub static POWER_ON_DEFAULTS: [RegisterDefault; 41] = [
    RegisterDefault { address: Reg::ColumnStart,            value: 0x0001, name: "Column Start" },
    RegisterDefault { address: Reg::RowStart,               value: 0x0004, name: "Row Start" },
    RegisterDefault { address: Reg::WindowHeight,           value: 0x01e0, name: "Window Height" },
    RegisterDefault { address: Reg::WindowWidth,            value: 0x02f0, name: "Window Width" },
    RegisterDefault { address: Reg::HorizontalBlanking,     value: 0x005e, name: "Horizontal Blanking" },
    RegisterDefault { address: Reg::VerticalBlanking,       value: 0x002d, name: "Vertical Blanking" },
    RegisterDefault { address: Reg::ChipControl,            value: 0x0388, name: "Chip Control" },
    RegisterDefault { address: Reg::ShutterWidth1,          value: 0x01bb, name: "Shutter Width 1" },
    RegisterDefault { address: Reg::ShutterWidth2,          value: 0x01d9, name: "Shutter Width 2" },
    RegisterDefault { address: Reg::ShutterWidthControl,    value: 0x0164, name: "Shutter Width Ctrl" },
    RegisterDefault { address: Reg::TotalShutterWidth,      value: 0x01e0, name: "Total Shutter Width" },
    RegisterDefault { address: Reg::Reset,                  value: 0x0000, name: "Reset" },
    RegisterDefault { address: Reg::ReadMode,               value: 0x0300, name: "Read Mode" },
    RegisterDefault { address: Reg::MonitorMode,            value: 0x0000, name: "Monitor Mode" },
    RegisterDefault { address: Reg::PixelOperationMode,     value: 0x0011, name: "Pixel Operation Mode" },
    RegisterDefault { address: Reg::LedOutControl,          value: 0x0000, name: "LED_OUT Ctrl" },
    RegisterDefault { address: Reg::AdcModeControl,         value: 0x0002, name: "ADC Mode Control" },
    RegisterDefault { address: Reg::VrefAdcControl,         value: 0x0004, name: "VREF_ADC Control" },
    RegisterDefault { address: Reg::V1,                     value: 0x001d, name: "V1" },
    RegisterDefault { address: Reg::V2,                     value: 0x0018, name: "V2" },
    RegisterDefault { address: Reg::V3,                     value: 0x0015, name: "V3" },
    RegisterDefault { address: Reg::V4,                     value: 0x0004, name: "V4" },
    RegisterDefault { address: Reg::AnalogGain,             value: 0x0010, name: "Analog Gain (16-64)" },
    RegisterDefault { address: Reg::MaximumAnalogGain,      value: 0x0040, name: "Max Analog Gain" },
    RegisterDefault { address: Reg::DarkAverageThresholds,  value: 0x231d, name: "Dark Avg Thresholds" },
    RegisterDefault { address: Reg::BlackLevelCalibControl, value: 0x8080, name: "Black Level Calib Control" },
    RegisterDefault { address: Reg::BlackLevelCalibStep,    value: 0x0002, name: "BL Calib Step Size" },
    RegisterDefault { address: Reg::RowNoiseCorrControl1,   value: 0x0034, name: "Row Noise Corr Ctrl 1" },
    RegisterDefault { address: Reg::RowNoiseConstant,       value: 0x002a, name: "Row Noise Constant" },
    RegisterDefault { address: Reg::RowNoiseCorrControl2,   value: 0x02f7, name: "Row Noise Corr Ctrl 2" },
    RegisterDefault { address: Reg::PixclkFvLv,             value: 0x0000, name: "Pixclk, FV, LV" },
    RegisterDefault { address: Reg::DigitalTestPattern,     value: 0x0000, name: "Digital Test Pattern" },
    RegisterDefault { address: Reg::AecAgcDesiredBin,       value: 0x003a, name: "AEC/AGC Desired Bin" },
    RegisterDefault { address: Reg::AecUpdateFrequency,     value: 0x0002, name: "AEC Update Frequency" },
    RegisterDefault { address: Reg::AecLpf,                 value: 0x0000, name: "AEC LPF" },
    RegisterDefault { address: Reg::AgcUpdateFrequency,     value: 0x0002, name: "AGC Update Frequency" },
    RegisterDefault { address: Reg::AgcLpf,                 value: 0x0002, name: "AGC LPF" },
    RegisterDefault { address: Reg::AecAgcEnable,           value: 0x0003, name: "AEC/AGC Enable" },
    RegisterDefault { address: Reg::AecAgcPixelCount,       value: 0xabe0, name: "AEC/AGC Pix Count" },
    RegisterDefault { address: Reg::MaxShutterWidth,        value: 0x01e0, name: "Maximum Shutter Width" },
    RegisterDefault { address: Reg::BinDifferenceThreshold, value: 0x0014, name: "AGC/AEC Bin Difference Threshold" },
];

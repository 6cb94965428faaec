// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use log::{debug, error, info, warn};

use crate::control::{ControlDescriptor, ControlId};
use crate::error::{DriverError, Error};
use crate::format::{
    FormatDescriptor, FormatRequest, Fraction, FrameFormat, FrameSize, PixelFormat, COLOR_FORMATS,
    FRAME_INTERVALS, MAX_HEIGHT, MAX_WIDTH, MONO_FORMATS,
};
use crate::platform::{Platform, PowerState};
use crate::register::{
    AdcMode, AecAgcEnable, ChipControl, ChipVersion, PixelOperationMode, ReadMode, Reg,
    RegisterWord, POWER_ON_DEFAULTS,
};

/// External sensor clock the timing constants below assume, in Hertz.
pub const EXTCLK_HZ: u32 = 27_000_000;

// Blanking values calculated from the datasheet timing equations for 60 fps
// at a 27 MHz pixel clock.
const HORIZONTAL_BLANKING: u16 = 43;
const VERTICAL_BLANKING: u16 = 88;

/// Soft-reset settle time. The sensor needs 15 pixel-clock cycles; a
/// millisecond is comfortably past that.
const RESET_SETTLE_MS: u16 = 1;

/// Wait before stopping the clock so the sensor shuts down with LED_OUT
/// disabled.
const POWER_DOWN_QUIESCE_MS: u16 = 50;

// Mirror values used before the first configuration pass. These match the
// control catalog defaults.
const DEFAULT_SHUTTER_WIDTH: u16 = 480;
const DEFAULT_ANALOG_GAIN: u16 = 16;

/// Which color filter the attached sensor was built with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SensorVariant {
    Color,
    Mono,
}

/// Load-time tunables for the sensor.
///
/// These are copied into the driver at construction. Control changes keep
/// them up to date, so a later reconfiguration reproduces the last user
/// selection rather than the values given here.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Color or monochrome sensor variant.
    pub variant: SensorVariant,

    /// Start with the hardware exposure loop enabled.
    pub auto_exposure: bool,

    /// Start with the hardware gain loop enabled.
    pub auto_gain: bool,

    /// Enable high-dynamic-range pixel operation.
    pub hdr: bool,

    /// Use the companding ADC mode for low-light scenes.
    pub low_light: bool,

    /// Mirror the image horizontally.
    pub hflip: bool,

    /// Mirror the image vertically.
    pub vflip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: SensorVariant::Color,
            auto_exposure: true,
            auto_gain: true,
            hdr: true,
            low_light: false,
            hflip: false,
            vflip: false,
        }
    }
}

/// DRY macro for boolean controls that toggle one bit of a mirrored register
/// word and remember the choice in the driver's tunables.
macro_rules! set_flag_control {
    { $self:ident, $mirror:ident, $setter:ident, $config_field:ident, $value:expr, $name:literal } => {{
        let enable = $value != 0;
        let mut word = $self.$mirror;
        word.$setter(enable);
        $self.write_word(word)?;
        $self.$mirror = word;
        $self.config.$config_field = enable;
        debug!(concat!("setting ", $name, " {} ({:#06x})"), enable, u16::from(word));
    }};
}

/// Driver for the MT9V032 wide-VGA global-shutter image sensor.
///
/// The driver owns all sensor state: the register mirrors below always hold
/// the last value successfully written to their register, and every read of
/// current configuration goes through them rather than the bus. One driver
/// value maps to one physical sensor; nothing here is shared, so several
/// drivers on different addresses compose without trouble.
pub struct Mt9v032<I2C, D, P> {
    /// The I²C bus the sensor is accessible on.
    bus: I2C,

    /// The I²C address the sensor is accessible at. The address straps
    /// select 0x48, 0x4C, 0x58, or 0x5C.
    address: u8,

    /// Delay provider for the reset and power-down settle waits.
    delay: D,

    /// Board hooks for the sensor clock and power rails.
    platform: P,

    /// Current tunables, kept in sync with control changes.
    config: Config,

    /// The format list for the configured sensor variant.
    formats: &'static [FormatDescriptor],

    /// Last committed capture format.
    format: FrameFormat,

    /// Current streaming frame interval.
    frame_interval: Fraction,

    /// Recorded power state; only advanced by a fully successful transition.
    power: PowerState,

    /// Chip version, read once at first detection.
    version: Option<ChipVersion>,

    // Live register mirrors.
    chip_control: ChipControl,
    read_mode: ReadMode,
    aec_agc_enable: AecAgcEnable,
    pixel_operation_mode: PixelOperationMode,
    adc_mode: AdcMode,
    horizontal_blanking: u16,
    vertical_blanking: u16,
    shutter_width: u16,
    gain: u16,
}

impl<I2C, D, P> Mt9v032<I2C, D, P>
where
    I2C: i2c::Write + i2c::WriteRead,
    D: DelayMs<u16>,
    P: Platform,
{
    /// Create a driver for the sensor at the given I²C address.
    ///
    /// The bus is left untouched here; detection and configuration happen on
    /// the first transition to [`PowerState::On`].
    pub fn new(bus: I2C, address: u8, delay: D, platform: P, config: Config) -> Self {
        let formats: &'static [FormatDescriptor] = match config.variant {
            SensorVariant::Color => &COLOR_FORMATS,
            SensorVariant::Mono => &MONO_FORMATS,
        };
        info!(
            "{:?} sensor: hflip={} vflip={} auto_gain={} auto_exposure={} hdr={} low_light={}",
            config.variant,
            config.hflip,
            config.vflip,
            config.auto_gain,
            config.auto_exposure,
            config.hdr,
            config.low_light,
        );
        Self {
            bus,
            address,
            delay,
            platform,
            config,
            formats,
            format: FrameFormat::full_window(formats[0].pixel_format),
            frame_interval: FRAME_INTERVALS[0],
            power: PowerState::Off,
            version: None,
            chip_control: ChipControl::default(),
            read_mode: ReadMode::default(),
            aec_agc_enable: AecAgcEnable::default(),
            pixel_operation_mode: PixelOperationMode::default(),
            adc_mode: AdcMode::Linear,
            horizontal_blanking: 0,
            vertical_blanking: 0,
            shutter_width: DEFAULT_SHUTTER_WIDTH,
            gain: DEFAULT_ANALOG_GAIN,
        }
    }

    fn reg_read(&mut self, register: Reg) -> Result<u16, Error<I2C>> {
        read_register(&mut self.bus, self.address, register)
    }

    fn reg_write(&mut self, register: Reg, value: u16) -> Result<(), Error<I2C>> {
        write_register(&mut self.bus, self.address, register, value)
    }

    fn read_word<R>(&mut self) -> Result<R, Error<I2C>>
    where
        R: RegisterWord,
    {
        Ok(R::from(self.reg_read(R::address())?))
    }

    fn write_word<R>(&mut self, word: R) -> Result<(), Error<I2C>>
    where
        R: RegisterWord,
    {
        self.reg_write(R::address(), word.into())
    }

    /// Program the sensor's full capture configuration.
    ///
    /// This runs on every transition to [`PowerState::On`]; there is no
    /// incremental resume. The read-back verification pass is diagnostic
    /// only: some registers adjust themselves after the shadow latch, so a
    /// mismatch is logged rather than treated as a failure.
    pub fn configure(&mut self) -> Result<(), Error<I2C>> {
        // Soft reset; the settle wait covers the clock cycles the sensor
        // needs before accepting new values.
        self.reg_write(Reg::Reset, 0x0003)?;
        self.delay.delay_ms(RESET_SETTLE_MS);

        // Known-good power-on programming, in table order. Later entries
        // rely on register state latched by earlier ones.
        for entry in POWER_ON_DEFAULTS.iter() {
            self.reg_write(entry.address, entry.value)?;
        }

        // Commit the shadowed registers so the verification reads see the
        // values just written.
        self.reg_write(Reg::Reset, 0x0001)?;
        self.delay.delay_ms(RESET_SETTLE_MS);

        for entry in POWER_ON_DEFAULTS.iter() {
            let read_back = self.reg_read(entry.address)?;
            if read_back != entry.value {
                info!(
                    "{}: wrote {:#06x}, read back {:#06x}",
                    entry.name, entry.value, read_back
                );
            }
        }

        // Frame timing for 60 fps at the 27 MHz external clock.
        self.reg_write(Reg::HorizontalBlanking, HORIZONTAL_BLANKING)?;
        self.reg_write(Reg::VerticalBlanking, VERTICAL_BLANKING)?;
        self.horizontal_blanking = HORIZONTAL_BLANKING;
        self.vertical_blanking = VERTICAL_BLANKING;

        // Hold the sensor in snapshot mode until capture starts.
        let mut chip_control: ChipControl = self.read_word()?;
        chip_control.set_snapshot_mode(true);
        self.write_word(chip_control)?;
        self.chip_control = chip_control;

        // The longest exposure the window allows. This is the value in
        // effect whenever the exposure loop is off.
        let window_height = self.reg_read(Reg::WindowHeight)?;
        let shutter_width = window_height + VERTICAL_BLANKING - 2;
        self.reg_write(Reg::TotalShutterWidth, shutter_width)?;
        self.shutter_width = shutter_width;

        let mut pixel_mode: PixelOperationMode = self.read_word()?;
        pixel_mode.set_high_dynamic_range(self.config.hdr);
        self.write_word(pixel_mode)?;
        self.pixel_operation_mode = pixel_mode;

        let mut read_mode: ReadMode = self.read_word()?;
        read_mode.set_vertical_flip(self.config.vflip);
        read_mode.set_horizontal_flip(self.config.hflip);
        self.write_word(read_mode)?;
        self.read_mode = read_mode;

        let mut aec_agc: AecAgcEnable = self.read_word()?;
        aec_agc.set_auto_exposure(self.config.auto_exposure);
        aec_agc.set_auto_gain(self.config.auto_gain);
        self.write_word(aec_agc)?;
        self.aec_agc_enable = aec_agc;

        let adc_mode = if self.config.low_light {
            AdcMode::Companding
        } else {
            AdcMode::Linear
        };
        self.reg_write(Reg::AdcModeControl, adc_mode.into())?;
        self.adc_mode = adc_mode;

        // The gain ceiling register doubles as the manual starting point.
        let gain = self.reg_read(Reg::MaximumAnalogGain)?;
        self.reg_write(Reg::AnalogGain, gain)?;
        self.gain = gain;

        // Headroom for long exposures in dim scenes.
        self.reg_write(Reg::MaxShutterWidth, 4 * shutter_width)?;

        Ok(())
    }

    /// Read and check the chip-version register.
    fn detect(&mut self) -> Result<ChipVersion, Error<I2C>> {
        let raw = self.reg_read(Reg::ChipVersion)?;
        match ChipVersion::try_from(raw) {
            Ok(version) => {
                info!("chip version {:#06x}", raw);
                Ok(version)
            }
            Err(_) => {
                warn!("chip version mismatch ({:#06x})", raw);
                Err(DriverError::UnknownChipVersion(raw).into())
            }
        }
    }

    /// Put the sensor in snapshot mode, holding the current frame.
    fn stop_capture(&mut self) -> Result<(), Error<I2C>> {
        let mut chip_control = self.chip_control;
        chip_control.set_snapshot_mode(true);
        self.write_word(chip_control)?;
        self.chip_control = chip_control;
        Ok(())
    }

    /// Put the sensor in streaming mode.
    fn start_capture(&mut self) -> Result<(), Error<I2C>> {
        let mut chip_control = self.chip_control;
        chip_control.set_snapshot_mode(false);
        self.write_word(chip_control)?;
        self.chip_control = chip_control;
        Ok(())
    }

    /// Drive the sensor to the given power state.
    ///
    /// Entering [`PowerState::On`] detects the chip (first time only), then
    /// always reapplies the full configuration and starts streaming. The
    /// recorded power state only advances when the whole sequence succeeds,
    /// so a failed transition leaves the driver where it was and can simply
    /// be retried.
    pub fn set_power(&mut self, target: PowerState) -> Result<(), Error<I2C>> {
        // Don't cut power mid-frame.
        if target != PowerState::On && self.version.is_some() {
            self.stop_capture()?;
        }

        if target == PowerState::On {
            self.set_clock(EXTCLK_HZ, target)?;
        } else {
            // Let the sensor quiesce with LED_OUT disabled before the clock
            // stops.
            self.delay.delay_ms(POWER_DOWN_QUIESCE_MS);
            self.set_clock(0, target)?;
        }

        if let Err(platform_error) = self.platform.set_power(target) {
            error!("unable to set the sensor power state: {:?}", platform_error);
            let _ = self.platform.set_clock(0);
            return Err(DriverError::PowerSequence(target).into());
        }

        if target == PowerState::On {
            if self.version.is_none() {
                self.version = Some(self.detect()?);
            }
            self.configure()?;
            self.start_capture()?;
        }

        self.power = target;
        Ok(())
    }

    fn set_clock(&mut self, frequency_hz: u32, target: PowerState) -> Result<(), Error<I2C>> {
        match self.platform.set_clock(frequency_hz) {
            Ok(_actual) => Ok(()),
            Err(platform_error) => {
                error!("unable to set the sensor clock: {:?}", platform_error);
                Err(DriverError::PowerSequence(target).into())
            }
        }
    }

    /// Catalog metadata for a control.
    pub fn query_control(&self, id: ControlId) -> &'static ControlDescriptor {
        id.descriptor()
    }

    /// The current value of a control, decoded from the register mirrors.
    pub fn control(&self, id: ControlId) -> i32 {
        match id {
            ControlId::VerticalFlip => self.read_mode.vertical_flip() as i32,
            ControlId::HorizontalFlip => self.read_mode.horizontal_flip() as i32,
            ControlId::Exposure => self.shutter_width as i32,
            ControlId::Gain => self.gain as i32,
            ControlId::AutoExposure => self.aec_agc_enable.auto_exposure() as i32,
            ControlId::AutoGain => self.aec_agc_enable.auto_gain() as i32,
        }
    }

    /// Change a control, pushing the effect to the sensor immediately.
    ///
    /// Setting a manual exposure or gain first disables the corresponding
    /// hardware loop; the manual value always wins. Out-of-range values are
    /// rejected before any register access.
    pub fn set_control(&mut self, id: ControlId, value: i32) -> Result<(), Error<I2C>> {
        match id {
            ControlId::VerticalFlip => {
                set_flag_control!(self, read_mode, set_vertical_flip, vflip, value, "vertical flip");
            }
            ControlId::HorizontalFlip => {
                set_flag_control!(
                    self,
                    read_mode,
                    set_horizontal_flip,
                    hflip,
                    value,
                    "horizontal flip"
                );
            }
            ControlId::Exposure => {
                let descriptor = id.descriptor();
                if !descriptor.contains(value) {
                    return Err(DriverError::ValueOutOfRange { control: id, value }.into());
                }
                if self.aec_agc_enable.auto_exposure() {
                    let mut aec_agc = self.aec_agc_enable;
                    aec_agc.set_auto_exposure(false);
                    self.write_word(aec_agc)?;
                    self.aec_agc_enable = aec_agc;
                    self.config.auto_exposure = false;
                }
                let shutter_width = value as u16;
                self.reg_write(Reg::TotalShutterWidth, shutter_width)?;
                self.shutter_width = shutter_width;
                debug!("setting exposure {}", shutter_width);
            }
            ControlId::Gain => {
                let descriptor = id.descriptor();
                if !descriptor.contains(value) {
                    return Err(DriverError::ValueOutOfRange { control: id, value }.into());
                }
                if self.aec_agc_enable.auto_gain() {
                    let mut aec_agc = self.aec_agc_enable;
                    aec_agc.set_auto_gain(false);
                    self.write_word(aec_agc)?;
                    self.aec_agc_enable = aec_agc;
                    self.config.auto_gain = false;
                }
                let mut gain = value as u16;
                // Gain codes of 32 and up only step in twos.
                if gain >= 32 {
                    gain &= !1;
                }
                self.reg_write(Reg::AnalogGain, gain)?;
                self.gain = gain;
                debug!("setting gain {}", gain);
            }
            ControlId::AutoExposure => {
                set_flag_control!(
                    self,
                    aec_agc_enable,
                    set_auto_exposure,
                    auto_exposure,
                    value,
                    "automatic exposure"
                );
            }
            ControlId::AutoGain => {
                set_flag_control!(
                    self,
                    aec_agc_enable,
                    set_auto_gain,
                    auto_gain,
                    value,
                    "automatic gain"
                );
            }
        }
        Ok(())
    }

    /// The supported pixel formats for this sensor variant.
    pub fn enumerate_formats(&self, index: usize) -> Result<&'static FormatDescriptor, Error<I2C>> {
        self.formats
            .get(index)
            .ok_or_else(|| DriverError::IndexOutOfRange(index).into())
    }

    /// Negotiate a capture format without committing it.
    ///
    /// The sensor only scans its full window, so the result is always
    /// 752×480. A pixel encoding this variant doesn't produce is replaced
    /// with the one it does; negotiation never fails.
    pub fn try_format(&self, request: &FormatRequest) -> FrameFormat {
        let pixel_format = if self.supports(request.pixel_format) {
            request.pixel_format
        } else {
            self.formats[0].pixel_format
        };
        FrameFormat::full_window(pixel_format)
    }

    /// Negotiate a capture format and commit the result.
    pub fn set_format(&mut self, request: &FormatRequest) -> FrameFormat {
        let format = self.try_format(request);
        self.format = format;
        format
    }

    /// The last committed capture format.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// The single discrete frame size for a pixel format.
    pub fn enumerate_frame_sizes(
        &self,
        pixel_format: PixelFormat,
        index: usize,
    ) -> Result<FrameSize, Error<I2C>> {
        if !self.supports(pixel_format) {
            return Err(DriverError::UnsupportedPixelFormat(pixel_format).into());
        }
        if index >= 1 {
            return Err(DriverError::IndexOutOfRange(index).into());
        }
        Ok(FrameSize {
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
        })
    }

    /// The discrete frame intervals for a pixel format.
    pub fn enumerate_frame_intervals(
        &self,
        pixel_format: PixelFormat,
        index: usize,
    ) -> Result<Fraction, Error<I2C>> {
        if !self.supports(pixel_format) {
            return Err(DriverError::UnsupportedPixelFormat(pixel_format).into());
        }
        FRAME_INTERVALS
            .get(index)
            .copied()
            .ok_or_else(|| DriverError::IndexOutOfRange(index).into())
    }

    /// The current streaming frame interval.
    pub fn frame_interval(&self) -> Fraction {
        self.frame_interval
    }

    /// Request a streaming frame interval.
    ///
    /// The timing constants fix the sensor at 60 fps, so any request is
    /// coerced to 1/60; the applied interval is returned.
    pub fn set_frame_interval(&mut self, _requested: Fraction) -> Fraction {
        self.frame_interval = FRAME_INTERVALS[0];
        self.frame_interval
    }

    fn supports(&self, pixel_format: PixelFormat) -> bool {
        self.formats
            .iter()
            .any(|descriptor| descriptor.pixel_format == pixel_format)
    }

    /// Whether the chip has been detected on the bus.
    pub fn is_detected(&self) -> bool {
        self.version.is_some()
    }

    /// The detected chip version, if detection has run.
    pub fn version(&self) -> Option<ChipVersion> {
        self.version
    }

    /// The current power state.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// The tunables currently in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The programmed (horizontal, vertical) blanking intervals, in pixel
    /// clocks and rows.
    pub fn blanking(&self) -> (u16, u16) {
        (self.horizontal_blanking, self.vertical_blanking)
    }

    /// The pixel operation mode last written to the sensor.
    pub fn pixel_mode(&self) -> PixelOperationMode {
        self.pixel_operation_mode
    }

    /// The ADC response mode last written to the sensor.
    pub fn adc_mode(&self) -> AdcMode {
        self.adc_mode
    }

    /// The board's private data for the host capture framework.
    pub fn private_data(&self) -> P::PrivateData {
        self.platform.private_data()
    }

    /// Release the driver, handing the I²C bus back.
    ///
    /// All sensor state, the detected identity included, is dropped with the
    /// driver; nothing persists past this call.
    pub fn release(self) -> I2C {
        self.bus
    }
}

fn read_register<I2C>(bus: &mut I2C, address: u8, register: Reg) -> Result<u16, Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    let mut value_bytes = [0u8; 2];
    bus.write_read(address, &[register.into()], &mut value_bytes)
        .map_err(Error::I2cWriteReadError)?;
    // The sensor sends the high byte first.
    Ok(u16::from_be_bytes(value_bytes))
}

fn write_register<I2C>(
    bus: &mut I2C,
    address: u8,
    register: Reg,
    value: u16,
) -> Result<(), Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    let value_bytes = value.to_be_bytes();
    let combined = [register.into(), value_bytes[0], value_bytes[1]];
    bus.write(address, &combined).map_err(Error::I2cWriteError)?;
    Ok(())
}

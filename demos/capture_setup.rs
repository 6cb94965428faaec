use std::env;
use std::path::Path;

use linux_embedded_hal::{Delay, I2cdev};

use mt9v032::{Config, ControlId, Mt9v032, Platform, PowerState};

/// Stand-in board hooks for running from userspace, where the rails and
/// clock are assumed to be up already.
struct AlwaysOn;

impl Platform for AlwaysOn {
    type Error = core::convert::Infallible;
    type PrivateData = ();

    fn set_power(&mut self, _state: PowerState) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_clock(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
        Ok(frequency_hz)
    }

    fn private_data(&self) -> Self::PrivateData {}
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        println!("Two arguments required: <I2C bus> <sensor address>");
        return Ok(());
    }
    let address: u8 = if args[2].starts_with("0x") {
        let hex_digits = args[2].split_at(2).1;
        u8::from_str_radix(hex_digits, 16)
            .expect("If the address starts with 0x, its a base-16 number")
    } else {
        args[2].parse().expect("The address to be an integer")
    };
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path).expect("The given path should work as an I2C device");

    let mut sensor = Mt9v032::new(bus, address, Delay, AlwaysOn, Config::default());
    sensor
        .set_power(PowerState::On)
        .map_err(|error| anyhow::anyhow!("unable to power the sensor on: {}", error))?;

    let format = sensor.format();
    println!(
        "negotiated {}x{} {} ({} bytes per frame)",
        format.width,
        format.height,
        format.pixel_format.as_str(),
        format.size_image,
    );
    let interval = sensor.frame_interval();
    println!("{}/{} seconds per frame", interval.numerator, interval.denominator);
    for id in [
        ControlId::Exposure,
        ControlId::Gain,
        ControlId::AutoExposure,
        ControlId::AutoGain,
    ] {
        let descriptor = sensor.query_control(id);
        println!("{}: {}", descriptor.name, sensor.control(id));
    }

    sensor
        .set_power(PowerState::Off)
        .map_err(|error| anyhow::anyhow!("unable to power the sensor off: {}", error))?;
    Ok(())
}

// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
//! Capture format and frame timing descriptors.
//!
//! The sensor always scans its full window, so format negotiation is mostly
//! a matter of agreeing on a pixel encoding; the geometry is fixed.

/// Width of the full pixel array.
pub const MAX_WIDTH: u32 = 752;

/// Height of the full pixel array.
pub const MAX_HEIGHT: u32 = 480;

/// Pixel encodings produced by the two sensor variants.
///
/// Both are 10-bit values packed one per 16-bit word; the variants differ in
/// the color filter (or lack of one) in front of the pixel array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// 10-bit Bayer data, BGGR filter order.
    Sbggr10,

    /// 10-bit Bayer-ordered data from the monochrome array.
    Sgrbg10,
}

impl PixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Sbggr10 => "SBGGR10",
            PixelFormat::Sgrbg10 => "SGRBG10",
        }
    }
}

/// One entry of the supported-format list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormatDescriptor {
    pub pixel_format: PixelFormat,
    pub description: &'static str,
}

/// The single format produced by the color variant.
pub static COLOR_FORMATS: [FormatDescriptor; 1] = [FormatDescriptor {
    pixel_format: PixelFormat::Sbggr10,
    description: "Bayer10 (GrR/BGb)",
}];

/// The single format produced by the monochrome variant.
pub static MONO_FORMATS: [FormatDescriptor; 1] = [FormatDescriptor {
    pixel_format: PixelFormat::Sgrbg10,
    description: "Bayer10 (GrR/BGb)",
}];

/// Colorspace of the negotiated format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Colorspace {
    Srgb,
}

/// A frame interval as seconds per frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

/// The discrete frame intervals the timing constants can produce.
pub const FRAME_INTERVALS: [Fraction; 1] = [Fraction {
    numerator: 1,
    denominator: 60,
}];

/// A discrete frame size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// A requested capture format, before negotiation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormatRequest {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

/// A negotiated capture format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub bytes_per_line: u32,
    pub size_image: u32,
    pub colorspace: Colorspace,
}

impl FrameFormat {
    /// The full-window format for the given pixel encoding.
    ///
    /// Each 10-bit pixel occupies one 16-bit word, so the line stride is two
    /// bytes per pixel.
    pub(crate) fn full_window(pixel_format: PixelFormat) -> Self {
        let bytes_per_line = MAX_WIDTH * 2;
        Self {
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
            pixel_format,
            bytes_per_line,
            size_image: bytes_per_line * MAX_HEIGHT,
            colorspace: Colorspace::Srgb,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn full_window_geometry() {
        let format = FrameFormat::full_window(PixelFormat::Sbggr10);
        assert_eq!(format.width, 752);
        assert_eq!(format.height, 480);
        assert_eq!(format.bytes_per_line, 1504);
        assert_eq!(format.size_image, 1504 * 480);
        assert_eq!(format.colorspace, Colorspace::Srgb);
    }

    #[test]
    fn full_window_keeps_the_requested_encoding() {
        let format = FrameFormat::full_window(PixelFormat::Sgrbg10);
        assert_eq!(format.pixel_format, PixelFormat::Sgrbg10);
    }

    #[test]
    fn one_format_per_variant() {
        assert_eq!(COLOR_FORMATS.len(), 1);
        assert_eq!(MONO_FORMATS.len(), 1);
        assert_eq!(COLOR_FORMATS[0].pixel_format, PixelFormat::Sbggr10);
        assert_eq!(MONO_FORMATS[0].pixel_format, PixelFormat::Sgrbg10);
    }

    #[test]
    fn sixty_frames_per_second() {
        assert_eq!(FRAME_INTERVALS.len(), 1);
        assert_eq!(FRAME_INTERVALS[0].numerator, 1);
        assert_eq!(FRAME_INTERVALS[0].denominator, 60);
    }
}

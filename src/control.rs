// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
//! The fixed catalog of user-adjustable controls.
//!
//! Hosts speaking a numeric control protocol convert their identifiers with
//! `ControlId::try_from`; an unknown number fails there, before any register
//! access happens.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// User-adjustable controls exposed by the sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ControlId {
    VerticalFlip,
    HorizontalFlip,
    Exposure,
    Gain,
    AutoExposure,
    AutoGain,
}

impl ControlId {
    /// Look up the catalog entry for this control.
    pub fn descriptor(self) -> &'static ControlDescriptor {
        &CONTROLS[u32::from(self) as usize]
    }
}

/// The kind of value a control accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlKind {
    Boolean,
    Integer,
}

/// Catalog entry describing one control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlDescriptor {
    pub id: ControlId,
    pub kind: ControlKind,
    pub name: &'static str,
    pub minimum: i32,
    pub maximum: i32,
    pub step: i32,
    pub default: i32,
}

impl ControlDescriptor {
    /// Check a requested value against the declared bounds.
    pub fn contains(&self, value: i32) -> bool {
        (self.minimum..=self.maximum).contains(&value)
    }
}

/// Every control the sensor offers, indexed by `ControlId` discriminant.
pub static CONTROLS: [ControlDescriptor; 6] = [
    ControlDescriptor {
        id: ControlId::VerticalFlip,
        kind: ControlKind::Boolean,
        name: "Flip Vertically",
        minimum: 0,
        maximum: 1,
        step: 1,
        default: 0,
    },
    ControlDescriptor {
        id: ControlId::HorizontalFlip,
        kind: ControlKind::Boolean,
        name: "Flip Horizontally",
        minimum: 0,
        maximum: 1,
        step: 1,
        default: 0,
    },
    ControlDescriptor {
        id: ControlId::Exposure,
        kind: ControlKind::Integer,
        name: "Exposure",
        minimum: 2,
        maximum: 480,
        step: 1,
        default: 480,
    },
    ControlDescriptor {
        id: ControlId::Gain,
        kind: ControlKind::Integer,
        name: "Analog Gain",
        minimum: 16,
        maximum: 64,
        step: 1,
        default: 16,
    },
    ControlDescriptor {
        id: ControlId::AutoExposure,
        kind: ControlKind::Boolean,
        name: "Automatic Exposure",
        minimum: 0,
        maximum: 1,
        step: 1,
        default: 1,
    },
    ControlDescriptor {
        id: ControlId::AutoGain,
        kind: ControlKind::Boolean,
        name: "Automatic Gain",
        minimum: 0,
        maximum: 1,
        step: 1,
        default: 1,
    },
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_discriminant() {
        for (index, descriptor) in CONTROLS.iter().enumerate() {
            assert_eq!(u32::from(descriptor.id) as usize, index);
            assert_eq!(descriptor.id.descriptor(), descriptor);
        }
    }

    #[test]
    fn unknown_control_numbers_are_rejected() {
        assert!(ControlId::try_from(CONTROLS.len() as u32).is_err());
        assert!(ControlId::try_from(u32::MAX).is_err());
        assert_eq!(ControlId::try_from(2u32).unwrap(), ControlId::Exposure);
    }

    #[test]
    fn exposure_bounds() {
        let descriptor = ControlId::Exposure.descriptor();
        assert_eq!(descriptor.kind, ControlKind::Integer);
        assert_eq!(descriptor.minimum, 2);
        assert_eq!(descriptor.maximum, 480);
        assert_eq!(descriptor.default, 480);
        assert!(descriptor.contains(2));
        assert!(descriptor.contains(480));
        assert!(!descriptor.contains(1));
        assert!(!descriptor.contains(481));
    }

    #[test]
    fn gain_bounds() {
        let descriptor = ControlId::Gain.descriptor();
        assert_eq!(descriptor.minimum, 16);
        assert_eq!(descriptor.maximum, 64);
        assert_eq!(descriptor.default, 16);
        assert!(!descriptor.contains(15));
        assert!(!descriptor.contains(65));
    }

    #[test]
    fn booleans_span_zero_to_one() {
        for id in [
            ControlId::VerticalFlip,
            ControlId::HorizontalFlip,
            ControlId::AutoExposure,
            ControlId::AutoGain,
        ] {
            let descriptor = id.descriptor();
            assert_eq!(descriptor.kind, ControlKind::Boolean);
            assert_eq!(descriptor.minimum, 0);
            assert_eq!(descriptor.maximum, 1);
        }
    }
}

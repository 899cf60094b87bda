//! Parameter types for adjustment operations.
//!
//! Each adjustment carries exactly one number, clamped into its documented
//! range when the value is constructed. Nothing downstream re-validates: the
//! transform engine trusts whatever a constructor produced.
//!
//! | Type | Range | Identity | Spoken without a number |
//! |---|---|---|---|
//! | [`Brightness`] | −100 ..= 100 (offset) | 0 | +25 |
//! | [`Contrast`] | 0 ..= 200 (percent gain) | 100 | 125 |
//! | [`Saturation`] | 0 ..= 200 (percent gain) | 100 | 150 |
//! | [`Hue`] | −180 ..= 180 (degrees) | 0 | +30 |
//!
//! Out-of-range input is clamped, never rejected: "brightness by 999" is a
//! full-strength brightness boost, not an error.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

macro_rules! adjustment_param {
    (
        $(#[$meta:meta])*
        $name:ident, range = $min:literal ..= $max:literal, identity = $identity:literal, step = $step:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(into = "f32", from = "f32")]
        pub struct $name(f32);

        impl $name {
            pub const MIN: f32 = $min;
            pub const MAX: f32 = $max;
            pub const IDENTITY: f32 = $identity;
            /// Value used when the command names the adjustment but no number.
            pub const DEFAULT_STEP: f32 = $step;

            /// Build a parameter, clamping into range. NaN maps to the identity.
            pub fn new(value: f32) -> Self {
                if value.is_nan() {
                    return Self(Self::IDENTITY);
                }
                Self(value.clamp(Self::MIN, Self::MAX))
            }

            pub fn value(self) -> f32 {
                self.0
            }

            pub fn range() -> RangeInclusive<f32> {
                Self::MIN..=Self::MAX
            }

            pub fn default_step() -> Self {
                Self(Self::DEFAULT_STEP)
            }

            pub fn is_identity(self) -> bool {
                self.0 == Self::IDENTITY
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(Self::IDENTITY)
            }
        }

        impl From<f32> for $name {
            fn from(value: f32) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for f32 {
            fn from(param: $name) -> f32 {
                param.0
            }
        }
    };
}

adjustment_param!(
    /// Additive offset applied to every color channel.
    Brightness, range = -100.0 ..= 100.0, identity = 0.0, step = 25.0
);

adjustment_param!(
    /// Channel gain in percent; 100 leaves the image unchanged.
    Contrast, range = 0.0 ..= 200.0, identity = 100.0, step = 125.0
);

adjustment_param!(
    /// HSV saturation gain in percent; 0 is fully desaturated.
    Saturation, range = 0.0 ..= 200.0, identity = 100.0, step = 150.0
);

adjustment_param!(
    /// Hue rotation in degrees; wraps around the color wheel.
    Hue, range = -180.0 ..= 180.0, identity = 0.0, step = 30.0
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_clamps_to_valid_range() {
        assert_eq!(Brightness::new(999.0).value(), 100.0);
        assert_eq!(Brightness::new(-999.0).value(), -100.0);
        assert_eq!(Brightness::new(42.5).value(), 42.5);
    }

    #[test]
    fn contrast_and_saturation_floor_at_zero() {
        assert_eq!(Contrast::new(-20.0).value(), 0.0);
        assert_eq!(Saturation::new(-1.0).value(), 0.0);
        assert_eq!(Saturation::new(500.0).value(), 200.0);
    }

    #[test]
    fn hue_clamps_both_directions() {
        assert_eq!(Hue::new(270.0).value(), 180.0);
        assert_eq!(Hue::new(-270.0).value(), -180.0);
    }

    #[test]
    fn nan_becomes_identity() {
        assert_eq!(Contrast::new(f32::NAN), Contrast::default());
        assert!(Contrast::new(f32::NAN).is_identity());
    }

    #[test]
    fn defaults_are_identities() {
        assert!(Brightness::default().is_identity());
        assert!(Contrast::default().is_identity());
        assert!(Saturation::default().is_identity());
        assert!(Hue::default().is_identity());
    }

    #[test]
    fn default_steps_are_in_range() {
        assert!(Brightness::range().contains(&Brightness::default_step().value()));
        assert!(Contrast::range().contains(&Contrast::default_step().value()));
        assert_eq!(Saturation::default_step().value(), 150.0);
        assert!(Hue::range().contains(&Hue::default_step().value()));
    }

    #[test]
    fn deserializing_clamps() {
        let b: Brightness = serde_json::from_str("250").unwrap();
        assert_eq!(b.value(), 100.0);
    }
}

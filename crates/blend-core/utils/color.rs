//! Packed-pixel color helpers and HSL conversion
//!
//! Pixels travel through the pipeline as 32-bit words packed as
//! `(A << 24) | (B << 16) | (G << 8) | R`, which is the little-endian reading of
//! RGBA bytes.
//!
//! HSL components are fractions in `[0, 1]`; hue is normalized so that `1.0`
//! wraps back to red.
//!
//! # Example
//!
//! ```rust
//! use blend_core::utils::color::{hsl_to_rgb, rgb_to_hsl};
//!
//! let (h, s, l) = rgb_to_hsl(255, 0, 0);
//! assert_eq!((h, s, l), (0.0, 1.0, 0.5));
//! assert_eq!(hsl_to_rgb(h, s, l), (255, 0, 0));
//! ```

use super::errors::{BlendError, Result};

/// Pack RGBA channels into a pipeline pixel
#[inline]
#[must_use]
pub const fn pack_argb(red: u8, green: u8, blue: u8, alpha: u8) -> u32 {
    u32::from_le_bytes([red, green, blue, alpha])
}

/// Unpack a pipeline pixel into `[r, g, b, a]`
#[inline]
#[must_use]
pub const fn unpack_argb(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Alpha channel of a pipeline pixel
#[inline]
#[must_use]
pub const fn alpha_of(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Convert 8-bit RGB to HSL fractions
#[must_use]
pub fn rgb_to_hsl(red: u8, green: u8, blue: u8) -> (f64, f64, f64) {
    let r = f64::from(red) / 255.0;
    let g = f64::from(green) / 255.0;
    let b = f64::from(blue) / 255.0;
    let max = r.max(g.max(b));
    let min = r.min(g.min(b));
    let delta = max - min;
    let gamma = max + min;

    let lightness = gamma / 2.0;
    if delta == 0.0 {
        return (0.0, 0.0, lightness);
    }

    let saturation = if lightness > 0.5 {
        delta / (2.0 - gamma)
    } else {
        delta / gamma
    };

    // Ties between channels resolve to the later sector.
    let mut hue = 0.0;
    if max == r && max != g {
        hue = (g - b) / delta + if g < b { 6.0 } else { 0.0 };
    }
    if max == g && max != b {
        hue = (b - r) / delta + 2.0;
    }
    if max == b && max != r {
        hue = (r - g) / delta + 4.0;
    }

    (hue / 6.0, saturation, lightness)
}

fn hue_to_rgb(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = (hue + 1.0) % 1.0;
    if hue * 6.0 < 1.0 {
        return m1 + (m2 - m1) * hue * 6.0;
    }
    if hue * 2.0 < 1.0 {
        return m2;
    }
    if hue * 3.0 < 2.0 {
        return m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0;
    }
    m1
}

/// Convert HSL fractions back to 8-bit RGB, truncating each channel
#[must_use]
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    if saturation == 0.0 {
        let gray = to_channel(lightness);
        return (gray, gray, gray);
    }

    let m2 = if lightness <= 0.5 {
        lightness * (saturation + 1.0)
    } else {
        lightness + saturation - lightness * saturation
    };
    let m1 = lightness * 2.0 - m2;

    (
        to_channel(hue_to_rgb(m1, m2, hue + 1.0 / 3.0)),
        to_channel(hue_to_rgb(m1, m2, hue)),
        to_channel(hue_to_rgb(m1, m2, hue - 1.0 / 3.0)),
    )
}

#[inline]
fn to_channel(value: f64) -> u8 {
    // `as` saturates, which keeps out-of-range fractions inside 0..=255
    (value * 255.0) as u8
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional) into a pipeline pixel
///
/// Six-digit colors are fully opaque.
///
/// # Errors
///
/// Returns `BlendError::InvalidRequest` when the string is not six or eight
/// hexadecimal digits.
pub fn parse_hex_color(color: &str) -> Result<u32> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BlendError::invalid_request(format!(
            "Invalid matte color: {color}"
        )));
    }

    let value = u32::from_str_radix(hex, 16)
        .map_err(|_| BlendError::invalid_request(format!("Invalid matte color: {color}")))?;

    let [red, green, blue, alpha] = if hex.len() == 8 {
        value.to_be_bytes()
    } else {
        let [_, red, green, blue] = value.to_be_bytes();
        [red, green, blue, 0xFF]
    };
    Ok(pack_argb(red, green, blue, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pack_layout_matches_pipeline_word() {
        assert_eq!(pack_argb(0x11, 0x22, 0x33, 0x44), 0x4433_2211);
        assert_eq!(unpack_argb(0x4433_2211), [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(alpha_of(0x80FF_FFFF), 0x80);
    }

    #[test]
    fn primary_colors_to_hsl() {
        assert_eq!(rgb_to_hsl(0, 255, 0), (1.0 / 3.0, 1.0, 0.5));
        assert_eq!(rgb_to_hsl(0, 0, 255), (2.0 / 3.0, 1.0, 0.5));
        assert_eq!(rgb_to_hsl(0, 0, 0), (0.0, 0.0, 0.0));
        assert_eq!(rgb_to_hsl(255, 255, 255), (0.0, 0.0, 1.0));
    }

    #[test]
    fn magenta_wraps_into_last_sector() {
        let (h, s, l) = rgb_to_hsl(255, 0, 255);
        assert!((h - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!((s, l), (1.0, 0.5));
    }

    #[test]
    fn gray_has_no_saturation() {
        let (h, s, l) = rgb_to_hsl(128, 128, 128);
        assert_eq!((h, s), (0.0, 0.0));
        assert!((l - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(hsl_to_rgb(h, s, l), (128, 128, 128));
    }

    #[test]
    fn round_trip_on_grid_of_seventeens() {
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(17) {
                    let (r, g, b) = (r as u8, g as u8, b as u8);
                    let (h, s, l) = rgb_to_hsl(r, g, b);
                    let (r2, g2, b2) = hsl_to_rgb(h, s, l);
                    assert!(
                        r.abs_diff(r2) <= 1 && g.abs_diff(g2) <= 1 && b.abs_diff(b2) <= 1,
                        "({r},{g},{b}) came back as ({r2},{g2},{b2})"
                    );
                }
            }
        }
    }

    proptest! {
        #[test]
        fn round_trip_within_one(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            prop_assert!(r.abs_diff(r2) <= 1);
            prop_assert!(g.abs_diff(g2) <= 1);
            prop_assert!(b.abs_diff(b2) <= 1);
        }

        #[test]
        fn hsl_components_are_fractions(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            prop_assert!((0.0..1.0).contains(&h));
            prop_assert!((0.0..=1.0 + 1e-9).contains(&s));
            prop_assert!((0.0..=1.0).contains(&l));
        }
    }

    #[test]
    fn parse_six_digit_colors_are_opaque() {
        assert_eq!(parse_hex_color("#ff8000"), Ok(pack_argb(0xFF, 0x80, 0x00, 0xFF)));
        assert_eq!(parse_hex_color("00ff00"), Ok(0xFF00_FF00));
    }

    #[test]
    fn parse_eight_digit_colors_carry_alpha() {
        assert_eq!(parse_hex_color("#11223344"), Ok(0x4433_2211));
        assert_eq!(parse_hex_color("#00000000"), Ok(0));
    }

    #[test]
    fn parse_rejects_malformed_colors() {
        for bad in ["", "#", "#fff", "#12345", "#1234567", "#gg0000", "#ff00ff00ff"] {
            assert!(
                matches!(parse_hex_color(bad), Err(BlendError::InvalidRequest(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}

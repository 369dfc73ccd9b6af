//! Conversions between the engine's float signal and the 8-bit output.

/// Map a sample in [-1, 1] onto the unsigned 8-bit range: `round(127.5 * (s + 1))`.
///
/// Values outside [-1, 1] saturate at 0 and 255; NaN maps to 0.
#[inline]
pub fn quantize(sample: f32) -> u8 {
    if sample.is_nan() {
        return 0;
    }
    (127.5 * (sample.clamp(-1.0, 1.0) + 1.0)).round() as u8
}

/// Inverse of [`quantize`], for feeding 8-bit output to a float device.
#[inline]
pub fn dequantize(value: u8) -> f32 {
    value as f32 / 127.5 - 1.0
}

/// Signed form used by 8-bit WAV writers (midpoint 128 becomes 0).
#[inline]
pub fn to_signed(value: u8) -> i8 {
    (value as i16 - 128) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_maps_endpoints_and_center() {
        assert_eq!(quantize(-1.0), 0);
        assert_eq!(quantize(1.0), 255);
        // 127.5 rounds away from zero
        assert_eq!(quantize(0.0), 128);
    }

    #[test]
    fn quantize_saturates() {
        assert_eq!(quantize(2.7), 255);
        assert_eq!(quantize(-2.0), 0);
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(f32::INFINITY), 255);
    }

    #[test]
    fn dequantize_inverts_endpoints() {
        assert_eq!(dequantize(0), -1.0);
        assert_eq!(dequantize(255), 1.0);
        for v in [0u8, 17, 128, 200, 255] {
            assert_eq!(quantize(dequantize(v)), v);
        }
    }

    #[test]
    fn signed_conversion_centers_on_128() {
        assert_eq!(to_signed(128), 0);
        assert_eq!(to_signed(0), -128);
        assert_eq!(to_signed(255), 127);
    }
}

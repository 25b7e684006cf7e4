use num_derive::{FromPrimitive, ToPrimitive};

/// Address with A2..A0 strapped low.
pub const DEFAULT_ADDRESS: u8 = 0x48;
pub const ADDRESS_RANGE: std::ops::RangeInclusive<u8> = 0x48..=0x4F;

/// Typical time the sensor needs to complete one conversion, in milliseconds.
pub const CONVERSION_TIME_MS: u32 = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Register {
    Temperature = 0x00,
    Configuration = 0x01,
    Hysteresis = 0x02,
    OvertempShutdown = 0x03,
    ProductId = 0x07,
}

// limits of a 9-bit two's complement value counted in half degrees
const MIN_HALF_DEGREES: f32 = -256.0;
const MAX_HALF_DEGREES: f32 = 255.0;

/// Decodes a temperature register (MSB first) into degrees Celsius.
///
/// The top nine bits hold a two's complement count of half degrees, so the
/// value is sign extended before scaling. Any bits below bit 7 of the low
/// byte are ignored.
pub fn decode_temperature(raw: [u8; 2]) -> f32 {
    let half_degrees = i16::from_be_bytes(raw) >> 7;
    f32::from(half_degrees) / 2.0
}

/// Encodes degrees Celsius into the two bytes of a threshold register.
///
/// The value is doubled and truncated toward zero, then packed with the
/// half-degree bit in bit 7 of the low byte. Returns `None` if the value does
/// not fit in nine bits.
pub fn encode_temperature(celsius: f32) -> Option<[u8; 2]> {
    let half_degrees = (celsius * 2.0).trunc();
    if !(MIN_HALF_DEGREES..=MAX_HALF_DEGREES).contains(&half_degrees) {
        return None;
    }

    let bits = half_degrees as i16 as u16;
    Some([(bits >> 1) as u8, (bits << 7) as u8])
}

#[cfg(test)]
mod test {
    use num_traits::{FromPrimitive, ToPrimitive};

    use super::*;

    #[test]
    fn register_addresses() {
        assert_eq!(Register::Temperature.to_u8(), Some(0x00));
        assert_eq!(Register::Configuration.to_u8(), Some(0x01));
        assert_eq!(Register::Hysteresis.to_u8(), Some(0x02));
        assert_eq!(Register::OvertempShutdown.to_u8(), Some(0x03));
        assert_eq!(Register::ProductId.to_u8(), Some(0x07));
        assert_eq!(Register::from_u8(0x04), None);
    }

    #[test]
    fn decode_positive() {
        assert_eq!(decode_temperature([0x19, 0x00]), 25.0);
        assert_eq!(decode_temperature([0x19, 0x80]), 25.5);
        assert_eq!(decode_temperature([0x7F, 0x80]), 127.5);
        assert_eq!(decode_temperature([0x00, 0x00]), 0.0);
    }

    #[test]
    fn decode_ignores_low_bits() {
        // the part reports 11 bits, only the top 9 are used
        assert_eq!(decode_temperature([0x19, 0x7F]), 25.0);
        assert_eq!(decode_temperature([0x19, 0xE0]), 25.5);
    }

    #[test]
    fn decode_negative() {
        // values from the datasheet's temperature table
        assert_eq!(decode_temperature([0xFF, 0x80]), -0.5);
        assert_eq!(decode_temperature([0xE7, 0x00]), -25.0);
        assert_eq!(decode_temperature([0xC9, 0x00]), -55.0);
        assert_eq!(decode_temperature([0x80, 0x00]), -128.0);
    }

    #[test]
    fn encode_thresholds() {
        assert_eq!(encode_temperature(25.0), Some([25, 0x00]));
        assert_eq!(encode_temperature(80.0), Some([80, 0x00]));
        assert_eq!(encode_temperature(75.5), Some([75, 0x80]));
        assert_eq!(encode_temperature(-25.0), Some([0xE7, 0x00]));
        assert_eq!(encode_temperature(-0.5), Some([0xFF, 0x80]));
    }

    #[test]
    fn encode_truncates_toward_zero() {
        assert_eq!(encode_temperature(25.7), Some([25, 0x80]));
        assert_eq!(encode_temperature(-25.7), Some([0xE6, 0x80]));
    }

    #[test]
    fn encode_rejects_unrepresentable() {
        assert_eq!(encode_temperature(127.5), Some([0x7F, 0x80]));
        assert_eq!(encode_temperature(-128.0), Some([0x80, 0x00]));
        assert_eq!(encode_temperature(128.0), None);
        assert_eq!(encode_temperature(-128.5), None);
        assert_eq!(encode_temperature(f32::NAN), None);
        assert_eq!(encode_temperature(f32::INFINITY), None);
    }

    #[test]
    fn every_half_degree_survives_the_register() {
        for half_degrees in -256..=255 {
            let celsius = half_degrees as f32 / 2.0;
            let raw = encode_temperature(celsius).unwrap();
            assert_eq!(decode_temperature(raw), celsius, "{raw:02x?}");
        }
    }
}

use crate::crypto::Hash;
use primitive_types::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompactTargetError {
    #[error("compact target {0:#010x} encodes a negative value")]
    Negative(u32),
    #[error("compact target {0:#010x} overflows 256 bits")]
    Overflow(u32),
}

// Decode the compact 32-bit target representation: one exponent byte
// followed by a 3-byte mantissa. The value is mantissa * 256^(exponent - 3).
// Chain validation depends on exact equality with this encoding, so the
// edge cases matter: bit 0x00800000 is a sign flag and never part of a
// valid target, and an exponent of 3 or less shifts the mantissa right.
pub fn compact_to_target(bits: u32) -> Result<U256, CompactTargetError> {
    let exponent = (bits >> 24) as usize;
    let mantissa = bits & 0x007f_ffff;

    if bits & 0x0080_0000 != 0 && mantissa != 0 {
        return Err(CompactTargetError::Negative(bits));
    }

    if exponent <= 3 {
        return Ok(U256::from(mantissa >> (8 * (3 - exponent))));
    }

    if mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32))
    {
        return Err(CompactTargetError::Overflow(bits));
    }

    Ok(U256::from(mantissa) << (8 * (exponent - 3)))
}

// Encode a target back into its compact representation.
// The mantissa keeps the three most significant bytes; when its high bit
// would collide with the sign flag the value is shifted down one byte and
// the exponent bumped instead.
pub fn target_to_compact(target: &U256) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        target.low_u32() << (8 * (3 - size))
    } else {
        (*target >> (8 * (size - 3))).low_u32()
    };

    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | ((size as u32) << 24)
}

// Check that a block hash satisfies its claimed compact target.
// The hash is interpreted as a big-endian 256-bit integer; a target
// looser than `max_target` never passes, whatever the hash.
pub fn check_proof_of_work(
    hash: &Hash,
    bits: u32,
    max_target: &U256,
) -> Result<bool, CompactTargetError> {
    let target = compact_to_target(bits)?;
    if target.is_zero() || target > *max_target {
        return Ok(false);
    }
    Ok(U256::from_big_endian(hash.as_bytes()) <= target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_values() {
        // regtest: 0x7fffff << 232
        assert_eq!(
            compact_to_target(0x207fffff).unwrap(),
            U256::from(0x007f_ffff) << 232
        );
        // loosest mainnet target: 0x0fffff << 232
        assert_eq!(
            compact_to_target(0x200fffff).unwrap(),
            U256::from(0x000f_ffff) << 232
        );
        // genesis bits
        assert_eq!(
            compact_to_target(0x1e0fffff).unwrap(),
            U256::from(0x000f_ffff) << 216
        );
        // pure mantissa
        assert_eq!(compact_to_target(0x03123456).unwrap(), U256::from(0x123456));
    }

    #[test]
    fn test_low_exponent_shifts_right() {
        assert_eq!(compact_to_target(0x02123456).unwrap(), U256::from(0x1234));
        assert_eq!(compact_to_target(0x01123456).unwrap(), U256::from(0x12));
        assert_eq!(compact_to_target(0x00123456).unwrap(), U256::zero());
    }

    #[test]
    fn test_sign_bit_is_not_a_magnitude() {
        assert_eq!(
            compact_to_target(0x04923456),
            Err(CompactTargetError::Negative(0x04923456))
        );
        // sign bit with a zero mantissa decodes to zero
        assert_eq!(compact_to_target(0x04800000).unwrap(), U256::zero());
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            compact_to_target(0x23000001),
            Err(CompactTargetError::Overflow(0x23000001))
        );
        assert_eq!(
            compact_to_target(0x22000100),
            Err(CompactTargetError::Overflow(0x22000100))
        );
        // largest representable values still decode
        assert!(compact_to_target(0x220000ff).is_ok());
    }

    #[test]
    fn test_round_trip_on_round_values() {
        for bits in [0x1e0fffffu32, 0x200fffff, 0x207fffff, 0x1d00ffff, 0x03123456, 0x04123456] {
            let target = compact_to_target(bits).unwrap();
            assert_eq!(target_to_compact(&target), bits, "bits {:#010x}", bits);
        }
    }

    #[test]
    fn test_encode_avoids_sign_bit() {
        // 0x80 in the top mantissa byte must be pushed into the exponent
        let target = U256::from(0x0080_0000u32);
        let compact = target_to_compact(&target);
        assert_eq!(compact, 0x04008000);
        assert_eq!(compact_to_target(compact).unwrap(), target);
    }

    #[test]
    fn test_proof_of_work_bounds() {
        let max_target = compact_to_target(0x200fffff).unwrap();
        // the zero hash satisfies any sane target
        assert!(check_proof_of_work(&Hash::zero(), 0x1e0fffff, &max_target).unwrap());
        // the all-ones hash satisfies none
        assert!(!check_proof_of_work(&Hash::max(), 0x1e0fffff, &max_target).unwrap());
        // a target looser than the network maximum is rejected outright
        assert!(!check_proof_of_work(&Hash::zero(), 0x207fffff, &max_target).unwrap());
    }
}

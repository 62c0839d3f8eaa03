//! BIP-173 Bech32 encoding for native SegWit (witness version 0) addresses.

use crate::error::CodecError;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// BCH generator constants for the Bech32 checksum.
const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

/// Bech32 (not Bech32m) final XOR constant.
const CHECKSUM_CONST: u32 = 1;

const CHECKSUM_LEN: usize = 6;
const MAX_LEN: usize = 90;
const MAX_HRP_LEN: usize = 83;

/// A decoded SegWit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessProgram {
    pub hrp: String,
    pub version: u8,
    pub program: Vec<u8>,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut expanded = Vec::with_capacity(bytes.len() * 2 + 1);
    expanded.extend(bytes.iter().map(|b| b >> 5));
    expanded.push(0);
    expanded.extend(bytes.iter().map(|b| b & 0x1f));
    expanded
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let pm = polymod(&values) ^ CHECKSUM_CONST;

    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, slot) in checksum.iter_mut().enumerate() {
        *slot = ((pm >> (5 * (5 - i))) & 0x1f) as u8;
    }
    checksum
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == CHECKSUM_CONST
}

/// Regroup a stream of `from`-bit values into `to`-bit values.
///
/// With `pad` the trailing partial group is zero-padded (encoding direction);
/// without it, leftover bits must be fewer than `from` and all zero
/// (decoding direction).
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, CodecError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return Err(CodecError::InvalidGroupValue(from));
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return Err(CodecError::InvalidPadding);
    }

    Ok(out)
}

fn check_program_len(len: usize) -> Result<(), CodecError> {
    match len {
        20 | 32 => Ok(()),
        other => Err(CodecError::UnsupportedWitnessLength(other)),
    }
}

fn check_hrp(hrp: &str) -> Result<(), CodecError> {
    if hrp.is_empty() || hrp.len() > MAX_HRP_LEN {
        return Err(CodecError::InvalidHrp(format!(
            "length must be 1..={MAX_HRP_LEN}, got {}",
            hrp.len()
        )));
    }
    if let Some(bad) = hrp.chars().find(|c| !(33..=126).contains(&(*c as u32))) {
        return Err(CodecError::InvalidCharacter(bad));
    }
    Ok(())
}

/// Encode a version-0 witness program as a Bech32 address.
pub fn bech32_encode(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String, CodecError> {
    check_hrp(hrp)?;
    if witness_version != 0 {
        return Err(CodecError::UnsupportedWitnessVersion(witness_version));
    }
    check_program_len(program.len())?;

    let hrp = hrp.to_ascii_lowercase();
    let mut data = vec![witness_version];
    data.extend(convert_bits(program, 8, 5, true)?);
    let checksum = create_checksum(&hrp, &data);

    let mut encoded = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    encoded.push_str(&hrp);
    encoded.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        encoded.push(CHARSET[d as usize] as char);
    }
    Ok(encoded)
}

/// Decode a Bech32 SegWit address.
///
/// Accepts all-lowercase or all-uppercase input. Only witness version 0 with a
/// 20- or 32-byte program is accepted.
pub fn bech32_decode(encoded: &str) -> Result<WitnessProgram, CodecError> {
    if encoded.len() > MAX_LEN {
        return Err(CodecError::InvalidLength(format!(
            "bech32 string longer than {MAX_LEN} characters"
        )));
    }

    let has_lower = encoded.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = encoded.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(CodecError::MixedCase);
    }
    let lower = encoded.to_ascii_lowercase();

    let sep = lower
        .rfind('1')
        .ok_or_else(|| CodecError::InvalidHrp("missing separator".into()))?;
    if sep == 0 {
        return Err(CodecError::InvalidHrp("empty human-readable part".into()));
    }
    if sep + 1 + CHECKSUM_LEN > lower.len() {
        return Err(CodecError::InvalidLength("data part too short".into()));
    }

    let (hrp, rest) = lower.split_at(sep);
    check_hrp(hrp)?;

    let mut data = Vec::with_capacity(rest.len() - 1);
    for c in rest[1..].chars() {
        let index = CHARSET
            .iter()
            .position(|&b| b as char == c)
            .ok_or(CodecError::InvalidCharacter(c))?;
        data.push(index as u8);
    }

    if !verify_checksum(hrp, &data) {
        return Err(CodecError::InvalidChecksum);
    }

    let payload = &data[..data.len() - CHECKSUM_LEN];
    let (&version, program_5bit) = payload
        .split_first()
        .ok_or_else(|| CodecError::InvalidLength("empty data part".into()))?;
    if version != 0 {
        return Err(CodecError::UnsupportedWitnessVersion(version));
    }

    let program = convert_bits(program_5bit, 5, 8, false)?;
    check_program_len(program.len())?;

    Ok(WitnessProgram {
        hrp: hrp.to_string(),
        version,
        program,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2WPKH_VECTOR: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    const P2WPKH_PROGRAM: &str = "751e76e8199196d454941c45d1b3a323f1433bd6";
    const P2WSH_VECTOR: &str = "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7";
    const P2WSH_PROGRAM: &str = "1863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262";

    #[test]
    fn encodes_bip173_p2wpkh_vector() {
        let program = hex::decode(P2WPKH_PROGRAM).unwrap();
        assert_eq!(bech32_encode("bc", 0, &program).unwrap(), P2WPKH_VECTOR);
    }

    #[test]
    fn encodes_bip173_p2wsh_vector() {
        let program = hex::decode(P2WSH_PROGRAM).unwrap();
        assert_eq!(bech32_encode("tb", 0, &program).unwrap(), P2WSH_VECTOR);
    }

    #[test]
    fn decodes_bip173_vectors() {
        let decoded = bech32_decode(P2WPKH_VECTOR).unwrap();
        assert_eq!(decoded.hrp, "bc");
        assert_eq!(decoded.version, 0);
        assert_eq!(hex::encode(&decoded.program), P2WPKH_PROGRAM);

        let decoded = bech32_decode(P2WSH_VECTOR).unwrap();
        assert_eq!(decoded.hrp, "tb");
        assert_eq!(hex::encode(&decoded.program), P2WSH_PROGRAM);
    }

    #[test]
    fn decodes_uppercase_input() {
        let decoded = bech32_decode(&P2WPKH_VECTOR.to_ascii_uppercase()).unwrap();
        assert_eq!(decoded.hrp, "bc");
        assert_eq!(hex::encode(&decoded.program), P2WPKH_PROGRAM);
    }

    #[test]
    fn litecoin_roundtrip() {
        let program = [0x42u8; 20];
        let encoded = bech32_encode("ltc", 0, &program).unwrap();
        assert!(encoded.starts_with("ltc1q"));
        let decoded = bech32_decode(&encoded).unwrap();
        assert_eq!(
            decoded,
            WitnessProgram {
                hrp: "ltc".into(),
                version: 0,
                program: program.to_vec(),
            }
        );
    }

    #[test]
    fn every_data_character_flip_fails_checksum() {
        let sep = P2WPKH_VECTOR.rfind('1').unwrap();
        let charset: Vec<char> = CHARSET.iter().map(|&b| b as char).collect();

        for i in sep + 1..P2WPKH_VECTOR.len() {
            let ch = P2WPKH_VECTOR.as_bytes()[i] as char;
            let pos = charset.iter().position(|&c| c == ch).unwrap();
            let mut flipped = P2WPKH_VECTOR.to_string();
            flipped.replace_range(i..i + 1, &charset[(pos + 1) % 32].to_string());

            assert_eq!(
                bech32_decode(&flipped),
                Err(CodecError::InvalidChecksum),
                "flip at position {i} was not rejected"
            );
        }
    }

    #[test]
    fn hrp_change_fails_checksum() {
        let tampered = P2WPKH_VECTOR.replacen("bc1", "bd1", 1);
        assert_eq!(bech32_decode(&tampered), Err(CodecError::InvalidChecksum));
    }

    #[test]
    fn rejects_bip173_invalid_checksum() {
        assert_eq!(
            bech32_decode("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5"),
            Err(CodecError::InvalidChecksum)
        );
    }

    #[test]
    fn rejects_mixed_case() {
        assert_eq!(
            bech32_decode("tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sL5k7"),
            Err(CodecError::MixedCase)
        );
    }

    #[test]
    fn rejects_invalid_bip173_strings() {
        for invalid in [
            "BC13W508D6QEJXTDG4Y5R3ZARVARY0C5XW7KN40WF2",
            "bc1rw5uspcuh",
            "bc1zw508d6qejxtdg4y5r3zarvaryvqyzf3du",
            "tb1pw508d6qejxtdg4y5r3zarqfsj6c3",
            "bc1gmk9yu",
            "bc1",
        ] {
            assert!(bech32_decode(invalid).is_err(), "{invalid} should be rejected");
        }
    }

    #[test]
    fn rejects_character_outside_charset() {
        // 'b' and 'i' are not part of the bech32 charset.
        let tampered = P2WPKH_VECTOR.replacen("w508", "w5b8", 1);
        assert_eq!(bech32_decode(&tampered), Err(CodecError::InvalidCharacter('b')));
    }

    #[test]
    fn encode_rejects_unsupported_program_length() {
        assert_eq!(
            bech32_encode("ltc", 0, &[0u8; 21]),
            Err(CodecError::UnsupportedWitnessLength(21))
        );
    }

    #[test]
    fn encode_rejects_nonzero_version() {
        assert_eq!(
            bech32_encode("bc", 1, &[0u8; 32]),
            Err(CodecError::UnsupportedWitnessVersion(1))
        );
    }

    #[test]
    fn decode_rejects_unsupported_program_length() {
        // Valid checksum around a 16-byte version-0 program.
        let mut data = vec![0u8];
        data.extend(convert_bits(&[0x11u8; 16], 8, 5, true).unwrap());
        let checksum = create_checksum("bc", &data);
        let mut encoded = String::from("bc1");
        for &d in data.iter().chain(checksum.iter()) {
            encoded.push(CHARSET[d as usize] as char);
        }

        assert_eq!(
            bech32_decode(&encoded),
            Err(CodecError::UnsupportedWitnessLength(16))
        );
    }

    #[test]
    fn convert_bits_roundtrip() {
        let bytes = [0x00u8, 0xff, 0x10, 0x80, 0x7f];
        let five = convert_bits(&bytes, 8, 5, true).unwrap();
        assert!(five.iter().all(|&v| v < 32));
        assert_eq!(convert_bits(&five, 5, 8, false).unwrap(), bytes);
    }

    #[test]
    fn convert_bits_rejects_out_of_range_value() {
        assert_eq!(
            convert_bits(&[32u8], 5, 8, false),
            Err(CodecError::InvalidGroupValue(5))
        );
    }
}

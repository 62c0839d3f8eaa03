use crate::error::CodecError;
use crate::hash::checksum4;

/// The standard Bitcoin base-58 alphabet.
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the hash carried by a legacy address.
pub const PAYLOAD_LEN: usize = 20;

const CHECKSUM_LEN: usize = 4;

/// Base58Check-encode a version byte and a 20-byte payload.
///
/// Layout before base-58: `version (1) || payload (20) || checksum (4)`,
/// where the checksum is the first four bytes of `sha256d(version || payload)`.
pub fn base58check_encode(version: u8, payload: &[u8; PAYLOAD_LEN]) -> String {
    let mut data = Vec::with_capacity(1 + PAYLOAD_LEN + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = checksum4(&data);
    data.extend_from_slice(&checksum);
    bs58::encode(data).into_string()
}

/// Decode a Base58Check string into its version byte and 20-byte payload.
///
/// The checksum is verified before the length, so a corrupted string reports
/// `InvalidChecksum` even when the corruption also changed the decoded length.
pub fn base58check_decode(encoded: &str) -> Result<(u8, [u8; PAYLOAD_LEN]), CodecError> {
    if let Some(bad) = encoded.chars().find(|c| !ALPHABET.contains(*c)) {
        return Err(CodecError::InvalidCharacter(bad));
    }

    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CodecError::InvalidLength(format!("base58 decode failed: {e}")))?;

    if decoded.len() <= CHECKSUM_LEN {
        return Err(CodecError::InvalidLength(format!(
            "expected {} bytes, got {}",
            1 + PAYLOAD_LEN + CHECKSUM_LEN,
            decoded.len()
        )));
    }

    let (body, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != checksum4(body) {
        return Err(CodecError::InvalidChecksum);
    }

    if body.len() != 1 + PAYLOAD_LEN {
        return Err(CodecError::InvalidLength(format!(
            "expected {} bytes, got {}",
            1 + PAYLOAD_LEN + CHECKSUM_LEN,
            decoded.len()
        )));
    }

    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&body[1..]);
    Ok((body[0], payload))
}

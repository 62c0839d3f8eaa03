/// Strict DER encoding of an ECDSA signature from its 32-byte `r` and `s`.
///
/// Produces `0x30 <len> 0x02 <rlen> r 0x02 <slen> s` where each integer is
/// minimal: leading zero bytes are stripped and a single zero is prepended
/// when the high bit of the first remaining byte is set.
pub fn der_encode_signature(r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let r = der_integer(r);
    let s = der_integer(s);

    let mut out = Vec::with_capacity(6 + r.len() + s.len());
    out.push(0x30);
    out.push((4 + r.len() + s.len()) as u8);
    out.push(0x02);
    out.push(r.len() as u8);
    out.extend_from_slice(&r);
    out.push(0x02);
    out.push(s.len() as u8);
    out.extend_from_slice(&s);
    out
}

fn der_integer(bytes: &[u8; 32]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &bytes[first_nonzero..];

    let mut out = Vec::with_capacity(33);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

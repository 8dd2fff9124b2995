//! # Bech32 / Bech32m Codec
//!
//! The two encodings share everything except the final checksum constant:
//! BIP-173 (Bech32) XORs 1, BIP-350 (Bech32m) XORs 0x2bc830a3. The decoder
//! tries both and reports which one matched.
//!
//! Format: `<hrp>` + `1` + data characters + 6 checksum characters, charset
//! `qpzry9x8gf2tvdw0s3jn54khce6mua7l`, at most 90 characters, no mixed case.

/// The Bech32 character set for encoding.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// The Bech32 character set for decoding (ASCII index -> 5-bit value).
const CHARSET_REV: [i8; 128] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    15, -1, 10, 17, 21, 20, 26, 30,  7,  5, -1, -1, -1, -1, -1, -1,
    -1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
     1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
    -1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
     1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
];

/// BIP-173 checksum constant.
const BECH32_CONST: u32 = 1;
/// BIP-350 checksum constant.
const BECH32M_CONST: u32 = 0x2bc8_30a3;

/// Maximum total address length.
const MAX_LENGTH: usize = 90;

/// Which checksum variant a string carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// BIP-173 Bech32 (witness v0).
    Bech32,
    /// BIP-350 Bech32m (witness v1+, including quantum).
    Bech32m,
}

impl Encoding {
    fn checksum_const(self) -> u32 {
        match self {
            Encoding::Bech32 => BECH32_CONST,
            Encoding::Bech32m => BECH32M_CONST,
        }
    }
}

/// A successfully decoded string: the variant that matched, the lowercased
/// HRP, and the 5-bit data values with the checksum stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Checksum variant that verified.
    pub encoding: Encoding,
    /// Human-readable part, lowercased.
    pub hrp: String,
    /// Data values (each 0..32), checksum removed.
    pub data: Vec<u8>,
}

/// BCH checksum over 5-bit values packed into a 30-bit accumulator.
fn polymod(values: &[u8]) -> u32 {
    let mut c: u32 = 1;
    for &v in values {
        let c0 = (c >> 25) as u8;
        c = ((c & 0x1ff_ffff) << 5) ^ u32::from(v);
        if c0 & 1 != 0 {
            c ^= 0x3b6a_57b2;
        }
        if c0 & 2 != 0 {
            c ^= 0x2650_8e6d;
        }
        if c0 & 4 != 0 {
            c ^= 0x1ea1_19fa;
        }
        if c0 & 8 != 0 {
            c ^= 0x3d42_33dd;
        }
        if c0 & 16 != 0 {
            c ^= 0x2a14_62b3;
        }
    }
    c
}

/// Expand an HRP for checksum computation.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut ret = Vec::with_capacity(bytes.len() * 2 + 1);
    ret.extend(bytes.iter().map(|b| b >> 5));
    ret.push(0);
    ret.extend(bytes.iter().map(|b| b & 0x1f));
    ret
}

fn create_checksum(hrp: &str, values: &[u8], encoding: Encoding) -> [u8; 6] {
    let mut enc = expand_hrp(hrp);
    enc.extend_from_slice(values);
    enc.extend_from_slice(&[0u8; 6]);
    let m = polymod(&enc) ^ encoding.checksum_const();
    let mut checksum = [0u8; 6];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((m >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

fn verify_checksum(hrp: &str, values: &[u8]) -> Option<Encoding> {
    let mut enc = expand_hrp(hrp);
    enc.extend_from_slice(values);
    match polymod(&enc) {
        BECH32_CONST => Some(Encoding::Bech32),
        BECH32M_CONST => Some(Encoding::Bech32m),
        _ => None,
    }
}

/// Encode 5-bit data values under `hrp` with the given checksum variant.
///
/// `hrp` must already be lowercase; `data` values must all be below 32.
pub fn encode(hrp: &str, data: &[u8], encoding: Encoding) -> String {
    let checksum = create_checksum(hrp, data, encoding);
    let mut ret = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    ret.push_str(hrp);
    ret.push('1');
    for &v in data.iter().chain(checksum.iter()) {
        ret.push(CHARSET[v as usize] as char);
    }
    ret
}

/// Decode a Bech32 or Bech32m string, detecting which variant matched.
///
/// Returns `None` when the string is not well-formed under either variant
/// (mixed case, over 90 characters, bad separator position, characters
/// outside the charset, or checksum failure).
pub fn decode(s: &str) -> Option<Decoded> {
    let mut lower = false;
    let mut upper = false;
    for c in s.chars() {
        let c = c as u32;
        if !(33..=126).contains(&c) {
            return None;
        }
        if (97..=122).contains(&c) {
            lower = true;
        }
        if (65..=90).contains(&c) {
            upper = true;
        }
    }
    if lower && upper {
        return None;
    }

    let pos = s.rfind('1')?;
    if s.len() > MAX_LENGTH || pos == 0 || pos + 7 > s.len() {
        return None;
    }

    let hrp: String = s[..pos].to_lowercase();
    let mut values = Vec::with_capacity(s.len() - 1 - pos);
    for &b in s[pos + 1..].as_bytes() {
        let rev = CHARSET_REV[b as usize & 0x7f];
        if rev < 0 || b >= 128 {
            return None;
        }
        values.push(rev as u8);
    }

    let encoding = verify_checksum(&hrp, &values)?;
    values.truncate(values.len() - 6);
    Some(Decoded {
        encoding,
        hrp,
        data: values,
    })
}

/// Repack bit groups, e.g. 8-bit bytes to 5-bit values (`pad = true` when
/// encoding) and back (`pad = false` when decoding, rejecting nonzero
/// padding).
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut ret = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return None;
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return None;
    }
    Some(ret)
}

//! Private utility module

/// Approximate a non-negative value as a fraction whose terms fit in `u32`,
/// by walking its continued fraction expansion.
///
/// Returns `None` for negative, non-finite or out of range values.
pub fn to_rational(value: f64) -> Option<(u32, u32)> {
    if !value.is_finite() || value < 0. || value > f64::from(u32::MAX) {
        return None;
    }

    let max = u64::from(u32::MAX);
    // convergents h(n-2)/k(n-2) and h(n-1)/k(n-1)
    let (mut h0, mut h1) = (0u64, 1u64);
    let (mut k0, mut k1) = (1u64, 0u64);
    let mut x = value;
    loop {
        let a = x.floor();
        let a_int = a as u64;
        let h2 = match a_int.checked_mul(h1).and_then(|v| v.checked_add(h0)) {
            Some(h) if h <= max => h,
            _ => break,
        };
        let k2 = match a_int.checked_mul(k1).and_then(|v| v.checked_add(k0)) {
            Some(k) if k <= max => k,
            _ => break,
        };
        h0 = h1;
        h1 = h2;
        k0 = k1;
        k1 = k2;

        let frac = x - a;
        let approx = h1 as f64 / k1 as f64;
        if frac <= f64::EPSILON || (approx - value).abs() <= value * 1e-12 {
            break;
        }
        x = 1. / frac;
    }

    if k1 == 0 {
        None
    } else {
        Some((h1 as u32, k1 as u32))
    }
}

/// Replace every non-ASCII character with a `\uXXXX` escape sequence
/// (one per UTF-16 code unit), the way ImageJ expects text in the
/// image description.
pub fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04X}", unit));
            }
        }
    }
    out
}

/// Reverse of `escape_non_ascii`. Malformed escapes are kept verbatim.
pub fn unescape_non_ascii(text: &str) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("\\u") {
        units.extend(rest[..pos].encode_utf16());
        let hex = rest.get(pos + 2..pos + 6);
        match hex.and_then(|h| u16::from_str_radix(h, 16).ok()) {
            Some(unit) => {
                units.push(unit);
                rest = &rest[pos + 6..];
            }
            None => {
                units.extend("\\u".encode_utf16());
                rest = &rest[pos + 2..];
            }
        }
    }
    units.extend(rest.encode_utf16());
    String::from_utf16_lossy(&units)
}

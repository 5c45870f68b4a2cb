//! Integer literal parsing (spec §4.2): `<width>'<base><digits>` or a bare
//! decimal integer.

use crate::core::ElabError;

/// Parse a SystemRDL integer literal, returning its value and, if the
/// literal carried an explicit width prefix, that width.
///
/// Supported forms: `42`, `-7`, `8'h1A`, `4'b1010`, `32'd100`, `'o17`
/// (unsized but based). An optional `s` right after the `'` marks the
/// literal signed (`8'sd-1`); this only affects sign-extension when the
/// value is later masked to its width.
pub fn parse_int_literal(text: &str) -> Result<(i64, Option<u32>), ElabError> {
    let text = text.trim();
    let Some(tick) = text.find('\'') else {
        return text
            .parse::<i64>()
            .map(|v| (v, None))
            .map_err(|_| ElabError::Unsupported(format!("invalid integer literal '{text}'")));
    };

    let (width_part, rest) = text.split_at(tick);
    let rest = &rest[1..]; // drop the tick

    let width: Option<u32> = if width_part.is_empty() {
        None
    } else {
        Some(
            width_part
                .parse()
                .map_err(|_| ElabError::Unsupported(format!("invalid literal width in '{text}'")))?,
        )
    };
    if let Some(w) = width {
        if w > 64 {
            return Err(ElabError::OverflowInWidth);
        }
    }

    let mut chars = rest.chars();
    let mut signed = false;
    let mut base_char = chars.next().ok_or_else(|| ElabError::Unsupported(format!("empty literal body in '{text}'")))?;
    if base_char == 's' || base_char == 'S' {
        signed = true;
        base_char = chars.next().ok_or_else(|| ElabError::Unsupported(format!("empty literal body in '{text}'")))?;
    }
    let radix = match base_char.to_ascii_lowercase() {
        'b' => 2,
        'o' => 8,
        'd' => 10,
        'h' => 16,
        _ => return Err(ElabError::Unsupported(format!("unknown literal base in '{text}'"))),
    };
    let digits: String = chars.filter(|c| *c != '_').collect();
    let raw = u64::from_str_radix(&digits, radix)
        .map_err(|_| ElabError::Unsupported(format!("invalid digits in literal '{text}'")))?;

    let value = match width {
        Some(w) if w < 64 => {
            let mask: u64 = (1u64 << w) - 1;
            let masked = raw & mask;
            if signed && w > 0 && (masked >> (w - 1)) & 1 == 1 {
                (masked as i64) - (1i64 << w)
            } else {
                masked as i64
            }
        }
        _ => raw as i64,
    };
    Ok((value, width))
}

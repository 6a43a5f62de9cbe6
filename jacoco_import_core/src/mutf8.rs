//! Java's "modified UTF-8", the string encoding of `DataOutput::writeUTF`
//! and of class-file `CONSTANT_Utf8` entries.
//!
//! Characters outside the BMP are stored as two 3-byte surrogates and NUL is
//! stored as `C0 80`, so plain `str::from_utf8` rejects or misreads both.

pub fn decode(bytes: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut index = 0usize;
    while index < bytes.len() {
        let lead = bytes[index];
        match lead >> 4 {
            0x0..=0x7 => {
                units.push(u16::from(lead));
                index += 1;
            }
            0xC | 0xD => {
                let second = continuation(bytes, index + 1)?;
                units.push((u16::from(lead & 0x1F) << 6) | u16::from(second & 0x3F));
                index += 2;
            }
            0xE => {
                let second = continuation(bytes, index + 1)?;
                let third = continuation(bytes, index + 2)?;
                units.push(
                    (u16::from(lead & 0x0F) << 12)
                        | (u16::from(second & 0x3F) << 6)
                        | u16::from(third & 0x3F),
                );
                index += 3;
            }
            _ => return None,
        }
    }
    String::from_utf16(&units).ok()
}

pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

fn continuation(bytes: &[u8], index: usize) -> Option<u8> {
    bytes
        .get(index)
        .copied()
        .filter(|byte| byte & 0xC0 == 0x80)
}

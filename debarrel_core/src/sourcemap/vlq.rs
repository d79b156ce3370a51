const BASE64_DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const VLQ_SHIFT: u32 = 5;
const VLQ_CONTINUATION: i64 = 1 << VLQ_SHIFT;
const VLQ_MASK: i64 = VLQ_CONTINUATION - 1;

pub fn encode_vlq(value: i64, out: &mut String) {
    let mut rest = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = rest & VLQ_MASK;
        rest >>= VLQ_SHIFT;
        if rest > 0 {
            digit |= VLQ_CONTINUATION;
        }
        out.push(BASE64_DIGITS[digit as usize] as char);
        if rest == 0 {
            break;
        }
    }
}

/// Decodes one comma-free mappings segment into its fields.
pub fn decode_vlq_segment(segment: &str) -> Option<Vec<i64>> {
    let mut fields = vec![];
    let mut value = 0i64;
    let mut shift = 0u32;
    for byte in segment.bytes() {
        let digit = BASE64_DIGITS.iter().position(|d| *d == byte)? as i64;
        value += (digit & VLQ_MASK) << shift;
        if digit & VLQ_CONTINUATION != 0 {
            shift += VLQ_SHIFT;
            continue;
        }
        let negative = value & 1 == 1;
        let magnitude = value >> 1;
        fields.push(if negative { -magnitude } else { magnitude });
        value = 0;
        shift = 0;
    }
    (shift == 0).then_some(fields)
}

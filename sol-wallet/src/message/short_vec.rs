//! Compact length prefix used throughout the wire format: 7 bits per byte,
//! high bit set while more bytes follow.

pub fn encode_len(len: usize, out: &mut Vec<u8>) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_len(len, &mut out);
        out
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0x7f), vec![0x7f]);
        assert_eq!(encoded(0x80), vec![0x80, 0x01]);
        assert_eq!(encoded(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encoded(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(encoded(0xffff), vec![0xff, 0xff, 0x03]);
    }
}

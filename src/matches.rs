/// Build a 256 entries lookup table from a byte pattern.
macro_rules! byte_map {
    {
        $(#[$meta:meta])*
        $vis:vis const $id:ident = { $pat:pat };
    } => {
        $(#[$meta])*
        $vis static $id: [bool; 256] = {
            let mut bytes = [false; 256];
            let mut byte = 0u8;
            loop {
                bytes[byte as usize] = matches!(byte, $pat);
                if byte == 255 {
                    break;
                }
                byte += 1;
            }
            bytes
        };
    };
}

byte_map! {
    /// Header field name characters.
    const TOKEN = {
        b'a'..=b'z'
        | b'A'..=b'Z'
        | b'0'..=b'9'
        | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
        | b'`' | b'|' | b'~'
    };
}

byte_map! {
    /// Request method characters.
    const METHOD = { b'A'..=b'Z' };
}

#[inline]
pub(crate) fn is_token(byte: u8) -> bool {
    TOKEN[byte as usize]
}

#[inline]
pub(crate) fn is_method(byte: u8) -> bool {
    METHOD[byte as usize]
}

/// Returns the index of the first `\r\n` in `bytes`.
pub(crate) fn find_crlf(bytes: &[u8]) -> Option<usize> {
    let mut state = bytes;
    let mut offset = 0;

    while let Some(nth) = state.iter().position(|&b| b == b'\r') {
        if let Some(b'\n') = state.get(nth + 1) {
            return Some(offset + nth);
        }
        offset += nth + 1;
        state = &state[nth + 1..];
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b""), None);
        assert_eq!(find_crlf(b"\r"), None);
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"GET / HTTP/1.1\r\n"), Some(14));
        assert_eq!(find_crlf(b"a\rb\r\n"), Some(3));
        assert_eq!(find_crlf(b"a\r\r\n"), Some(2));
        assert_eq!(find_crlf(b"a\nb"), None);
    }

    #[test]
    fn test_byte_tables() {
        for byte in b"abcXYZ019!#$%&'*+-.^_`|~" {
            assert!(is_token(*byte), "{}", *byte as char);
        }
        for byte in b" \t:{}()\"/\\@,;<=>?[]\x7f\x80" {
            assert!(!is_token(*byte), "{}", *byte as char);
        }
        assert!(is_method(b'G'));
        assert!(!is_method(b'g'));
        assert!(!is_method(b'-'));
    }
}

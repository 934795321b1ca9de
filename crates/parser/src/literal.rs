//! Decoding of quoted string literals from their fragment / escape pieces.

/// Accumulates a string literal's value piece by piece.
///
/// UTF-16 surrogate pairs written as two `\uXXXX` escapes are joined; lone surrogates decode
/// to U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct StringDecoder {
    out: String,
    pending_high: Option<u32>,
}

impl StringDecoder {
    pub(crate) fn push_fragment(&mut self, text: &str) {
        self.flush_pending();
        self.out.push_str(text);
    }

    pub(crate) fn push_escape(&mut self, escape: &str) {
        let Some(body) = escape.strip_prefix('\\') else {
            self.push_fragment(escape);
            return;
        };
        let mut chars = body.chars();
        let Some(first) = chars.next() else {
            return;
        };

        match first {
            'n' => self.push_char('\n'),
            't' => self.push_char('\t'),
            'r' => self.push_char('\r'),
            'b' => self.push_char('\u{8}'),
            'f' => self.push_char('\u{c}'),
            'v' => self.push_char('\u{b}'),
            '0'..='7' => match u32::from_str_radix(body, 8) {
                Ok(code) => self.push_code_point(code),
                Err(_) => self.push_fragment(body),
            },
            'x' => match u32::from_str_radix(chars.as_str(), 16) {
                Ok(code) => self.push_code_point(code),
                Err(_) => self.push_fragment(body),
            },
            'u' => {
                let digits = chars.as_str();
                let digits = digits
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .unwrap_or(digits);
                match u32::from_str_radix(digits, 16) {
                    Ok(code) => self.push_code_point(code),
                    Err(_) => self.push_fragment(body),
                }
            }
            // line continuation
            '\r' | '\n' | '\u{2028}' | '\u{2029}' => self.flush_pending(),
            other => self.push_char(other),
        }
    }

    pub(crate) fn finish(mut self) -> String {
        self.flush_pending();
        self.out
    }

    fn push_char(&mut self, ch: char) {
        self.flush_pending();
        self.out.push(ch);
    }

    fn push_code_point(&mut self, code: u32) {
        match code {
            0xD800..=0xDBFF => {
                self.flush_pending();
                self.pending_high = Some(code);
            }
            0xDC00..=0xDFFF => match self.pending_high.take() {
                Some(high) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                    self.out
                        .push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => self.out.push(char::REPLACEMENT_CHARACTER),
            },
            _ => {
                self.flush_pending();
                self.out
                    .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    fn flush_pending(&mut self) {
        if self.pending_high.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }
}

use std::ops::Range;

/// Minimal C++ token scanner yielding byte ranges.
///
/// Comments and whitespace are skipped; string and character literals,
/// identifiers and `::` come out as single tokens, everything else one byte
/// at a time. Good enough to walk a class head, not a full lexer.
pub struct TokenScanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TokenScanner<'a> {
    pub fn new(source: &'a str, start: usize) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: start.min(source.len()),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.starts_with(b"//") {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if self.starts_with(b"/*") {
                self.pos += 2;
                while self.pos < self.bytes.len() && !self.starts_with(b"*/") {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
            } else {
                return;
            }
        }
    }

    fn starts_with(&self, needle: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(needle)
    }

    fn skip_literal(&mut self, quote: u8) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => return,
                c if c == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

impl Iterator for TokenScanner<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        if self.pos >= self.bytes.len() {
            return None;
        }

        let start = self.pos;
        match self.bytes[self.pos] {
            b if is_ident_byte(b) => {
                while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
                    self.pos += 1;
                }
            }
            quote @ (b'"' | b'\'') => self.skip_literal(quote),
            b':' if self.starts_with(b"::") => self.pos += 2,
            _ => self.pos += 1,
        }
        Some(start..self.pos)
    }
}

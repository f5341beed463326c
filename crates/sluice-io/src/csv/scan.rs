//! Record boundary scanner.
//!
//! Finds the next line terminator outside double quotes. State survives
//! between calls so a record split across pushes is not rescanned from the
//! start.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Bytes in the record, terminator excluded.
    pub len: usize,
    /// Offset just past the terminator.
    pub next: usize,
}

#[derive(Debug, Default)]
pub struct LineScanner {
    scanned: usize,
    in_quotes: bool,
}

impl LineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next complete record at the front of `data`. `data` must start at the
    /// same position as on the previous call that returned `None`.
    pub fn next_line(&mut self, data: &[u8]) -> Option<LineSpan> {
        let mut i = self.scanned;
        while i < data.len() {
            match data[i] {
                b'"' => self.in_quotes = !self.in_quotes,
                b'\n' | b'\r' if !self.in_quotes => {
                    let next = if data[i] == b'\r' && data.get(i + 1) == Some(&b'\n') {
                        i + 2
                    } else {
                        i + 1
                    };
                    self.reset();
                    return Some(LineSpan { len: i, next });
                }
                _ => {}
            }
            i += 1;
        }
        self.scanned = data.len();
        None
    }

    pub fn reset(&mut self) {
        self.scanned = 0;
        self.in_quotes = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators() {
        let mut sc = LineScanner::new();
        assert_eq!(sc.next_line(b"a,b\nc"), Some(LineSpan { len: 3, next: 4 }));
        assert_eq!(sc.next_line(b"a\r\nb"), Some(LineSpan { len: 1, next: 3 }));
        assert_eq!(sc.next_line(b"a\rb"), Some(LineSpan { len: 1, next: 2 }));
        assert_eq!(sc.next_line(b"\n"), Some(LineSpan { len: 0, next: 1 }));
    }

    #[test]
    fn quoted_newline_is_not_a_terminator() {
        let mut sc = LineScanner::new();
        assert_eq!(
            sc.next_line(b"\"x\ny\",1\n"),
            Some(LineSpan { len: 7, next: 8 })
        );
    }

    #[test]
    fn resumes_inside_quotes() {
        let mut sc = LineScanner::new();
        assert_eq!(sc.next_line(b"\"ab\n"), None);
        assert_eq!(sc.next_line(b"\"ab\ncd\"\n"), Some(LineSpan { len: 7, next: 8 }));
    }
}

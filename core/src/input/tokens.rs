//! Whitespace-delimited tokens.

use std::io;

/// A reader of whitespace-delimited tokens.
///
/// Tokens are read into an internal buffer, which is reused between tokens.
#[derive(Debug)]
pub struct Tokens<R> {
    inner: R,
    buf: Vec<u8>,
    replay: bool,
}

impl<R> Tokens<R>
where
    R: io::BufRead,
{
    /// Creates a new token reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            replay: false,
        }
    }

    /// Returns the next token, or `None` if the reader is exhausted.
    pub fn next_token(&mut self) -> io::Result<Option<&[u8]>> {
        if self.replay {
            self.replay = false;
            return Ok(Some(&self.buf));
        }

        match self.skip_while(|b| b.is_ascii_whitespace())? {
            Some(_) => {
                self.read_token()?;
                Ok(Some(&self.buf))
            }
            None => Ok(None),
        }
    }

    /// Returns the next token on the current line.
    ///
    /// Returns `None` when reaching the end of the line, in which case the newline is consumed, or
    /// when the reader is exhausted.
    pub fn next_token_on_line(&mut self) -> io::Result<Option<&[u8]>> {
        if self.replay {
            self.replay = false;
            return Ok(Some(&self.buf));
        }

        match self.skip_while(|b| b != b'\n' && b.is_ascii_whitespace())? {
            Some(b'\n') => {
                self.inner.consume(1);
                Ok(None)
            }
            Some(_) => {
                self.read_token()?;
                Ok(Some(&self.buf))
            }
            None => Ok(None),
        }
    }

    /// Makes the most recently read token be returned again by the next read.
    pub fn unread(&mut self) {
        self.replay = true;
    }

    /// Consumes bytes matching the predicate, and returns the next byte without consuming it.
    fn skip_while<F>(&mut self, predicate: F) -> io::Result<Option<u8>>
    where
        F: Fn(u8) -> bool,
    {
        loop {
            let (skip, next) = {
                let src = self.inner.fill_buf()?;

                if src.is_empty() {
                    return Ok(None);
                }

                match src.iter().position(|&b| !predicate(b)) {
                    Some(i) => (i, Some(src[i])),
                    None => (src.len(), None),
                }
            };

            self.inner.consume(skip);

            if next.is_some() {
                return Ok(next);
            }
        }
    }

    fn read_token(&mut self) -> io::Result<()> {
        self.buf.clear();

        loop {
            let (consumed, done) = {
                let src = self.inner.fill_buf()?;

                if src.is_empty() {
                    return Ok(());
                }

                match src.iter().position(u8::is_ascii_whitespace) {
                    Some(i) => {
                        self.buf.extend_from_slice(&src[..i]);
                        (i, true)
                    }
                    None => {
                        self.buf.extend_from_slice(src);
                        (src.len(), false)
                    }
                }
            };

            self.inner.consume(consumed);

            if done {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<R: io::BufRead>(tokens: &mut Tokens<R>) -> Vec<String> {
        let mut v = Vec::new();
        while let Some(token) = tokens.next_token().unwrap() {
            v.push(String::from_utf8_lossy(token).into_owned());
        }
        v
    }

    #[test]
    fn test_next_token() {
        let mut tokens = Tokens::new(&b"  3\n0.1 0.2\t0.3\r\n01?\n\n"[..]);

        assert_eq!(collect(&mut tokens), ["3", "0.1", "0.2", "0.3", "01?"]);
        assert_eq!(tokens.next_token().unwrap(), None);
    }

    #[test]
    fn test_empty() {
        assert_eq!(Tokens::new(&b""[..]).next_token().unwrap(), None);
        assert_eq!(Tokens::new(&b" \n \n"[..]).next_token().unwrap(), None);
    }

    #[test]
    fn test_token_across_buffer_boundary() {
        let reader = io::BufReader::with_capacity(2, &b"0110 10101"[..]);
        let mut tokens = Tokens::new(reader);

        assert_eq!(collect(&mut tokens), ["0110", "10101"]);
    }

    #[test]
    fn test_next_token_on_line() {
        let mut tokens = Tokens::new(&b"ms 6 1 -I 2 3 3\n1 2 3\n"[..]);

        let mut line = Vec::new();
        while let Some(token) = tokens.next_token_on_line().unwrap() {
            line.push(token.to_vec());
        }
        assert_eq!(line.len(), 7);
        assert_eq!(tokens.next_token().unwrap(), Some(&b"1"[..]));
    }

    #[test]
    fn test_unread() {
        let mut tokens = Tokens::new(&b"a b"[..]);

        assert_eq!(tokens.next_token().unwrap(), Some(&b"a"[..]));
        tokens.unread();
        assert_eq!(tokens.next_token().unwrap(), Some(&b"a"[..]));
        assert_eq!(tokens.next_token().unwrap(), Some(&b"b"[..]));
    }
}

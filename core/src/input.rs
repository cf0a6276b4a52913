//! Input for reading records.

use std::{
    env,
    fs::File,
    io::{self, IsTerminal as _},
    path::PathBuf,
};

use flate2::bufread::MultiGzDecoder;

pub mod tokens;
pub use tokens::Tokens;

/// A boxed, buffered reader.
pub type DynBufRead = Box<dyn io::BufRead>;

/// An input source for reading.
#[derive(Debug)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, reading an `Input` checks that either a path is provided, or that input is
    /// available via stdin, instead of hanging.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "FST_ALLOW_STDIN";

    /// Creates a new input source.
    pub fn new(input: Option<PathBuf>) -> io::Result<Self> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        if input.is_some() && !io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received input both via file and stdin",
            ))
        } else if input.is_none() && io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received no input via file or stdin",
            ))
        } else {
            Ok(Self::new_unchecked(input))
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        if let Some(path) = input {
            Self::Path(path)
        } else {
            Self::Stdin
        }
    }

    /// Open the input for reading.
    pub fn open(&self) -> io::Result<DynBufRead> {
        match self {
            Input::Path(path) => File::open(path)
                .map(io::BufReader::new)
                .map(|reader| Box::new(reader) as DynBufRead),
            Input::Stdin => Ok(Box::new(io::stdin().lock())),
        }
    }
}

/// Wraps the reader in a decompressor if its content is compressed.
pub fn decompress<R>(mut reader: R) -> io::Result<DynBufRead>
where
    R: 'static + io::BufRead,
{
    Ok(match CompressionMethod::detect(&mut reader)? {
        Some(CompressionMethod::Gzip) => {
            log::debug!("Detected gzip-compressed input");
            Box::new(io::BufReader::new(MultiGzDecoder::new(reader)))
        }
        None => Box::new(reader),
    })
}

/// A compression method.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Gzip, including BGZF.
    Gzip,
}

impl CompressionMethod {
    /// Detects the compression method from the start of the reader without consuming it.
    pub fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: io::BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read as _, Write as _};

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn test_detect_gzip() -> io::Result<()> {
        assert_eq!(
            CompressionMethod::detect(&mut &[0x1f, 0x8b, 0x08][..])?,
            Some(CompressionMethod::Gzip)
        );
        assert_eq!(CompressionMethod::detect(&mut &b"ms 8 1"[..])?, None);
        assert_eq!(CompressionMethod::detect(&mut &b""[..])?, None);

        Ok(())
    }

    #[test]
    fn test_decompress() -> io::Result<()> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1\n0.5\n0\n1\n")?;
        let compressed = encoder.finish()?;

        let mut decoded = String::new();
        decompress(io::Cursor::new(compressed))?.read_to_string(&mut decoded)?;
        assert_eq!(decoded, "1\n0.5\n0\n1\n");

        Ok(())
    }

    #[test]
    fn test_uncompressed_passthrough() -> io::Result<()> {
        let mut decoded = String::new();
        decompress(&b"0\n"[..])?.read_to_string(&mut decoded)?;
        assert_eq!(decoded, "0\n");

        Ok(())
    }
}

//! Pull-based byte sources.
//!
//! A parse session is driven by repeatedly asking a [`ChunkSource`] for the
//! next available chunk until it signals end of input. End of input is a
//! distinguished condition (`Ok(0)`), distinct from every transport error.

use std::io::{self, Read};

/// Anything that can hand out input one chunk at a time.
pub trait ChunkSource {
    /// Fill `buf` with the next available bytes.
    ///
    /// Returns the number of bytes written; `0` means end of input. An
    /// `Err` is a transport failure and aborts the session that observes it.
    fn next_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Adapter exposing any [`Read`] as a [`ChunkSource`].
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkSource for ReadSource<R> {
    fn next_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_source_reaches_end_of_input() {
        let mut source = ReadSource::new(&b"abc"[..]);
        let mut buf = [0u8; 8];
        assert_eq!(source.next_chunk(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(source.next_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_transport_error_is_distinct_from_eof() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"))
            }
        }
        let mut source = ReadSource::new(Failing);
        let mut buf = [0u8; 8];
        let err = source.next_chunk(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}

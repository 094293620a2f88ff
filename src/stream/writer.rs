//! `io::Write` adapter (std only).

use std::io::Write;

use crate::error::{message, StreamError};

use super::sink::{PulseSink, SinkError};

/// Sink writing the pulse stream to any `io::Write` (a serial port, a file,
/// a pipe).
///
/// The writer gives no queue-depth feedback, so `pending()` is always 0 and
/// pacing is left to the transport.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> WriteSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Borrow the writer.
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PulseSink for WriteSink<W> {
    fn enqueue(&mut self, byte: u8) -> Result<(), SinkError> {
        match self.inner.write_all(&[byte]) {
            Ok(()) => {
                self.written += 1;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(SinkError::Full),
            Err(_) => {
                warn!("write failed after {} bytes, closing sink", self.written);
                Err(SinkError::Closed)
            }
        }
    }

    fn pending(&self) -> usize {
        0
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        self.inner
            .flush()
            .map_err(|e| StreamError::Io(message(&e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_through() {
        let mut sink = WriteSink::new(std::vec::Vec::new());
        sink.enqueue(0x81).unwrap();
        sink.enqueue(0x12).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.written(), 2);
        assert_eq!(sink.into_inner(), [0x81, 0x12]);
    }

    #[test]
    fn test_broken_writer_is_closed() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let mut sink = WriteSink::new(Broken);
        assert_eq!(sink.enqueue(0), Err(SinkError::Closed));
        assert!(matches!(sink.flush(), Err(StreamError::Io(_))));
    }
}

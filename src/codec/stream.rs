//! Sink adapter for stream-based encoding
//!
//! Encoders issue many small writes; [`SinkWriter`] coalesces them in front
//! of a caller-supplied sink and keeps a running count of bytes handed to it.

use std::io::{self, Write};

/// Buffered, byte-counting writer around an output sink
///
/// Data is only guaranteed to reach the sink after [`finish`](Self::finish)
/// or an explicit flush.
pub struct SinkWriter<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    buffer_size: usize,
    written: u64,
}

impl<W: Write> SinkWriter<W> {
    /// Create a new sink writer with custom buffer size
    pub fn with_buffer_size(sink: W, buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            sink,
            buffer: Vec::with_capacity(buffer_size),
            buffer_size,
            written: 0,
        }
    }

    /// Bytes accepted so far, buffered or not
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if self.buffer.len() + data.len() <= self.buffer_size {
            self.buffer.extend_from_slice(data);
            return Ok(());
        }

        self.drain()?;

        // Larger than the whole buffer: bypass it
        if data.len() > self.buffer_size {
            self.sink.write_all(data)?;
        } else {
            self.buffer.extend_from_slice(data);
        }

        Ok(())
    }

    fn drain(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush everything into the sink and return it with the byte count
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.flush()?;
        Ok((self.sink, self.written))
    }
}

impl<W: Write> Write for SinkWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_chunk(data)?;
        self.written += data.len() as u64;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.sink.flush()
    }
}

//! Byte sink over a `fmt::Write`, for streaming JSON without a buffer

use std::fmt;
use std::io;

pub(crate) struct FmtSink<'a> {
    inner: &'a mut dyn fmt::Write,
}

impl<'a> FmtSink<'a> {
    pub fn new(inner: &'a mut dyn fmt::Write) -> Self {
        Self { inner }
    }
}

impl io::Write for FmtSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // serde_json only splits its output on ASCII boundaries
        let text = std::str::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.inner
            .write_str(text)
            .map_err(|_| io::Error::other("sink rejected write"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

use std::fs::File;
use std::io::{self, Cursor, Seek, Write};

/// Destination for an encoded document.
///
/// After a document is written, seekable sinks are rewound to their start so the caller
/// can read it back; sinks that cannot seek are left where writing stopped.
pub trait DocSink: Write {
    /// Rewind to the start if this sink supports seeking; otherwise do nothing.
    ///
    /// # Errors
    /// Propagates the underlying seek error.
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DocSink for Vec<u8> {}

impl DocSink for io::Sink {}

impl DocSink for io::Stdout {}

impl DocSink for Cursor<Vec<u8>> {
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        self.set_position(0);
        Ok(())
    }
}

impl DocSink for Cursor<&mut Vec<u8>> {
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        self.set_position(0);
        Ok(())
    }
}

impl DocSink for File {
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        self.rewind()
    }
}

impl<S: DocSink + ?Sized> DocSink for &mut S {
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        (**self).rewind_if_seekable()
    }
}

impl<S: DocSink + ?Sized> DocSink for Box<S> {
    fn rewind_if_seekable(&mut self) -> io::Result<()> {
        (**self).rewind_if_seekable()
    }
}

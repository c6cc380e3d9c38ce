use std::io::{self, Read};

use crate::error::{JsonError, Result};

/// Outcome of asking a source for more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Bytes were appended to the buffer.
    Data,
    /// The input is exhausted.
    End,
    /// Nothing is available yet, but more may arrive later.
    Pending,
}

/// Where a parser's bytes come from.
pub trait InputSource {
    /// Appends more input to `buf`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying transport.
    fn fill(&mut self, buf: &mut Vec<u8>) -> Result<Fill>;
}

/// Input held entirely in memory.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: Option<&'a [u8]>,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data: Some(data) }
    }
}

impl InputSource for SliceSource<'_> {
    fn fill(&mut self, buf: &mut Vec<u8>) -> Result<Fill> {
        match self.data.take() {
            Some(data) if !data.is_empty() => {
                buf.extend_from_slice(data);
                Ok(Fill::Data)
            }
            _ => Ok(Fill::End),
        }
    }
}

/// Input pulled from a blocking reader in fixed-size chunks.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReadSource<R> {
    /// Bytes requested from the reader per fill.
    pub const DEFAULT_CHUNK_SIZE: usize = 8000;

    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, Self::DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> InputSource for ReadSource<R> {
    fn fill(&mut self, buf: &mut Vec<u8>) -> Result<Fill> {
        let len = buf.len();
        buf.resize(len + self.chunk_size, 0);
        let read = loop {
            match self.reader.read(&mut buf[len..]) {
                Ok(n) => break n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    buf.truncate(len);
                    return Err(err.into());
                }
            }
        };
        buf.truncate(len + read);
        Ok(if read == 0 { Fill::End } else { Fill::Data })
    }
}

/// Input pushed by the caller; the parser returns
/// [`Token::NotAvailable`](crate::Token::NotAvailable) instead of blocking
/// when it runs dry.
#[derive(Debug, Default)]
pub struct FeedSource {
    pending: Vec<u8>,
    ended: bool,
}

impl FeedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn feed(&mut self, data: &[u8]) -> Result<()> {
        if self.ended {
            return Err(JsonError::new(io::Error::new(
                io::ErrorKind::InvalidInput,
                "input fed after end_of_input",
            )));
        }
        self.pending.extend_from_slice(data);
        Ok(())
    }

    pub(crate) fn end(&mut self) {
        self.ended = true;
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.ended
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl InputSource for FeedSource {
    fn fill(&mut self, buf: &mut Vec<u8>) -> Result<Fill> {
        if !self.pending.is_empty() {
            buf.append(&mut self.pending);
            Ok(Fill::Data)
        } else if self.ended {
            Ok(Fill::End)
        } else {
            Ok(Fill::Pending)
        }
    }
}

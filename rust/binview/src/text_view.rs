//! Fixed-capacity text slots.
//!
//! A text view is a window of `capacity` bytes holding encoded text followed by
//! zero padding. Decoding stops at the first zero byte, so padding never shows up
//! in the decoded string.

use binview_bytes::ByteBuffer;
use binview_common::{Result, error::Error, verify_arg};

use crate::config::TextEncoding;

/// A window of `capacity` bytes interpreted as zero-padded text.
#[derive(Debug, Clone)]
pub struct TextView<B> {
    buf: B,
    offset: usize,
    capacity: usize,
    encoding: TextEncoding,
}

impl TextView<ByteBuffer> {
    /// Allocates `capacity` zero bytes.
    pub fn with_capacity(capacity: usize) -> TextView<ByteBuffer> {
        TextView {
            buf: ByteBuffer::zeroed(capacity),
            offset: 0,
            capacity,
            encoding: TextEncoding::default(),
        }
    }

    /// Allocates `capacity` bytes holding `text`, truncated to fit.
    pub fn from_text(text: &str, capacity: usize) -> TextView<ByteBuffer> {
        let mut view = Self::with_capacity(capacity);
        view.set_text(text);
        view
    }
}

impl<B: AsRef<[u8]>> TextView<B> {
    /// Wraps `capacity` bytes of `buf` starting at `offset`.
    pub fn new(buf: B, offset: usize, capacity: usize) -> Result<TextView<B>> {
        let available = buf.as_ref().len();
        if offset.checked_add(capacity).is_none_or(|end| end > available) {
            return Err(Error::out_of_bounds(offset, capacity, available));
        }
        Ok(Self::from_parts(buf, offset, capacity, TextEncoding::default()))
    }

    pub(crate) fn from_parts(
        buf: B,
        offset: usize,
        capacity: usize,
        encoding: TextEncoding,
    ) -> TextView<B> {
        TextView {
            buf,
            offset,
            capacity,
            encoding,
        }
    }

    /// Returns the view with a different text encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> TextView<B> {
        self.encoding = encoding;
        self
    }

    /// Byte capacity of the slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// The whole backing buffer, not just this view's window.
    pub fn buffer(&self) -> &[u8] {
        self.buf.as_ref()
    }

    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    pub fn byte_len(&self) -> usize {
        self.capacity
    }

    /// The bytes of this view's window, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[self.offset..self.offset + self.capacity]
    }

    /// Returns the byte at `index` within the window.
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Number of bytes before the first zero byte.
    pub fn text_len(&self) -> usize {
        text_end(self.as_bytes())
    }

    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TextView<B> {
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let range = self.offset..self.offset + self.capacity;
        &mut self.buf.as_mut()[range]
    }

    /// Writes a single byte within the window.
    pub fn set_byte(&mut self, index: usize, byte: u8) -> Result<()> {
        verify_arg!(index, index < self.capacity);
        self.as_bytes_mut()[index] = byte;
        Ok(())
    }

    /// Stores `text`, truncating it to the capacity and zero-padding the remainder.
    /// Returns the number of bytes written before padding.
    pub fn set_text(&mut self, text: &str) -> usize {
        let encoding = self.encoding;
        encode_into(text, self.as_bytes_mut(), encoding)
    }

    /// Zeroes the whole window.
    pub fn clear(&mut self) {
        self.as_bytes_mut().fill(0);
    }
}

impl<B: AsRef<[u8]>> std::fmt::Display for TextView<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&decode(self.as_bytes(), self.encoding))
    }
}

impl<B: AsRef<[u8]>, C: AsRef<[u8]>> PartialEq<TextView<C>> for TextView<B> {
    fn eq(&self, other: &TextView<C>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Encodes `text` into `dst`, zero-padding whatever is left.
///
/// UTF-8 text is cut at the last whole code point that fits. Returns the number
/// of text bytes written.
pub(crate) fn encode_into(text: &str, dst: &mut [u8], encoding: TextEncoding) -> usize {
    dst.fill(0);
    match encoding {
        TextEncoding::Utf8 => {
            let mut end = text.len().min(dst.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            dst[..end].copy_from_slice(&text.as_bytes()[..end]);
            end
        }
        TextEncoding::Latin1 => {
            let mut written = 0;
            for (slot, ch) in dst.iter_mut().zip(text.chars()) {
                *slot = u8::try_from(u32::from(ch)).unwrap_or(b'?');
                written += 1;
            }
            written
        }
    }
}

/// Decodes the bytes before the first zero byte.
pub(crate) fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    let bytes = &bytes[..text_end(bytes)];
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn text_end(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

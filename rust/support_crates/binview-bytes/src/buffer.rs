use crate::align::{align_up, is_aligned};

/// A fixed-size, zero-initialized byte buffer whose first byte is aligned to a
/// requested boundary.
///
/// This is the backing store that binview allocates when a view is created from
/// plain values rather than laid over caller-provided memory. The length is set at
/// construction and never changes: views compute their layouts once and rely on the
/// region staying put.
///
/// Alignment is achieved by over-allocating the inner vector by `alignment` bytes
/// and starting the visible region at the first aligned address.
pub struct ByteBuffer {
    /// The underlying byte vector, may include padding at start
    inner: Vec<u8>,
    /// Offset from start of inner vec to the aligned region
    start: u32,
    /// Length of the visible region in bytes
    len: usize,
    /// Required alignment, specified during buffer creation.
    alignment: u32,
}

impl ByteBuffer {
    /// Default alignment for freshly allocated buffers.
    pub const ALIGNMENT: usize = 64;

    /// Creates a buffer of `len` zero bytes with the default alignment.
    pub fn zeroed(len: usize) -> ByteBuffer {
        Self::zeroed_with_alignment(len, Self::ALIGNMENT)
    }

    /// Creates a buffer of `len` zero bytes aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two.
    pub fn zeroed_with_alignment(len: usize, alignment: usize) -> ByteBuffer {
        let alignment = alignment.max(1);
        assert!(alignment.is_power_of_two());

        if len == 0 {
            return ByteBuffer {
                inner: Vec::new(),
                start: 0,
                len: 0,
                alignment: alignment as u32,
            };
        }

        let inner = vec![0u8; len.checked_add(alignment).expect("add")];
        let p = inner.as_ptr() as usize;
        let start = align_up(p, alignment) - p;
        ByteBuffer {
            inner,
            start: start as u32,
            len,
            alignment: alignment as u32,
        }
    }

    /// Creates a buffer containing a copy of the provided slice.
    pub fn copy_from_slice(data: &[u8]) -> ByteBuffer {
        let mut buf = ByteBuffer::zeroed(data.len());
        buf.as_mut_slice().copy_from_slice(data);
        buf
    }

    /// Returns the number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the alignment this buffer was created with.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment as usize
    }

    /// Returns a raw pointer to the first byte of the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// Returns a slice containing the entire buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        let start = self.start_offset();
        &self.inner[start..start + self.len]
    }

    /// Returns a mutable slice containing the entire buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let start = self.start_offset();
        &mut self.inner[start..start + self.len]
    }

    /// Overwrites every byte of the buffer with zero.
    pub fn clear(&mut self) {
        self.as_mut_slice().fill(0);
    }

    /// Checks whether the byte at `offset` is aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is greater than the buffer's length.
    pub fn is_aligned_at(&self, offset: usize, alignment: usize) -> bool {
        assert!(offset <= self.len());
        is_aligned(self.as_ptr() as usize + offset, alignment)
    }

    /// Consumes the buffer, returning its bytes as a plain vector.
    pub fn into_vec(self) -> Vec<u8> {
        let start = self.start_offset();
        let mut inner = self.inner;
        inner.truncate(start + self.len);
        inner.drain(..start);
        inner
    }

    #[inline]
    fn start_offset(&self) -> usize {
        self.start as usize
    }
}

impl std::ops::Deref for ByteBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for ByteBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl AsRef<[u8]> for ByteBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for ByteBuffer {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl Clone for ByteBuffer {
    fn clone(&self) -> ByteBuffer {
        let mut buf = ByteBuffer::zeroed_with_alignment(self.len, self.alignment());
        buf.as_mut_slice().copy_from_slice(self.as_slice());
        buf
    }
}

impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteBuffer {}

impl std::fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("values", &self.as_slice())
            .field("len", &self.len())
            .field("alignment", &self.alignment)
            .field("internal_offset", &self.start)
            .finish_non_exhaustive()
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::zeroed(0)
    }
}

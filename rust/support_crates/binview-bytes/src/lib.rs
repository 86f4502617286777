//! Byte storage for binview: a zero-filled, aligned, fixed-size buffer that views
//! are laid over, and the endian-aware codec for reading and writing primitive
//! values at byte positions within any slice.

pub mod align;
pub mod buffer;
pub mod codec;

pub use buffer::ByteBuffer;
pub use codec::Endian;

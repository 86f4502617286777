//! Endian-aware reads and writes of primitive values at byte positions.
//!
//! Every function takes a byte slice and an absolute position within it. Callers
//! validate that `position + width` fits into the slice before calling; an
//! out-of-range position panics like slice indexing does.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// Maps a `littleEndian` schema flag to a byte order.
    #[inline]
    pub fn from_little(little: bool) -> Endian {
        if little { Endian::Little } else { Endian::Big }
    }

    #[inline]
    pub fn is_little(self) -> bool {
        self == Endian::Little
    }
}

#[inline]
pub fn read_u8(buf: &[u8], position: usize) -> u8 {
    buf[position]
}

#[inline]
pub fn read_i8(buf: &[u8], position: usize) -> i8 {
    buf[position] as i8
}

#[inline]
pub fn write_u8(buf: &mut [u8], position: usize, value: u8) {
    buf[position] = value;
}

#[inline]
pub fn write_i8(buf: &mut [u8], position: usize, value: i8) {
    buf[position] = value as u8;
}

macro_rules! endian_codec {
    ($($read:ident, $write:ident, $ty:ty, $width:expr);* $(;)?) => {
        $(
            #[inline]
            pub fn $read(buf: &[u8], position: usize, endian: Endian) -> $ty {
                let bytes = &buf[position..position + $width];
                match endian {
                    Endian::Big => BigEndian::$read(bytes),
                    Endian::Little => LittleEndian::$read(bytes),
                }
            }

            #[inline]
            pub fn $write(buf: &mut [u8], position: usize, value: $ty, endian: Endian) {
                let bytes = &mut buf[position..position + $width];
                match endian {
                    Endian::Big => BigEndian::$write(bytes, value),
                    Endian::Little => LittleEndian::$write(bytes, value),
                }
            }
        )*
    };
}

endian_codec! {
    read_u16, write_u16, u16, 2;
    read_i16, write_i16, i16, 2;
    read_u32, write_u32, u32, 4;
    read_i32, write_i32, i32, 4;
    read_u64, write_u64, u64, 8;
    read_i64, write_i64, i64, 8;
    read_f32, write_f32, f32, 4;
    read_f64, write_f64, f64, 8;
}

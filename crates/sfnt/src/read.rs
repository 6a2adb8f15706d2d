//! Big-endian reads against a seekable byte source.

use super::Error;
use std::io::{Read, Seek, SeekFrom};

/// Types that can be read from a fixed number of big-endian bytes.
pub(crate) trait ReadBe: Sized {
    const NUM_BYTES: usize;
    fn from_be(b: &[u8]) -> Self;
}

impl ReadBe for u8 {
    const NUM_BYTES: usize = 1;
    #[inline]
    fn from_be(b: &[u8]) -> Self {
        b[0]
    }
}

impl ReadBe for u16 {
    const NUM_BYTES: usize = 2;
    #[inline]
    fn from_be(b: &[u8]) -> Self {
        u16::from_be_bytes([b[0], b[1]])
    }
}

impl ReadBe for i16 {
    const NUM_BYTES: usize = 2;
    #[inline]
    fn from_be(b: &[u8]) -> Self {
        i16::from_be_bytes([b[0], b[1]])
    }
}

impl ReadBe for u32 {
    const NUM_BYTES: usize = 4;
    #[inline]
    fn from_be(b: &[u8]) -> Self {
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }
}

impl ReadBe for [u8; 4] {
    const NUM_BYTES: usize = 4;
    #[inline]
    fn from_be(b: &[u8]) -> Self {
        [b[0], b[1], b[2], b[3]]
    }
}

/// Cursor over a byte source.
///
/// All offsets passed to [Reader::seek] are relative to the position the source
///     was at when the reader was created, which is where the font data starts.
pub(crate) struct Reader<R> {
    inner: R,
    base: u64,
}

impl<R: Read + Seek> Reader<R> {
    pub(crate) fn new(mut inner: R) -> Result<Self, Error> {
        let base = inner.stream_position()?;
        Ok(Self { inner, base })
    }

    pub(crate) fn base(&self) -> u64 {
        self.base
    }

    pub(crate) fn seek(&mut self, offset: u64) -> Result<(), Error> {
        self.inner.seek(SeekFrom::Start(self.base + offset))?;
        Ok(())
    }

    pub(crate) fn skip(&mut self, n: i64) -> Result<(), Error> {
        self.inner.seek(SeekFrom::Current(n))?;
        Ok(())
    }

    pub(crate) fn read<T: ReadBe>(&mut self) -> Result<T, Error> {
        let mut b = [0_u8; 4];
        let b = &mut b[..T::NUM_BYTES];
        self.inner.read_exact(b)?;
        Ok(T::from_be(b))
    }

    /// Reads an unsigned integer of 1 to 4 bytes, as used for CFF INDEX offsets.
    pub(crate) fn read_sized(&mut self, num_bytes: u8) -> Result<u32, Error> {
        let mut v = 0_u32;
        for _ in 0..num_bytes {
            v = (v << 8) | self.read::<u8>()? as u32;
        }
        Ok(v)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        let mut v = vec![0_u8; len];
        self.inner.read_exact(&mut v)?;
        Ok(v)
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_are_big_endian() {
        let mut r = Reader::new(Cursor::new(vec![0x01, 0x02, 0xFF, 0xFE, 0, 0, 1, 0])).unwrap();
        assert_eq!(r.read::<u16>().unwrap(), 0x0102);
        assert_eq!(r.read::<i16>().unwrap(), -2);
        assert_eq!(r.read::<u32>().unwrap(), 256);
    }

    #[test]
    fn offsets_are_relative_to_the_starting_position() {
        let mut source = Cursor::new(vec![9, 9, 9, 0xAB, 0xCD]);
        source.set_position(3);
        let mut r = Reader::new(source).unwrap();
        r.seek(1).unwrap();
        assert_eq!(r.read::<u8>().unwrap(), 0xCD);
        r.seek(0).unwrap();
        assert_eq!(r.read_sized(2).unwrap(), 0xABCD);
    }

    #[test]
    fn short_read_is_truncation() {
        let mut r = Reader::new(Cursor::new(vec![1])).unwrap();
        assert!(matches!(r.read::<u16>(), Err(Error::Truncated)));
    }
}

//! Utility types for binary serialization.
//!
//! Provides CompactSize (VarInt) encoding/decoding, fixed-width unsigned
//! integer codecs, bit-string packing, the Bitcoin signed-message digest,
//! and `BsvReader`/`BsvWriter` cursors for Bitcoin protocol binary data.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A Bitcoin protocol variable-length integer (CompactSize).
///
/// Values below `0xfd` take one byte; larger values take a one-byte marker
/// (`0xfd`, `0xfe`, `0xff`) followed by a 2, 4 or 8 byte little-endian body.
///
/// See <http://learnmeabitcoin.com/glossary/varint>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Decode a VarInt from the front of a byte slice.
    ///
    /// Returns the decoded value and the number of bytes consumed. Trailing
    /// bytes after the encoding are ignored.
    ///
    /// # Arguments
    /// * `data` - Byte slice starting with a VarInt encoding.
    ///
    /// # Returns
    /// A tuple of `(VarInt, bytes_consumed)`, or `InvalidVarInt` if the slice
    /// is empty or shorter than its marker byte announces.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let (&marker, rest) = data
            .split_first()
            .ok_or_else(|| PrimitivesError::InvalidVarInt("empty input".to_string()))?;
        let body_len = match marker {
            0xff => 8,
            0xfe => 4,
            0xfd => 2,
            b => return Ok((VarInt(b as u64), 1)),
        };
        if rest.len() < body_len {
            return Err(PrimitivesError::InvalidVarInt(format!(
                "marker 0x{:02x} needs {} bytes, got {}",
                marker,
                body_len,
                rest.len()
            )));
        }
        let val = decode_uint(&rest[..body_len], ByteOrder::Little)?;
        Ok((VarInt(val), 1 + body_len))
    }

    /// Return the wire-format byte length of this VarInt.
    ///
    /// # Returns
    /// 1, 3, 5, or 9 depending on the value.
    pub fn length(&self) -> usize {
        if self.0 < 0xfd {
            1
        } else if self.0 <= 0xffff {
            3
        } else if self.0 <= 0xffff_ffff {
            5
        } else {
            9
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.length()];
        self.put_bytes(&mut buf);
        buf
    }

    /// Write the VarInt into a destination buffer.
    ///
    /// The buffer must be at least `self.length()` bytes long.
    ///
    /// # Returns
    /// The number of bytes written.
    pub fn put_bytes(&self, dst: &mut [u8]) -> usize {
        let v = self.0;
        if v < 0xfd {
            dst[0] = v as u8;
            1
        } else if v <= 0xffff {
            dst[0] = 0xfd;
            dst[1..3].copy_from_slice(&(v as u16).to_le_bytes());
            3
        } else if v <= 0xffff_ffff {
            dst[0] = 0xfe;
            dst[1..5].copy_from_slice(&(v as u32).to_le_bytes());
            5
        } else {
            dst[0] = 0xff;
            dst[1..9].copy_from_slice(&v.to_le_bytes());
            9
        }
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

/// Checked conversion for values coming from signed or wider arithmetic.
///
/// Negative values and values above `u64::MAX` fail with `OutOfRange`.
impl TryFrom<i128> for VarInt {
    type Error = PrimitivesError;

    fn try_from(v: i128) -> Result<Self, Self::Error> {
        u64::try_from(v)
            .map(VarInt)
            .map_err(|_| PrimitivesError::OutOfRange(format!("{} does not fit a varint", v)))
    }
}

/// Encode an unsigned integer as a CompactSize varint.
///
/// `encode_varint(0xfd)` yields `fd fd 00`; `encode_varint(0x12345678)`
/// yields `fe 78 56 34 12`.
pub fn encode_varint(n: u64) -> Vec<u8> {
    VarInt(n).to_bytes()
}

/// Decode a CompactSize varint, returning the value and bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize), PrimitivesError> {
    let (vi, consumed) = VarInt::from_bytes(data)?;
    Ok((vi.0, consumed))
}

// ---------------------------------------------------------------------------
// Fixed-width unsigned integers
// ---------------------------------------------------------------------------

/// Byte order of a fixed-width integer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Encode `n` into exactly `width` bytes.
///
/// # Arguments
/// * `n` - The value to encode.
/// * `width` - Output width in bytes, 1 through 8.
/// * `order` - Byte order of the output.
///
/// # Returns
/// The encoded bytes, or `OutOfRange` if `width` is unsupported or `n`
/// needs more than `width` bytes.
pub fn encode_uint(n: u64, width: usize, order: ByteOrder) -> Result<Vec<u8>, PrimitivesError> {
    if width == 0 || width > 8 {
        return Err(PrimitivesError::OutOfRange(format!(
            "unsupported integer width {}",
            width
        )));
    }
    if width < 8 && n >> (width * 8) != 0 {
        return Err(PrimitivesError::OutOfRange(format!(
            "{} does not fit in {} bytes",
            n, width
        )));
    }
    let be = n.to_be_bytes();
    let mut out = be[8 - width..].to_vec();
    if order == ByteOrder::Little {
        out.reverse();
    }
    Ok(out)
}

/// Decode an unsigned integer from 1 through 8 bytes.
pub fn decode_uint(bytes: &[u8], order: ByteOrder) -> Result<u64, PrimitivesError> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(PrimitivesError::OutOfRange(format!(
            "unsupported integer width {}",
            bytes.len()
        )));
    }
    let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;
    Ok(match order {
        ByteOrder::Big => bytes.iter().fold(0, fold),
        ByteOrder::Little => bytes.iter().rev().fold(0, fold),
    })
}

/// Encode `n` in the fewest bytes that hold it (at least one).
///
/// `unsigned_to_bytes(256, ByteOrder::Big)` is `01 00`, and
/// `unsigned_to_bytes(0, _)` is a single `00`.
pub fn unsigned_to_bytes(n: u64, order: ByteOrder) -> Vec<u8> {
    let width = (((64 - n.leading_zeros()) as usize + 7) / 8).max(1);
    let be = n.to_be_bytes();
    let mut out = be[8 - width..].to_vec();
    if order == ByteOrder::Little {
        out.reverse();
    }
    out
}

// ---------------------------------------------------------------------------
// Bit strings
// ---------------------------------------------------------------------------

/// Render bytes as a string of `'0'`/`'1'`, most significant bit first.
///
/// The output length is always `8 * bytes.len()`.
pub fn bytes_to_bits(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:08b}", b)).collect()
}

/// Pack a string of `'0'`/`'1'` into bytes, most significant bit first.
///
/// A bit string whose length is not a multiple of 8 is padded with leading
/// zero bits, so the output is `ceil(bits.len() / 8)` bytes. This is lossy:
/// `bytes_to_bits(&bits_to_bytes("101")?)` is `"00000101"`, not `"101"`.
/// Only bit strings whose length is a multiple of 8 round-trip exactly.
pub fn bits_to_bytes(bits: &str) -> Result<Vec<u8>, PrimitivesError> {
    if let Some(c) = bits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(PrimitivesError::InvalidBits(format!(
            "unexpected character {:?}",
            c
        )));
    }
    let pad = (8 - bits.len() % 8) % 8;
    let padded: Vec<u8> = std::iter::repeat(b'0')
        .take(pad)
        .chain(bits.bytes())
        .collect();
    Ok(padded
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0')))
        .collect())
}

// ---------------------------------------------------------------------------
// Signed message digest
// ---------------------------------------------------------------------------

/// Magic prefix of the Bitcoin signed-message format.
const SIGNED_MESSAGE_MAGIC: &[u8] = b"Bitcoin Signed Message:\n";

/// Build the Bitcoin signed-message preimage for `message`.
///
/// Layout: `varint(len(magic)) || magic || varint(len(message)) || message`.
/// Hash the result with `sha256d` before signing.
pub fn text_digest(message: &str) -> Vec<u8> {
    let mut writer = BsvWriter::with_capacity(
        1 + SIGNED_MESSAGE_MAGIC.len() + 9 + message.len(),
    );
    writer.write_varint(VarInt::from(SIGNED_MESSAGE_MAGIC.len()));
    writer.write_bytes(SIGNED_MESSAGE_MAGIC);
    writer.write_varint(VarInt::from(message.len()));
    writer.write_bytes(message.as_bytes());
    writer.into_bytes()
}

// ---------------------------------------------------------------------------
// BsvReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for Bitcoin protocol binary data.
///
/// Wraps a byte slice and maintains a read position, providing methods
/// to read fixed-size integers and VarInt values in little-endian order.
pub struct BsvReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BsvReader<'a> {
    /// Create a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        BsvReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEof` if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a big-endian u32.
    pub fn read_u32_be(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a VarInt and advance the position accordingly.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        match self.read_u8()? {
            0xff => Ok(VarInt(self.read_u64_le()?)),
            0xfe => Ok(VarInt(self.read_u32_le()? as u64)),
            0xfd => Ok(VarInt(self.read_u16_le()? as u64)),
            b => Ok(VarInt(b as u64)),
        }
    }

    /// Consume and return everything that has not been read yet.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// BsvWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer for Bitcoin protocol binary data.
///
/// Wraps a `Vec<u8>` and provides methods to append fixed-size integers
/// and VarInt values in little-endian order.
pub struct BsvWriter {
    buf: Vec<u8>,
}

impl BsvWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        BsvWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        BsvWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte to the buffer.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u16.
    pub fn write_u16_le(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a big-endian u32.
    pub fn write_u32_be(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a VarInt to the buffer.
    pub fn write_varint(&mut self, varint: VarInt) {
        let start = self.buf.len();
        self.buf.resize(start + varint.length(), 0);
        varint.put_bytes(&mut self.buf[start..]);
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for BsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint_vectors() {
        let cases: Vec<(u64, &str)> = vec![
            (0, "00"),
            (0xfc, "fc"),
            (0xfd, "fdfd00"),
            (0xabcd, "fdcdab"),
            (0x010000, "fe00000100"),
            (0x12345678, "fe78563412"),
            (0x0100000000, "ff0000000001000000"),
            (0x1234567890abcdef, "ffefcdab9078563412"),
        ];
        for (value, expected) in cases {
            assert_eq!(hex::encode(encode_varint(value)), expected, "value {:#x}", value);
            let (decoded, consumed) = decode_varint(&hex::decode(expected).unwrap()).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, expected.len() / 2);
        }
    }

    #[test]
    fn test_varint_try_from_out_of_range() {
        assert!(matches!(
            VarInt::try_from(-1i128),
            Err(PrimitivesError::OutOfRange(_))
        ));
        assert!(matches!(
            VarInt::try_from(0x0100_0000_0000_0000_00i128),
            Err(PrimitivesError::OutOfRange(_))
        ));
        assert_eq!(VarInt::try_from(u64::MAX as i128).unwrap(), VarInt(u64::MAX));
    }

    #[test]
    fn test_decode_varint_truncated() {
        assert!(matches!(
            decode_varint(&[]),
            Err(PrimitivesError::InvalidVarInt(_))
        ));
        assert!(decode_varint(&[0xfd, 0x01]).is_err());
        assert!(decode_varint(&[0xfe, 0x01, 0x02, 0x03]).is_err());
        assert!(decode_varint(&[0xff, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_varint_ignores_trailing_bytes() {
        let (value, consumed) = decode_varint(&[0xfd, 0x00, 0x01, 0xaa, 0xbb]).unwrap();
        assert_eq!(value, 256);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_varint_byte_length() {
        assert_eq!(VarInt(0).length(), 1);
        assert_eq!(VarInt(252).length(), 1);
        assert_eq!(VarInt(253).length(), 3);
        assert_eq!(VarInt(65535).length(), 3);
        assert_eq!(VarInt(65536).length(), 5);
        assert_eq!(VarInt(4294967295).length(), 5);
        assert_eq!(VarInt(4294967296).length(), 9);
        assert_eq!(VarInt(u64::MAX).to_bytes().len(), 9);
    }

    #[test]
    fn test_encode_uint() {
        assert_eq!(encode_uint(255, 1, ByteOrder::Big).unwrap(), vec![0xff]);
        assert_eq!(encode_uint(256, 2, ByteOrder::Big).unwrap(), vec![0x01, 0x00]);
        assert_eq!(encode_uint(256, 2, ByteOrder::Little).unwrap(), vec![0x00, 0x01]);
        assert_eq!(
            encode_uint(0x42421033, 4, ByteOrder::Big).unwrap(),
            vec![0x42, 0x42, 0x10, 0x33]
        );
        assert_eq!(encode_uint(u64::MAX, 8, ByteOrder::Little).unwrap(), vec![0xff; 8]);
    }

    #[test]
    fn test_encode_uint_out_of_range() {
        assert!(matches!(
            encode_uint(256, 1, ByteOrder::Big),
            Err(PrimitivesError::OutOfRange(_))
        ));
        assert!(encode_uint(0x1_0000_0000, 4, ByteOrder::Little).is_err());
        assert!(encode_uint(1, 0, ByteOrder::Big).is_err());
        assert!(encode_uint(1, 9, ByteOrder::Big).is_err());
    }

    #[test]
    fn test_decode_uint() {
        assert_eq!(decode_uint(&[0x01, 0x00], ByteOrder::Big).unwrap(), 256);
        assert_eq!(decode_uint(&[0x00, 0x01], ByteOrder::Little).unwrap(), 256);
        assert_eq!(decode_uint(&[0x78, 0x56, 0x34, 0x12], ByteOrder::Little).unwrap(), 0x12345678);
        assert!(decode_uint(&[], ByteOrder::Big).is_err());
        assert!(decode_uint(&[0u8; 9], ByteOrder::Big).is_err());
    }

    #[test]
    fn test_unsigned_to_bytes() {
        assert_eq!(unsigned_to_bytes(0, ByteOrder::Big), vec![0x00]);
        assert_eq!(unsigned_to_bytes(255, ByteOrder::Big), vec![0xff]);
        assert_eq!(unsigned_to_bytes(256, ByteOrder::Big), vec![0x01, 0x00]);
        assert_eq!(unsigned_to_bytes(256, ByteOrder::Little), vec![0x00, 0x01]);
        assert_eq!(unsigned_to_bytes(u64::MAX, ByteOrder::Big), vec![0xff; 8]);
    }

    #[test]
    fn test_bytes_to_bits() {
        assert_eq!(bytes_to_bits(&[0x00]), "00000000");
        assert_eq!(bytes_to_bits(&[0x12]), "00010010");
        assert_eq!(bytes_to_bits(&[0xf1]), "11110001");
        assert_eq!(bytes_to_bits(&[0x00, 0x01]), "0000000000000001");
        assert_eq!(bytes_to_bits(&[]), "");
    }

    #[test]
    fn test_bits_to_bytes() {
        assert_eq!(bits_to_bytes("101").unwrap(), vec![0x05]);
        assert_eq!(bits_to_bytes("100010101010111").unwrap(), vec![0x45, 0x57]);
        assert_eq!(bits_to_bytes("000000000000001").unwrap(), vec![0x00, 0x01]);
        assert_eq!(bits_to_bytes("0000000000000001").unwrap(), vec![0x00, 0x01]);
        assert_eq!(bits_to_bytes("").unwrap(), Vec::<u8>::new());
        assert!(matches!(
            bits_to_bytes("10201"),
            Err(PrimitivesError::InvalidBits(_))
        ));
    }

    // Padding to a byte boundary is one-way.
    #[test]
    fn test_bits_round_trip_is_lossy_for_short_strings() {
        let packed = bits_to_bytes("101").unwrap();
        assert_eq!(bytes_to_bits(&packed), "00000101");

        let packed = bits_to_bytes("1000101010101110").unwrap();
        assert_eq!(bytes_to_bits(&packed), "1000101010101110");
    }

    #[test]
    fn test_text_digest() {
        assert_eq!(
            hex::encode(text_digest("hello world")),
            "18426974636f696e205369676e6564204d6573736167653a0a0b68656c6c6f20776f726c64"
        );
    }

    #[test]
    fn test_bsv_reader_writer_roundtrip() {
        let mut writer = BsvWriter::new();
        writer.write_u8(0x42);
        writer.write_u16_le(0x1234);
        writer.write_u32_le(0xDEADBEEF);
        writer.write_u32_be(0x42421033);
        writer.write_u64_le(0x0102030405060708);
        writer.write_varint(VarInt(300));
        writer.write_bytes(b"hello");

        let data = writer.into_bytes();
        let mut reader = BsvReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u32_be().unwrap(), 0x42421033);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_varint().unwrap(), VarInt(300));
        assert_eq!(reader.read_remaining(), b"hello");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_bsv_reader_eof() {
        let mut reader = BsvReader::new(&[0x01]);
        assert!(reader.read_u8().is_ok());
        assert!(matches!(reader.read_u8(), Err(PrimitivesError::UnexpectedEof)));
        assert!(matches!(
            BsvReader::new(&[0xfd, 0x01]).read_varint(),
            Err(PrimitivesError::UnexpectedEof)
        ));
    }
}

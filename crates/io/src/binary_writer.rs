use bytes::{BufMut, BytesMut};

/// Append-only little-endian writer backed by a growable [`BytesMut`].
///
/// # Examples
///
/// ```rust
/// use wgapi_io::BinaryWriter;
///
/// let mut writer = BinaryWriter::new();
/// writer.write_u32(42);
/// writer.write_var_string("wot");
///
/// assert_eq!(writer.to_bytes(), vec![42, 0, 0, 0, 3, b'w', b'o', b't']);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    inner: BytesMut,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.inner.put_u8(value as u8);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.inner.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.inner.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.inner.put_u32_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.inner.put_i32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.inner.put_u64_le(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.inner.put_i64_le(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.inner.put_f64_le(value);
    }

    pub fn write_bytes(&mut self, buffer: &[u8]) {
        self.inner.put_slice(buffer);
    }

    /// Writes a variable-length unsigned integer.
    ///
    /// Values below `0xFD` take one byte; larger values are prefixed with
    /// `0xFD`, `0xFE` or `0xFF` followed by a 2, 4 or 8 byte payload.
    pub fn write_var_int(&mut self, value: u64) {
        if value < 0xFD {
            self.inner.put_u8(value as u8);
        } else if value <= 0xFFFF {
            self.inner.put_u8(0xFD);
            self.inner.put_u16_le(value as u16);
        } else if value <= 0xFFFF_FFFF {
            self.inner.put_u8(0xFE);
            self.inner.put_u32_le(value as u32);
        } else {
            self.inner.put_u8(0xFF);
            self.inner.put_u64_le(value);
        }
    }

    pub fn write_var_bytes(&mut self, value: &[u8]) {
        self.write_var_int(value.len() as u64);
        self.inner.put_slice(value);
    }

    pub fn write_var_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_writer() {
        let mut writer = BinaryWriter::new();

        writer.write_bool(true);
        writer.write_u8(42);
        writer.write_u16(0xBEEF);
        writer.write_u32(1_000_000);
        writer.write_i64(-1_000_000_000_000);
        writer.write_var_string("Hello, Tanks!");

        let mut expected = Vec::new();
        expected.extend_from_slice(&[1]);
        expected.extend_from_slice(&[42]);
        expected.extend_from_slice(&0xBEEFu16.to_le_bytes());
        expected.extend_from_slice(&1_000_000u32.to_le_bytes());
        expected.extend_from_slice(&(-1_000_000_000_000i64).to_le_bytes());
        expected.extend_from_slice(&[13]);
        expected.extend_from_slice(b"Hello, Tanks!");

        assert_eq!(writer.to_bytes(), expected);
        assert_eq!(writer.len(), expected.len());
    }

    #[test]
    fn test_var_int_boundaries() {
        let cases: [(u64, &[u8]); 5] = [
            (0xFC, &[0xFC]),
            (0xFD, &[0xFD, 0xFD, 0x00]),
            (0xFFFF, &[0xFD, 0xFF, 0xFF]),
            (0x1_0000, &[0xFE, 0x00, 0x00, 0x01, 0x00]),
            (
                0x1_0000_0000,
                &[0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00],
            ),
        ];

        for (value, encoded) in cases {
            let mut writer = BinaryWriter::new();
            writer.write_var_int(value);
            assert_eq!(writer.to_bytes(), encoded, "value {value:#x}");
        }
    }
}

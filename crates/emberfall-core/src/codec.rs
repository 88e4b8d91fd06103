//! Versioned binary codec for save games
//!
//! Every persisted object writes a `u32` version tag first and then its fields
//! in a fixed order. Readers accept any version between the type's minimum and
//! current version and gate newer fields on the version they read. All
//! integers and floats are little-endian; strings are a `u32` byte length
//! followed by UTF-8.

/// Errors raised while decoding persisted data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Unexpected end of data: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("Invalid {type_name} version {found} (supported {min}..={max})")]
    InvalidVersion {
        type_name: &'static str,
        found: u32,
        min: u32,
        max: u32,
    },

    #[error("Invalid UTF-8 string at offset {0}")]
    InvalidString(usize),

    #[error("Invalid {what} tag {tag}")]
    InvalidTag { what: &'static str, tag: u32 },
}

/// A type with a versioned binary layout.
///
/// Implementors describe their fields once in `write_fields` / `read_fields`;
/// the provided methods take care of the leading version tag. Types that
/// extend another persisted type write the parent's fields first so the wire
/// layout of the parent stays a prefix of the child's.
pub trait Versioned: Sized {
    /// Name used in error messages
    const TYPE_NAME: &'static str;
    /// Version written by `serialize`
    const VERSION: u32;
    /// Oldest version `deserialize` still understands
    const MIN_VERSION: u32;

    fn write_fields(&self, writer: &mut BinaryWriter);

    fn read_fields(reader: &mut BinaryReader<'_>, version: u32) -> Result<Self, CodecError>;

    /// Write the version tag followed by the fields
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u32(Self::VERSION);
        self.write_fields(writer);
    }

    /// Read and validate the version tag, then the fields
    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_version(Self::TYPE_NAME, Self::MIN_VERSION, Self::VERSION)?;
        Self::read_fields(reader, version)
    }

    /// Serialize into a fresh buffer
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize(&mut writer);
        writer.into_bytes()
    }

    /// Deserialize from a byte slice
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BinaryReader::new(bytes);
        Self::deserialize(&mut reader)
    }
}

/// Append-only little-endian writer
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a collection length. Persisted collections are small; lengths
    /// beyond `u32::MAX` saturate.
    pub fn write_len(&mut self, len: usize) {
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a byte slice written by [`BinaryWriter`]
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let end = self.offset + N;
        let Some(bytes) = self.data.get(self.offset..end) else {
            return Err(CodecError::UnexpectedEof {
                offset: self.offset,
                needed: N,
            });
        };
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.take::<8>()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    /// Read a collection length, rejecting lengths larger than the remaining data
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.read_u32()? as usize;
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                offset: self.offset,
                needed: len,
            });
        }
        Ok(len)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let start = self.offset;
        let len = self.read_len()?;
        let bytes = &self.data[self.offset..self.offset + len];
        let value = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidString(start))?;
        self.offset += len;
        Ok(value.to_string())
    }

    /// Read a version tag and check it against the supported window.
    ///
    /// Versions below `min` belong to saves this build can no longer
    /// interpret; versions above `max` come from a newer build.
    pub fn read_version(
        &mut self,
        type_name: &'static str,
        min: u32,
        max: u32,
    ) -> Result<u32, CodecError> {
        let found = self.read_u32()?;
        if found < min || found > max {
            return Err(CodecError::InvalidVersion {
                type_name,
                found,
                min,
                max,
            });
        }
        Ok(found)
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker {
        name: String,
        weight: f32,
        /// Added in version 2
        tag: u32,
    }

    impl Versioned for Marker {
        const TYPE_NAME: &'static str = "Marker";
        const VERSION: u32 = 2;
        const MIN_VERSION: u32 = 1;

        fn write_fields(&self, writer: &mut BinaryWriter) {
            writer.write_str(&self.name);
            writer.write_f32(self.weight);
            writer.write_u32(self.tag);
        }

        fn read_fields(reader: &mut BinaryReader<'_>, version: u32) -> Result<Self, CodecError> {
            let name = reader.read_string()?;
            let weight = reader.read_f32()?;
            let tag = if version >= 2 {
                reader.read_u32()?
            } else {
                0
            };
            Ok(Self { name, weight, tag })
        }
    }

    #[test]
    fn test_versioned_round_trip() {
        let marker = Marker {
            name: "chest".to_string(),
            weight: 2.5,
            tag: 7,
        };
        let bytes = marker.to_bytes();
        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
        assert_eq!(Marker::from_bytes(&bytes).unwrap(), marker);
    }

    #[test]
    fn test_older_version_skips_gated_fields() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(1);
        writer.write_str("urn");
        writer.write_f32(1.0);
        let loaded = Marker::from_bytes(writer.as_bytes()).unwrap();
        assert_eq!(loaded.name, "urn");
        assert_eq!(loaded.tag, 0);
    }

    #[test]
    fn test_version_below_minimum_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0);
        let err = Marker::from_bytes(writer.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidVersion {
                type_name: "Marker",
                found: 0,
                min: 1,
                max: 2
            }
        );
    }

    #[test]
    fn test_future_version_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(3);
        assert!(matches!(
            Marker::from_bytes(writer.as_bytes()),
            Err(CodecError::InvalidVersion { found: 3, .. })
        ));
    }

    #[test]
    fn test_truncated_data() {
        let marker = Marker {
            name: "pot".to_string(),
            weight: 0.5,
            tag: 0,
        };
        let bytes = marker.to_bytes();
        let err = Marker::from_bytes(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(1000);
        let mut reader = BinaryReader::new(writer.as_bytes());
        assert!(reader.read_string().is_err());
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(2);
        writer.write_u8(0xFF);
        writer.write_u8(0xFE);
        let mut reader = BinaryReader::new(writer.as_bytes());
        assert_eq!(reader.read_string(), Err(CodecError::InvalidString(0)));
    }

    #[test]
    fn test_primitives_little_endian() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-2);
        writer.write_f32(-1.5);
        writer.write_f64(0.25);
        writer.write_u64(u64::MAX);
        let mut reader = BinaryReader::new(writer.as_bytes());
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), -1.5);
        assert_eq!(reader.read_f64().unwrap(), 0.25);
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
        assert_eq!(reader.remaining(), 0);
    }
}

mod reader;
mod writer;

pub use reader::{Reader, ReaderError};
pub use writer::Writer;

// Wire encoding used across the project.
// All integers are encoded little-endian.
pub trait Serializer: Sized {
    fn write(&self, writer: &mut Writer);

    fn read(reader: &mut Reader) -> Result<Self, ReaderError>;

    fn size(&self) -> usize {
        let mut writer = Writer::new();
        self.write(&mut writer);
        writer.len()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write(&mut writer);
        writer.into_bytes()
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // Read a value from a byte slice, rejecting trailing garbage
    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError> {
        let mut reader = Reader::new(bytes);
        let value = Self::read(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(ReaderError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }

    fn from_hex(hex: &str) -> Result<Self, ReaderError> {
        let bytes = hex::decode(hex).map_err(|_| ReaderError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}

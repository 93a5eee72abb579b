//! Self-describing container for a compressed buffer.
//!
//! Layout:
//!
//! ```text
//! magic    "HTX"      3 bytes
//! version  1          1 byte
//! length   u32 LE     size of the table section
//! table    MessagePack encoded `SerializableCodeTable`
//! payload  packed buffer: padding header, encoded bits, padding
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;

use crate::code_table::{CodeTable, SerializableCodeTable};
use crate::codec::Compressed;
use crate::error::{Error, Result};

const MAGIC: &[u8; 3] = b"HTX";
const VERSION: u8 = 1;
const PREAMBLE_LEN: usize = MAGIC.len() + 1 + 4;

#[derive(Debug, Clone)]
pub struct Archive<Symbol> {
    table: CodeTable<Symbol>,
    payload: Vec<u8>,
}

impl<Symbol> Archive<Symbol>
where
    Symbol: Clone + Eq + Hash + Ord,
{
    pub fn new(payload: Vec<u8>, table: CodeTable<Symbol>) -> Self {
        Self { table, payload }
    }

    pub fn table(&self) -> &CodeTable<Symbol> {
        &self.table
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_parts(self) -> (Vec<u8>, CodeTable<Symbol>) {
        (self.payload, self.table)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>>
    where
        Symbol: Serialize,
    {
        let table = rmp_serde::to_vec(&SerializableCodeTable::from(&self.table))?;
        let table_len = table_len_field(table.len())?;

        let mut out = Vec::with_capacity(PREAMBLE_LEN + table.len() + self.payload.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&table_len.to_le_bytes());
        out.extend_from_slice(&table);
        out.extend_from_slice(&self.payload);

        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Symbol: DeserializeOwned,
    {
        if bytes.len() < PREAMBLE_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(Error::corrupt("not a compressed archive"));
        }
        let version = bytes[MAGIC.len()];
        if version != VERSION {
            return Err(Error::corrupt(format!(
                "unsupported archive version {}",
                version
            )));
        }

        let mut len_buf = [0; 4];
        len_buf.copy_from_slice(&bytes[MAGIC.len() + 1..PREAMBLE_LEN]);
        let table_len = u32::from_le_bytes(len_buf) as usize;

        let rest = &bytes[PREAMBLE_LEN..];
        if table_len > rest.len() {
            return Err(Error::corrupt("archive truncated inside code table"));
        }
        let (table, payload) = rest.split_at(table_len);

        let table: SerializableCodeTable<Symbol> = rmp_serde::from_slice(table)?;

        Ok(Self {
            table: CodeTable::try_from(table)?,
            payload: payload.to_vec(),
        })
    }
}

fn table_len_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TableTooLarge(len))
}

impl<Symbol> From<Compressed<Symbol>> for Archive<Symbol> {
    fn from(other: Compressed<Symbol>) -> Self {
        Self {
            table: other.table,
            payload: other.bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{compress, decompress};

    #[test]
    fn archive_restores_table_and_payload() {
        let archive = Archive::from(compress(b"abracadabra").unwrap());
        let bytes = archive.to_bytes().unwrap();

        assert_eq!(&bytes[..4], b"HTX\x01");
        assert!(bytes.ends_with(&[0x01, 0x6E, 0x8A, 0xDC]));

        let back: Archive<u8> = Archive::from_bytes(&bytes).unwrap();
        assert_eq!(back.payload(), archive.payload());

        let (payload, table) = back.into_parts();
        assert_eq!(decompress(&payload, &table).unwrap(), b"abracadabra");

        let rebuilt = Archive::new(payload, table);
        assert_eq!(rebuilt.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn table_length_limit() {
        assert_eq!(table_len_field(16).unwrap(), 16);
        assert_eq!(table_len_field(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_table_is_a_write_error() {
        let len = u32::MAX as usize + 1;

        assert!(matches!(table_len_field(len), Err(Error::TableTooLarge(n)) if n == len));
    }

    #[test]
    fn rejects_foreign_data() {
        let err = Archive::<u8>::from_bytes(b"plain text, not an archive").unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)));

        assert!(Archive::<u8>::from_bytes(b"HTX").is_err());
    }

    #[test]
    fn rejects_other_version() {
        let mut bytes = Archive::from(compress(b"abc").unwrap()).to_bytes().unwrap();
        bytes[3] = 2;

        assert!(matches!(
            Archive::<u8>::from_bytes(&bytes),
            Err(Error::CorruptStream(_))
        ));
    }

    #[test]
    fn rejects_truncated_table() {
        let bytes = Archive::from(compress(b"hello world").unwrap())
            .to_bytes()
            .unwrap();

        assert!(Archive::<u8>::from_bytes(&bytes[..PREAMBLE_LEN + 2]).is_err());
    }
}

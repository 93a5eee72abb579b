//! Lossless compression of text with Huffman codes.
//!
//! ```
//! use hufftext::{compress, decompress};
//!
//! let text = b"abracadabra";
//! let compressed = compress(text)?;
//! assert!(compressed.bytes.len() < text.len());
//!
//! let restored = decompress(&compressed.bytes, &compressed.table)?;
//! assert_eq!(restored, text);
//! # Ok::<(), hufftext::Error>(())
//! ```
//!
//! The packed bytes do not carry the code table. [`Archive`] bundles both
//! into a self-describing buffer, and [`compress_file`] / [`decompress_file`]
//! work on files through it.

pub mod archive;
pub mod bits;
pub mod code_table;
pub mod codec;
pub mod error;
pub mod file;
pub mod frequency;
pub mod tree;

pub use archive::Archive;
pub use code_table::{Code, CodeTable, SerializableCodeTable};
pub use codec::{compress, decompress, Compressed};
pub use error::{Error, Result};
pub use file::{compress_file, decompress_file, FileOptions};
pub use frequency::FrequencyMap;
pub use tree::{huffman, Node};

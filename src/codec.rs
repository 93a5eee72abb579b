use log::info;
use std::hash::Hash;

use crate::bits::{pack_symbols, unpack_symbols};
use crate::code_table::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::FrequencyMap;
use crate::tree::huffman;

/// Output of [`compress`]. The packed bytes can only be decoded with the
/// table they were produced with.
#[derive(Debug, Clone)]
pub struct Compressed<Symbol> {
    pub bytes: Vec<u8>,
    pub table: CodeTable<Symbol>,
}

impl<Symbol> Compressed<Symbol> {
    pub fn into_parts(self) -> (Vec<u8>, CodeTable<Symbol>) {
        (self.bytes, self.table)
    }
}

/// Counts frequencies, builds the tree and table, then packs `symbols`.
pub fn compress<Symbol>(symbols: &[Symbol]) -> Result<Compressed<Symbol>>
where
    Symbol: Clone + Eq + Hash + Ord,
{
    let freq = FrequencyMap::count(symbols.iter().cloned());
    let distinct = freq.len();
    let tree = huffman(freq).ok_or(Error::EmptyInput)?;
    let table = CodeTable::from_tree(&tree);

    let bytes = pack_symbols(symbols, &table)?;
    info!(
        "compressed {} symbols ({} distinct) into {} bytes, {:.3} bits per symbol",
        symbols.len(),
        distinct,
        bytes.len(),
        (bytes.len() * 8) as f64 / symbols.len() as f64
    );

    Ok(Compressed { bytes, table })
}

/// Reverses [`compress`] given the table it returned.
pub fn decompress<Symbol>(bytes: &[u8], table: &CodeTable<Symbol>) -> Result<Vec<Symbol>>
where
    Symbol: Clone + Eq + Hash,
{
    let symbols = unpack_symbols(bytes, table)?;
    info!(
        "decompressed {} bytes into {} symbols",
        bytes.len(),
        symbols.len()
    );

    Ok(symbols)
}

use bitvec::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::frequency::FrequencyMap;
use crate::tree::Node;

/// A bitstring; the first bit is the most significant bit of the first byte.
pub type Code = BitVec<u8, Msb0>;

/// Forward (symbol to code) and reverse (code to symbol) mappings derived
/// from one Huffman tree. The two mappings are exact inverses.
#[derive(Debug, Clone)]
pub struct CodeTable<Symbol> {
    encode_table: HashMap<Symbol, Code>,
    decode_table: HashMap<Code, Symbol>,
    max_len: usize,
}

impl<Symbol> CodeTable<Symbol>
where
    Symbol: Clone + Eq + Hash,
{
    /// Assigns `0` to every left edge and `1` to every right edge.
    ///
    /// A tree made of a single leaf gets the one-bit code `0`, since an
    /// empty code cannot be told apart in the packed stream.
    pub fn from_tree(root: &Node<Symbol>) -> Self {
        fn traverse<Symbol: Clone>(
            node: &Node<Symbol>,
            v: &mut Code,
            dec: &mut HashMap<Code, Symbol>,
        ) {
            // symbol nodes have no children
            if let Some(sym) = node.symbol() {
                dec.insert(v.clone(), sym.clone());
                return;
            }

            if let Some(left) = node.left() {
                v.push(false);
                traverse(left, v, dec);
                v.pop();
            }

            if let Some(right) = node.right() {
                v.push(true);
                traverse(right, v, dec);
                v.pop();
            }
        }

        let mut bv = Code::new();
        if root.is_leaf() {
            bv.push(false);
        }

        let mut dec = HashMap::new();
        traverse(root, &mut bv, &mut dec);

        let table = Self::from_decode_table(dec);
        debug!(
            "derived {} codes, longest is {} bits",
            table.len(),
            table.max_len
        );
        table
    }

    fn from_decode_table(mut dec: HashMap<Code, Symbol>) -> Self {
        // Codes may carry stale bits past their length from the traversal.
        dec = dec
            .into_iter()
            .map(|(mut k, v)| {
                k.set_uninitialized(false);
                (k, v)
            })
            .collect();

        let enc = dec.iter().map(|(k, v)| (v.clone(), k.clone())).collect();
        let max_len = dec.keys().map(|k| k.len()).max().unwrap_or(0);

        Self {
            encode_table: enc,
            decode_table: dec,
            max_len,
        }
    }

    pub fn code(&self, symbol: &Symbol) -> Option<&BitSlice<u8, Msb0>> {
        self.encode_table.get(symbol).map(|c| c.as_bitslice())
    }

    pub fn symbol(&self, code: &BitSlice<u8, Msb0>) -> Option<&Symbol> {
        self.decode_table.get(code)
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.encode_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encode_table.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_len
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &BitSlice<u8, Msb0>)> {
        self.encode_table.iter().map(|(s, c)| (s, c.as_bitslice()))
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<_> = self.decode_table.keys().collect();
        codes.sort();
        // in lexicographic order a prefix sorts right before its extensions
        codes.windows(2).all(|w| !w[1].starts_with(w[0].as_bitslice()))
    }

    /// Concatenates the code of every symbol, in order.
    pub fn encode(&self, symbols: &[Symbol]) -> Result<Code> {
        let mut out = Code::new();
        for (index, s) in symbols.iter().enumerate() {
            let code = self
                .encode_table
                .get(s)
                .ok_or(Error::UnknownSymbol { index })?;
            out.extend_from_bitslice(code);
        }

        Ok(out)
    }

    /// Greedy left to right scan: a symbol is emitted as soon as the
    /// accumulated bits match a code.
    pub fn decode(&self, input: &BitSlice<u8, Msb0>) -> Result<Vec<Symbol>> {
        let mut out = Vec::new();

        let mut cursor = Code::new();
        for (offset, b) in input.iter().by_vals().enumerate() {
            cursor.push(b);
            if let Some(sym) = self.decode_table.get(&cursor) {
                cursor.clear();
                out.push(sym.clone());
            } else if cursor.len() >= self.max_len {
                return Err(Error::corrupt(format!(
                    "no code matches the bits ending at offset {}",
                    offset
                )));
            }
        }

        if !cursor.is_empty() {
            return Err(Error::corrupt(format!(
                "{} trailing bits match no code",
                cursor.len()
            )));
        }

        Ok(out)
    }
}

impl<Symbol> CodeTable<Symbol>
where
    Symbol: Clone + Eq + Hash + Ord,
{
    /// Total bits needed to encode a text with the given frequencies, or
    /// `None` if some symbol has no code.
    pub fn weighted_length(&self, freq: &FrequencyMap<Symbol>) -> Option<usize> {
        freq.iter()
            .map(|(s, n)| self.encode_table.get(s).map(|c| c.len() * n))
            .sum()
    }

    /// Average number of bits per symbol.
    pub fn average_length(&self, freq: &FrequencyMap<Symbol>) -> Option<f64> {
        if freq.is_empty() {
            return None;
        }
        let bits = self.weighted_length(freq)?;
        Some(bits as f64 / freq.total() as f64)
    }
}

/// Storable form of a [`CodeTable`]: the symbols in ascending order, the
/// length of each one's code, and every code concatenated in that order and
/// packed into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableCodeTable<Symbol> {
    symbols: Vec<Symbol>,
    lengths: Vec<usize>,
    bits: Box<[u8]>,
}

impl<'a, Symbol> From<&'a CodeTable<Symbol>> for SerializableCodeTable<Symbol>
where
    Symbol: Clone + Ord,
{
    fn from(other: &'a CodeTable<Symbol>) -> Self {
        let mut codes: Vec<_> = other.encode_table.iter().collect();
        codes.sort_by(|a, b| a.0.cmp(b.0));

        let mut bits = Code::new();
        let mut symbols = Vec::with_capacity(codes.len());
        let mut lengths = Vec::with_capacity(codes.len());
        for (s, code) in codes {
            symbols.push(s.clone());
            lengths.push(code.len());
            bits.extend_from_bitslice(code);
        }
        bits.set_uninitialized(false);

        Self {
            symbols,
            lengths,
            bits: bits.into_vec().into_boxed_slice(),
        }
    }
}

impl<Symbol> TryFrom<SerializableCodeTable<Symbol>> for CodeTable<Symbol>
where
    Symbol: Clone + Eq + Hash,
{
    type Error = Error;

    fn try_from(other: SerializableCodeTable<Symbol>) -> Result<Self> {
        let SerializableCodeTable {
            symbols,
            lengths,
            bits,
        } = other;

        if symbols.is_empty() {
            return Err(Error::corrupt("code table is empty"));
        }
        if symbols.len() != lengths.len() {
            return Err(Error::corrupt(format!(
                "{} symbols but {} code lengths",
                symbols.len(),
                lengths.len()
            )));
        }

        let total = lengths
            .iter()
            .try_fold(0usize, |acc, &len| acc.checked_add(len))
            .ok_or_else(|| Error::corrupt("code lengths overflow"))?;
        if total.div_ceil(8) != bits.len() {
            return Err(Error::corrupt(format!(
                "{} code bits stored in {} bytes",
                total,
                bits.len()
            )));
        }

        let mut rest = bits.view_bits::<Msb0>();
        let mut seen = HashSet::new();
        let mut dec = HashMap::new();
        for (symbol, len) in symbols.into_iter().zip(lengths) {
            if len == 0 {
                return Err(Error::corrupt("empty code in code table"));
            }
            if !seen.insert(symbol.clone()) {
                return Err(Error::corrupt("symbol listed twice in code table"));
            }

            let (code, tail) = rest.split_at(len);
            rest = tail;
            if dec.insert(code.to_bitvec(), symbol).is_some() {
                return Err(Error::corrupt("code assigned to two symbols"));
            }
        }

        let table = Self::from_decode_table(dec);
        if !table.is_prefix_free() {
            return Err(Error::corrupt("code table is not prefix-free"));
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::huffman;

    fn table_for(text: &str) -> CodeTable<u8> {
        let tree = huffman(FrequencyMap::count(text.bytes())).unwrap();
        CodeTable::from_tree(&tree)
    }

    fn code_str(table: &CodeTable<u8>, s: u8) -> String {
        table
            .code(&s)
            .unwrap()
            .iter()
            .by_vals()
            .map(|b| if b { '1' } else { '0' })
            .collect()
    }

    #[test]
    fn codes_abacba() {
        let table = table_for("abacba");

        assert_eq!(code_str(&table, b'a'), "0");
        assert_eq!(code_str(&table, b'c'), "10");
        assert_eq!(code_str(&table, b'b'), "11");
        assert_eq!(table.symbol(bits![u8, Msb0; 1, 0]), Some(&b'c'));
    }

    #[test]
    fn code_lengths_abracadabra() {
        let table = table_for("abracadabra");

        assert_eq!(table.code(&b'a').unwrap().len(), 1);
        for s in *b"bcdr" {
            assert_eq!(table.code(&s).unwrap().len(), 3);
        }
        assert!(table.is_prefix_free());
    }

    #[test]
    fn weighted_length_is_optimal() {
        // merges: c+d=2, b+r=4, 2+4=6, a+6=11 -> 2 + 4 + 6 + 11
        let freq = FrequencyMap::count("abracadabra".bytes());
        let table = table_for("abracadabra");

        assert_eq!(table.weighted_length(&freq), Some(23));
        assert_eq!(table.average_length(&freq), Some(23.0 / 11.0));
    }

    #[test]
    fn weighted_length_unknown_symbol() {
        let table = table_for("ab");
        let freq = FrequencyMap::count("abc".bytes());

        assert_eq!(table.weighted_length(&freq), None);
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let table = table_for("aaaa");

        assert_eq!(code_str(&table, b'a'), "0");
        assert_eq!(table.max_code_len(), 1);
    }

    #[test]
    fn test_encode_decode() {
        let s = String::from(
            "This is a really long message, I sure do hope it encodes and decodes properly.",
        );
        let table = table_for(&s);
        assert!(table.is_prefix_free());

        let out = table.encode(s.as_bytes()).unwrap();
        let dec = String::from_utf8(table.decode(&out).unwrap()).unwrap();

        assert_eq!(dec, s);
    }

    #[test]
    fn encode_unknown_symbol() {
        let table = table_for("abc");

        let err = table.encode(b"abz").unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol { index: 2 }));
    }

    #[test]
    fn decode_leftover_bits() {
        let table = table_for("abacba");

        // "0" decodes to 'a', the trailing "1" is incomplete
        let err = table.decode(bits![u8, Msb0; 0, 1]).unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)));
    }

    #[test]
    fn serialized_table_restores_codes() {
        let table = table_for("abracadabra");

        let stored = SerializableCodeTable::from(&table);
        let bytes = rmp_serde::to_vec(&stored).unwrap();
        let back: SerializableCodeTable<u8> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back, stored);

        let restored = CodeTable::try_from(back).unwrap();
        for (s, code) in table.iter() {
            assert_eq!(restored.code(s), Some(code));
        }
        assert_eq!(restored.len(), table.len());
    }

    #[test]
    fn serialized_table_is_compact() {
        // a=0 b=110 c=100 d=101 r=111 concatenate to 13 bits, two bytes
        let stored = SerializableCodeTable::from(&table_for("abracadabra"));
        assert_eq!(stored.symbols, b"abcdr".to_vec());
        assert_eq!(stored.lengths, vec![1, 3, 3, 3, 3]);
        assert_eq!(&*stored.bits, &[0b0110_1001u8, 0b0111_1000]);

        // three array headers, five symbols, five lengths, two bit bytes
        let bytes = rmp_serde::to_vec(&stored).unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn rejects_prefix_table() {
        // a=0 b=01
        let stored = SerializableCodeTable {
            symbols: vec![b'a', b'b'],
            lengths: vec![1, 2],
            bits: vec![0b0010_0000].into_boxed_slice(),
        };

        assert!(matches!(
            CodeTable::try_from(stored),
            Err(Error::CorruptStream(_))
        ));
    }

    #[test]
    fn rejects_bad_lengths() {
        let empty_code = SerializableCodeTable {
            symbols: vec![b'a', b'b'],
            lengths: vec![0, 1],
            bits: vec![0].into_boxed_slice(),
        };
        let too_long = SerializableCodeTable {
            symbols: vec![b'a'],
            lengths: vec![9],
            bits: vec![0].into_boxed_slice(),
        };
        let extra_bytes = SerializableCodeTable {
            symbols: vec![b'a'],
            lengths: vec![1],
            bits: vec![0, 0].into_boxed_slice(),
        };
        let missing_length = SerializableCodeTable {
            symbols: vec![b'a', b'b'],
            lengths: vec![1],
            bits: vec![0].into_boxed_slice(),
        };
        let overflow = SerializableCodeTable {
            symbols: vec![b'a', b'b'],
            lengths: vec![usize::MAX, 1],
            bits: vec![0].into_boxed_slice(),
        };
        let empty = SerializableCodeTable::<u8> {
            symbols: vec![],
            lengths: vec![],
            bits: Box::new([]),
        };

        assert!(CodeTable::try_from(empty_code).is_err());
        assert!(CodeTable::try_from(too_long).is_err());
        assert!(CodeTable::try_from(extra_bytes).is_err());
        assert!(CodeTable::try_from(missing_length).is_err());
        assert!(CodeTable::try_from(overflow).is_err());
        assert!(CodeTable::try_from(empty).is_err());
    }

    #[test]
    fn rejects_duplicate_symbol() {
        let stored = SerializableCodeTable {
            symbols: vec![b'a', b'a'],
            lengths: vec![1, 1],
            bits: vec![0b0100_0000].into_boxed_slice(),
        };

        assert!(CodeTable::try_from(stored).is_err());
    }
}

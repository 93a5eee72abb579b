//! Bit-level packing of encoded streams into bytes and back.
//!
//! A packed buffer is one header byte holding the padding amount, followed
//! by the encoded bits and then `padding` zero bits so the total is a whole
//! number of bytes. The padding is always between 1 and 8: an encoded
//! stream that is already byte aligned still receives a full zero byte.

use bitvec::prelude::*;
use std::hash::Hash;

use crate::code_table::{Code, CodeTable};
use crate::error::{Error, Result};

/// Number of zero bits appended after an encoded stream of `bit_len` bits.
pub fn padding_for(bit_len: usize) -> u8 {
    8 - (bit_len % 8) as u8
}

/// Pads `stream`, prefixes the padding header and regroups into bytes.
pub fn pack(stream: &BitSlice<u8, Msb0>) -> Vec<u8> {
    let padding = padding_for(stream.len());

    let mut out = Code::with_capacity(8 + stream.len() + padding as usize);
    out.extend_from_bitslice(padding.view_bits::<Msb0>());
    out.extend_from_bitslice(stream);
    out.resize(out.len() + padding as usize, false);

    out.into_vec()
}

/// Strips the padding header and trailing padding from a packed buffer,
/// returning the encoded bits.
pub fn unpack(bytes: &[u8]) -> Result<&BitSlice<u8, Msb0>> {
    let (&padding, rest) = bytes
        .split_first()
        .ok_or_else(|| Error::corrupt("missing padding header"))?;

    let bits = rest.view_bits::<Msb0>();
    let padding = padding as usize;
    if padding > bits.len() {
        return Err(Error::corrupt(format!(
            "padding of {} bits exceeds the {} bit payload",
            padding,
            bits.len()
        )));
    }

    let (payload, tail) = bits.split_at(bits.len() - padding);
    if tail.any() {
        return Err(Error::corrupt("padding bits are not zero"));
    }

    Ok(payload)
}

/// Encodes `symbols` with `table` and packs the result.
pub fn pack_symbols<Symbol>(symbols: &[Symbol], table: &CodeTable<Symbol>) -> Result<Vec<u8>>
where
    Symbol: Clone + Eq + Hash,
{
    let stream = table.encode(symbols)?;
    Ok(pack(&stream))
}

/// Unpacks `bytes` and decodes the payload with `table`.
pub fn unpack_symbols<Symbol>(bytes: &[u8], table: &CodeTable<Symbol>) -> Result<Vec<Symbol>>
where
    Symbol: Clone + Eq + Hash,
{
    let payload = unpack(bytes)?;
    table.decode(payload)
}

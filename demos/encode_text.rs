use hufftext::{compress, decompress};

fn main() -> Result<(), hufftext::Error> {
    let s = String::from("Hello my name is Sam!");
    let compressed = compress(s.as_bytes())?;

    let mut codes: Vec<_> = compressed.table.iter().collect();
    codes.sort_by_key(|(_, code)| code.len());
    for (sym, code) in codes {
        let bits: String = code.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect();
        println!("{:?} -> {}", *sym as char, bits);
    }

    let dec = String::from_utf8(decompress(&compressed.bytes, &compressed.table)?);
    println!("{} -> {} bytes: {:?}", s.len(), compressed.bytes.len(), dec);

    Ok(())
}

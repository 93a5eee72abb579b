use hufftext::{compress, decompress, Archive};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fp = env::args()
        .nth(1)
        .ok_or("Please provide path to input file as first argument.")?;

    let input_bytes = fs::read(fp)?;

    // encode scope - save to file
    {
        let packed = Archive::from(compress(input_bytes.as_slice())?);
        fs::write("encoded.htx", packed.to_bytes()?)?;
    }

    // decode scope - read from file
    {
        let file_data = fs::read("encoded.htx")?;

        let packed: Archive<u8> = Archive::from_bytes(&file_data)?;
        let (payload, table) = packed.into_parts();
        let decoded = decompress(&payload, &table)?;

        fs::write("decoded.txt", &decoded)?;
        assert_eq!(decoded, input_bytes);
    }

    Ok(())
}

use anyhow::{ensure, Result};
use log::info;
use lzw_codec::{decoder::Decoder, encoder::Encoder, Config};

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

/// Grayscale pixels with horizontal bands, as they would come out of a PGM body.
fn grayscale_image() -> Vec<u8> {
    (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| ((y / 16) * 16 + (x / 40)) as u8))
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let pixels = grayscale_image();

    for (name, config) in [
        ("variable", Config::VARIABLE),
        ("gif", Config::GIF),
        ("fixed 12 bits", Config::FIXED_12),
        ("16 bit words", Config::WORD_16),
    ] {
        let mut compressed = vec![];
        let stats = Encoder::encode(&pixels[..], &mut compressed, &config)?;

        // The container keeps the original length, here it's just the pixel count.
        let decompressed = Decoder::decode_to_vec(&compressed[..], WIDTH * HEIGHT, &config)?;
        ensure!(decompressed == pixels, "{name}: round trip changed the data");

        info!(
            "{name}: {} bytes -> {} bytes in {} codes, {} resets",
            stats.input_len, stats.compressed_len, stats.code_count, stats.resets
        );
        println!(
            "{name:>14}: {:>6} -> {:>6} bytes ({:.1}%)",
            pixels.len(),
            compressed.len(),
            100.0 * compressed.len() as f64 / pixels.len() as f64
        );
    }

    Ok(())
}

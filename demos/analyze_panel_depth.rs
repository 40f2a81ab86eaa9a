use std::collections::HashSet;

use lcd_stream_rs::frame_stream::common::tiff_io::read_rgba8;
use lcd_stream_rs::frame_stream::pack_pixel;

struct ChannelReport {
    name: &'static str,
    values: HashSet<u8>,
    quantized: HashSet<u8>,
}

impl ChannelReport {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            values: HashSet::new(),
            quantized: HashSet::new(),
        }
    }

    fn print(&self) {
        let min = self.values.iter().min().copied().unwrap_or(0);
        let max = self.values.iter().max().copied().unwrap_or(0);
        println!("\n{} channel:", self.name);
        println!("  Range: {} - {} (span: {})", min, max, max - min);
        println!("  Unique values: {}", self.values.len());
        println!("  Effective bits: {:.2}", (self.values.len().max(1) as f64).log2());
        println!(
            "  After RGB565 packing: {} unique values (loss: {})",
            self.quantized.len(),
            self.values.len() - self.quantized.len()
        );
    }
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "panel.tiff".to_string());
    let image = read_rgba8(path.as_ref())?;

    println!("Image: {}x{} pixels", image.width, image.height);

    let mut channels = [
        ChannelReport::new("Red"),
        ChannelReport::new("Green"),
        ChannelReport::new("Blue"),
    ];

    for px in image.data.chunks_exact(4) {
        let packed = pack_pixel(px[0], px[1], px[2]);
        for (i, channel) in channels.iter_mut().enumerate() {
            channel.values.insert(px[i]);
            channel.quantized.insert(packed.quantized[i]);
        }
    }

    for channel in &channels {
        channel.print();
    }

    Ok(())
}

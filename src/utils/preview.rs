//! Terminal previews of generated images

use tch::{Device, Kind, Tensor};

use crate::data::denormalize;
use crate::error::{GanError, Result};

/// Characters from dark to bright
const RAMP: &[u8] = b" .:-=+*#%@";

/// Render one flattened image in [-1, 1] as ASCII art, `width` pixels per line
pub fn render_ascii(image: &Tensor, width: i64) -> Result<String> {
    let numel = image.numel() as i64;
    if width <= 0 || numel == 0 || numel % width != 0 {
        return Err(GanError::ShapeMismatch {
            what: "preview image",
            expected: vec![numel / width.max(1), width],
            actual: image.size(),
        });
    }

    let pixels = denormalize(&image.flatten(0, -1))
        .clamp(0.0, 1.0)
        .to_kind(Kind::Float)
        .to_device(Device::Cpu);
    let pixels = Vec::<f32>::try_from(&pixels)?;

    let last = (RAMP.len() - 1) as f32;
    let lines: Vec<String> = pixels
        .chunks(width as usize)
        .map(|row| {
            row.iter()
                .map(|&p| RAMP[(p * last).round() as usize] as char)
                .collect()
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Render several images side by side
pub fn render_grid(images: &Tensor, width: i64, gap: usize) -> Result<String> {
    let rendered: Vec<String> = (0..images.size()[0])
        .map(|i| render_ascii(&images.get(i), width))
        .collect::<Result<_>>()?;

    let columns: Vec<Vec<&str>> = rendered.iter().map(|r| r.lines().collect()).collect();
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    let spacer = " ".repeat(gap);

    let rows: Vec<String> = (0..height)
        .map(|line| {
            columns
                .iter()
                .map(|col| col.get(line).copied().unwrap_or(""))
                .collect::<Vec<_>>()
                .join(&spacer)
        })
        .collect();

    Ok(rows.join("\n"))
}

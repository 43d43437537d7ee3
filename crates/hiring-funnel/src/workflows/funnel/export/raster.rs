use super::layout::{LabelAnchor, SankeyLayout, NODE_WIDTH};
use super::palette::node_color;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LINK_ALPHA: f64 = 0.4;
const TEXT_COLOR: [u8; 3] = [0x1a, 0x1a, 0x1a];
const GLYPH_SIZE: u32 = 8;

/// Rasterizes the layout. Bands follow a smoothstep curve between their ends;
/// node captions use an 8x8 bitmap font placed like the SVG labels.
pub(crate) fn rasterize(layout: &SankeyLayout) -> RgbImage {
    let width = layout.width.max(1.0) as u32;
    let height = layout.height.max(1.0) as u32;
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for link in &layout.links {
        let color = node_color(link.source);
        let span = (link.x1 - link.x0).max(1.0);
        let start = link.x0.floor().max(0.0) as u32;
        let end = (link.x1.ceil().max(0.0) as u32).min(width);

        for x in start..end {
            let s = ((f64::from(x) + 0.5 - link.x0) / span).clamp(0.0, 1.0);
            let eased = s * s * (3.0 - 2.0 * s);
            let top = link.y0 + (link.y1 - link.y0) * eased;
            fill_column(&mut canvas, x, top, top + link.thickness, color, LINK_ALPHA);
        }
    }

    for (index, node) in layout.nodes.iter().enumerate() {
        let color = node_color(index);
        let start = node.x.floor().max(0.0) as u32;
        let end = ((node.x + NODE_WIDTH).ceil().max(0.0) as u32).min(width);
        for x in start..end {
            fill_column(&mut canvas, x, node.y, node.y + node.height, color, 1.0);
        }
    }

    for node in &layout.nodes {
        let (x, y, anchor) = node.label_position(layout.columns);
        draw_caption(&mut canvas, &node.caption(), x, y, anchor);
    }

    canvas
}

fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))
}

fn draw_caption(canvas: &mut RgbImage, text: &str, x: f64, y: f64, anchor: LabelAnchor) {
    let advance = f64::from(GLYPH_SIZE);
    let text_width = text.chars().count() as f64 * advance;
    let left = match anchor {
        LabelAnchor::Start => x,
        LabelAnchor::End => x - text_width,
    };
    let top = (y - advance / 2.0).round() as i64;

    for (index, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin = (left + index as f64 * advance).round() as i64;
        for (dy, bits) in rows.iter().enumerate() {
            for dx in 0..GLYPH_SIZE {
                if bits & (1 << dx) != 0 {
                    put_pixel(canvas, origin + i64::from(dx), top + dy as i64, TEXT_COLOR);
                }
            }
        }
    }
}

fn put_pixel(canvas: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, Rgb(color));
    }
}

fn fill_column(canvas: &mut RgbImage, x: u32, top: f64, bottom: f64, color: [u8; 3], alpha: f64) {
    let height = canvas.height();
    let start = top.round().max(0.0) as u32;
    let end = (bottom.round().max(0.0) as u32).min(height);

    for y in start..end {
        let pixel = canvas.get_pixel_mut(x, y);
        for channel in 0..3 {
            let base = f64::from(pixel.0[channel]);
            let blended = base + (f64::from(color[channel]) - base) * alpha;
            pixel.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

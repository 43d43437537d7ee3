use super::layout::{LabelAnchor, SankeyLayout, NODE_WIDTH};
use super::palette::{hex, node_color};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const LINK_OPACITY: f64 = 0.4;

pub(crate) fn render(layout: &SankeyLayout) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut svg, layout);
    svg
}

fn write_document(out: &mut String, layout: &SankeyLayout) -> std::fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="10">"#,
        w = layout.width,
        h = layout.height
    )?;
    writeln!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;

    for link in &layout.links {
        let mid = (link.x0 + link.x1) / 2.0;
        let (top0, top1) = (link.y0, link.y1);
        let (bottom0, bottom1) = (link.y0 + link.thickness, link.y1 + link.thickness);
        writeln!(
            out,
            r#"<path d="M{x0:.2},{top0:.2} C{mid:.2},{top0:.2} {mid:.2},{top1:.2} {x1:.2},{top1:.2} L{x1:.2},{bottom1:.2} C{mid:.2},{bottom1:.2} {mid:.2},{bottom0:.2} {x0:.2},{bottom0:.2} Z" fill="{color}" fill-opacity="{LINK_OPACITY}"/>"#,
            x0 = link.x0,
            x1 = link.x1,
            color = hex(node_color(link.source)),
        )?;
    }

    for (index, node) in layout.nodes.iter().enumerate() {
        writeln!(
            out,
            r##"<rect x="{:.2}" y="{:.2}" width="{NODE_WIDTH}" height="{:.2}" fill="{}" stroke="#000000" stroke-width="0.5" aria-label="{}"/>"##,
            node.x,
            node.y,
            node.height,
            hex(node_color(index)),
            encode_double_quoted_attribute(&node.label),
        )?;

        let (text_x, text_y, anchor) = node.label_position(layout.columns);
        let anchor = match anchor {
            LabelAnchor::Start => "start",
            LabelAnchor::End => "end",
        };
        writeln!(
            out,
            r#"<text x="{text_x:.2}" y="{text_y:.2}" dominant-baseline="middle" text-anchor="{anchor}">{}</text>"#,
            encode_text(&node.caption()),
        )?;
    }

    writeln!(out, "</svg>")
}

use tiny_skia as sk;

use crate::dna::{CanvasSize, DrawCmd};

/// drawing-surface capability the engine composites phenotypes through.
///
/// rendering must be a pure function of (canvas, commands): identical inputs
/// always produce an identical buffer, regardless of call order. buffers are
/// premultiplied RGBA8 (tiny-skia's native format), the same encoding the
/// fitness evaluator expects for the target.
pub trait Renderer: Sync {
    fn render(&self, canvas: CanvasSize, cmds: &[DrawCmd]) -> Vec<u8>;
}

/// CPU rasterizer on tiny-skia
pub struct CpuRenderer;

impl Renderer for CpuRenderer {
    fn render(&self, canvas: CanvasSize, cmds: &[DrawCmd]) -> Vec<u8> {
        profiling::scope!("CpuRenderer::render");
        let mut pix =
            sk::Pixmap::new(canvas.width, canvas.height).expect("non-zero canvas dimensions");
        // transparent canvas; genes paint in genome order, later over earlier
        for cmd in cmds {
            draw_cmd(&mut pix, cmd);
        }
        pix.data().to_vec()
    }
}

fn draw_cmd(pix: &mut sk::Pixmap, cmd: &DrawCmd) {
    profiling::scope!("draw_cmd");
    let (path, rgba) = match cmd {
        DrawCmd::Polygon { points, rgba } => {
            if points.len() < 3 {
                return;
            }
            let mut pb = sk::PathBuilder::new();
            pb.move_to(points[0].0, points[0].1);
            for &(x, y) in &points[1..] {
                pb.line_to(x, y);
            }
            pb.close();
            let Some(path) = pb.finish() else {
                return; // degenerate geometry rasterizes to nothing
            };
            (path, rgba)
        }
        DrawCmd::Ellipse { center, radii, rgba } => {
            let Some(rect) = sk::Rect::from_ltrb(
                center.0 - radii.0,
                center.1 - radii.1,
                center.0 + radii.0,
                center.1 + radii.1,
            ) else {
                return;
            };
            let mut pb = sk::PathBuilder::new();
            pb.push_oval(rect);
            let Some(path) = pb.finish() else {
                return;
            };
            (path, rgba)
        }
    };

    let Some(color) = sk::Color::from_rgba(
        rgba[0].clamp(0.0, 1.0),
        rgba[1].clamp(0.0, 1.0),
        rgba[2].clamp(0.0, 1.0),
        rgba[3].clamp(0.0, 1.0),
    ) else {
        return;
    };
    let mut paint = sk::Paint::default();
    paint.anti_alias = true;
    paint.shader = sk::Shader::SolidColor(color);

    pix.fill_path(
        &path,
        &paint,
        sk::FillRule::Winding,
        sk::Transform::identity(),
        None,
    );
}

/// premultiply straight RGBA, matching tiny-skia's internal representation.
/// (x * a + 127) / 255 is a fast rounded divide-by-255.
#[inline]
pub fn premultiply(p: &[u8]) -> Vec<u8> {
    profiling::scope!("premultiply");
    let mut out = vec![0u8; p.len()];
    for (src, dst) in p.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        let a = src[3] as u16;
        dst[0] = ((src[0] as u16 * a + 127) / 255) as u8;
        dst[1] = ((src[1] as u16 * a + 127) / 255) as u8;
        dst[2] = ((src[2] as u16 * a + 127) / 255) as u8;
        dst[3] = a as u8;
    }
    out
}

/// invert premultiplication for snapshot encoding; fully transparent pixels
/// stay black
#[inline]
pub fn unpremultiply(p: &[u8]) -> Vec<u8> {
    profiling::scope!("unpremultiply");
    let mut out = vec![0u8; p.len()];
    for (src, dst) in p.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        let a = src[3] as u16;
        if a == 0 {
            dst[3] = 0;
            continue;
        }
        dst[0] = ((src[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        dst[1] = ((src[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        dst[2] = ((src[2] as u16 * 255 + a / 2) / a).min(255) as u8;
        dst[3] = a as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_triangle() -> DrawCmd {
        DrawCmd::Polygon {
            points: vec![(0.0, 0.0), (16.0, 0.0), (0.0, 16.0)],
            rgba: [1.0, 0.0, 0.0, 1.0],
        }
    }

    fn blue_triangle() -> DrawCmd {
        DrawCmd::Polygon {
            points: vec![(0.0, 0.0), (16.0, 0.0), (16.0, 16.0)],
            rgba: [0.0, 0.0, 1.0, 1.0],
        }
    }

    #[test]
    fn test_render_is_pure() {
        let canvas = CanvasSize::new(16, 16);
        let cmds = vec![red_triangle(), blue_triangle()];
        let a = CpuRenderer.render(canvas, &cmds);
        let b = CpuRenderer.render(canvas, &cmds);
        assert_eq!(a, b);
    }

    #[test]
    fn test_paint_order_matters() {
        let canvas = CanvasSize::new(16, 16);
        let front = CpuRenderer.render(canvas, &[red_triangle(), blue_triangle()]);
        let back = CpuRenderer.render(canvas, &[blue_triangle(), red_triangle()]);
        assert_ne!(front, back);
    }

    #[test]
    fn test_empty_genome_is_transparent() {
        let canvas = CanvasSize::new(4, 4);
        let buf = CpuRenderer.render(canvas, &[]);
        assert_eq!(buf.len(), 4 * 4 * 4);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_premultiply_round_trip_opaque() {
        let straight = vec![200, 100, 50, 255, 10, 20, 30, 255];
        let premul = premultiply(&straight);
        assert_eq!(unpremultiply(&premul), straight);
    }
}

use resvg::{tiny_skia, usvg};

use super::{VectorCodec, VectorScene};

/// SVG parser and rasterizer backed by `resvg`
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgCodec;

pub struct SvgScene {
    tree: usvg::Tree,
}

impl VectorScene for SvgScene {
    fn width(&self) -> f32 {
        self.tree.size().width()
    }

    fn height(&self) -> f32 {
        self.tree.size().height()
    }
}

impl VectorCodec for SvgCodec {
    type Scene = SvgScene;

    fn parse(&self, text: &str) -> Option<SvgScene> {
        match usvg::Tree::from_str(text, &usvg::Options::default()) {
            Ok(tree) => Some(SvgScene { tree }),
            Err(e) => {
                log::warn!("svg parse failed: {e}");
                None
            },
        }
    }

    fn rasterize(
        &self,
        scene: &SvgScene,
        origin_x: f32,
        origin_y: f32,
        scale_x: f32,
        scale_y: f32,
        dest: &mut [u8],
        dest_width: u32,
        dest_height: u32,
        stride: usize,
    ) {
        let Some(mut pixmap) = tiny_skia::Pixmap::new(dest_width, dest_height) else {
            return;
        };
        let transform = tiny_skia::Transform::from_row(scale_x, 0.0, 0.0, scale_y, origin_x, origin_y);
        resvg::render(&scene.tree, transform, &mut pixmap.as_mut());

        // tiny-skia keeps premultiplied color; callers expect straight RGBA
        for (y, row) in pixmap.pixels().chunks_exact(dest_width as usize).enumerate() {
            let start = y * stride;
            let Some(out) = dest.get_mut(start..start + row.len() * 4) else {
                break;
            };
            for (px, o) in row.iter().zip(out.chunks_exact_mut(4)) {
                let c = px.demultiply();
                o.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }
    }
}

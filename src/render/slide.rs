use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Canvas, Point, Rect, Rgb8},
        error::{AssetKind, SlidecastError, SlidecastResult},
        fs::{ensure_parent_dir, parent_dir},
    },
    plan::model::SlideUnit,
    render::fit::{FittedImage, load_fitted},
    text::{
        engine::{TextBrushRgba8, TextLayoutEngine},
        font::FontSource,
        wrap::{SizedMeasure, wrap_text},
    },
};

/// Geometry and colors of a structured slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideLayout {
    /// Canvas fill.
    pub background: Rgb8,
    /// Heading center point (horizontal and vertical middle of the text box).
    pub heading_center: Point,
    /// Heading font size in pixels.
    pub heading_size_px: f32,
    /// Heading text color.
    pub heading_color: Rgb8,
    /// Rule color.
    pub rule_color: Rgb8,
    /// Rule stroke thickness.
    pub rule_width: f64,
    /// Distance between the bottom of the heading box and the rule center line.
    pub rule_gap: f64,
    /// How far the rule extends past each side of the heading box.
    pub rule_overhang: f64,
    /// Top-left of the first bullet line.
    pub body_origin: Point,
    /// Bullet font size in pixels.
    pub body_size_px: f32,
    /// Wrap budget for bullet lines.
    pub column_width: f32,
    /// Vertical advance between wrapped lines of one bullet.
    pub line_pitch: f64,
    /// Vertical advance from the last line of one bullet to the next bullet.
    pub point_pitch: f64,
    /// Bullet colors, cycled per slide index.
    pub palette: [Rgb8; 3],
    /// Target rectangle for the background image.
    pub image_area: Rect,
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self {
            background: Rgb8::WHITE,
            heading_center: Point::new(640.0, 50.0),
            heading_size_px: 40.0,
            heading_color: Rgb8::BLACK,
            rule_color: Rgb8::RED,
            rule_width: 3.0,
            rule_gap: 5.0,
            rule_overhang: 10.0,
            body_origin: Point::new(60.0, 210.0),
            body_size_px: 30.0,
            column_width: 560.0,
            line_pitch: 38.0,
            point_pitch: 65.0,
            palette: [Rgb8::BLUE, Rgb8::GOLD, Rgb8::GREEN],
            image_area: Rect::new(650.0, 100.0, 1230.0, 650.0),
        }
    }
}

impl SlideLayout {
    /// Check sizes are usable and the image area lies on `canvas`.
    pub fn validate(&self, canvas: Canvas) -> SlidecastResult<()> {
        for (name, v) in [
            ("heading_size_px", self.heading_size_px),
            ("body_size_px", self.body_size_px),
            ("column_width", self.column_width),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SlidecastError::validation(format!(
                    "layout {name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("rule_width", self.rule_width),
            ("rule_gap", self.rule_gap),
            ("rule_overhang", self.rule_overhang),
            ("line_pitch", self.line_pitch),
            ("point_pitch", self.point_pitch),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SlidecastError::validation(format!(
                    "layout {name} must be finite and >= 0"
                )));
            }
        }

        let area = self.image_area;
        let bounds = canvas.rect();
        if !(area.width() >= 1.0 && area.height() >= 1.0) {
            return Err(SlidecastError::validation(
                "layout image_area must be at least 1x1 pixels",
            ));
        }
        if area.x0 < bounds.x0 || area.y0 < bounds.y0 || area.x1 > bounds.x1 || area.y1 > bounds.y1
        {
            return Err(SlidecastError::validation(format!(
                "layout image_area {area:?} lies outside the {}x{} canvas",
                canvas.width, canvas.height
            )));
        }
        Ok(())
    }
}

/// Bullet color for the slide at 1-based `index`: `palette[(index - 1) % 3]`.
pub fn palette_color(palette: &[Rgb8; 3], index: u32) -> Rgb8 {
    palette[(index.saturating_sub(1) % 3) as usize]
}

/// What happened to the background image of one slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStatus {
    /// Fitted and composited into the image area.
    Composited,
    /// No image path, or the file does not exist.
    Missing,
    /// The file exists but could not be decoded.
    Unreadable,
}

impl BackgroundStatus {
    /// True when the image area was left blank.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Composited)
    }
}

/// A composed slide raster.
#[derive(Clone, Debug)]
pub struct ComposedSlide {
    /// Opaque RGB pixels at canvas size.
    pub image: image::RgbImage,
    /// Background image outcome.
    pub background: BackgroundStatus,
}

/// Draws structured slides onto a fixed-size canvas.
pub struct SlideImageComposer {
    canvas: Canvas,
    layout: SlideLayout,
    heading: TextLayoutEngine,
    body: TextLayoutEngine,
    ctx: vello_cpu::RenderContext,
}

impl std::fmt::Debug for SlideImageComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideImageComposer")
            .field("canvas", &self.canvas)
            .field("layout", &self.layout)
            .field("heading", &self.heading)
            .field("body", &self.body)
            .finish()
    }
}

impl SlideImageComposer {
    /// Validate `canvas`/`layout` and load both fonts.
    pub fn new(
        canvas: Canvas,
        layout: SlideLayout,
        heading_font: &FontSource,
        body_font: &FontSource,
    ) -> SlidecastResult<Self> {
        canvas.validate()?;
        layout.validate(canvas)?;
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            layout,
            heading: TextLayoutEngine::new(heading_font)?,
            body: TextLayoutEngine::new(body_font)?,
            ctx: vello_cpu::RenderContext::new(w, h),
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Active layout.
    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    /// Compose `unit` in memory.
    ///
    /// A missing or undecodable background leaves the image area blank and is reported through
    /// [`ComposedSlide::background`]. Every other failure is a [`SlidecastError::Render`] for the
    /// unit's index.
    pub fn compose(&mut self, unit: &SlideUnit) -> SlidecastResult<ComposedSlide> {
        self.compose_inner(unit).map_err(|e| match e {
            SlidecastError::Render { .. } => e,
            other => SlidecastError::render(unit.index, other.to_string()),
        })
    }

    /// Compose `unit` and write it as PNG to `path`.
    ///
    /// The PNG is written to a sibling temp file and renamed onto `path` only once fully written,
    /// so a failed render never leaves a partial image at `path`.
    #[tracing::instrument(skip(self, unit), fields(index = unit.index))]
    pub fn render_to(&mut self, unit: &SlideUnit, path: &Path) -> SlidecastResult<BackgroundStatus> {
        let result = self
            .compose(unit)
            .and_then(|slide| {
                write_png_atomic(&slide.image, path)
                    .map_err(|e| SlidecastError::render(unit.index, e.to_string()))?;
                Ok(slide.background)
            });
        match &result {
            Ok(background) => tracing::debug!(?background, path = %path.display(), "slide image written"),
            Err(e) => tracing::error!(error = %e, "slide render failed"),
        }
        result
    }

    fn compose_inner(&mut self, unit: &SlideUnit) -> SlidecastResult<ComposedSlide> {
        let (background, fitted) = self.load_background(unit);

        self.ctx.reset();
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let bg = self.layout.background;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r(), bg.g(), bg.b(), 255));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));

        self.draw_heading(&unit.heading)?;
        self.draw_bullets(unit.index, &unit.bullet_points)?;
        if let Some(fitted) = fitted {
            self.draw_background(fitted)?;
        }

        let image = self.read_back()?;
        Ok(ComposedSlide { image, background })
    }

    fn load_background(&self, unit: &SlideUnit) -> (BackgroundStatus, Option<FittedImage>) {
        let Some(path) = unit.image_path.as_deref() else {
            tracing::debug!(index = unit.index, "no background image for slide");
            return (BackgroundStatus::Missing, None);
        };
        if !path.is_file() {
            let warning = SlidecastError::asset_unavailable(
                unit.index,
                AssetKind::BackgroundImage,
                path,
                "file not found",
            );
            tracing::warn!("{warning}; leaving image area blank");
            return (BackgroundStatus::Missing, None);
        }

        let area = self.layout.image_area;
        let w = area.width().round() as u32;
        let h = area.height().round() as u32;
        match load_fitted(path, w, h) {
            Ok(fitted) => (BackgroundStatus::Composited, Some(fitted)),
            Err(e) => {
                let warning = SlidecastError::asset_unavailable(
                    unit.index,
                    AssetKind::BackgroundImage,
                    path,
                    format!("{e:#}"),
                );
                tracing::warn!("{warning}; leaving image area blank");
                (BackgroundStatus::Unreadable, None)
            }
        }
    }

    fn draw_heading(&mut self, heading: &str) -> SlidecastResult<()> {
        if heading.trim().is_empty() {
            return Ok(());
        }
        let layout = self.heading.layout_line(
            heading,
            self.layout.heading_size_px,
            self.layout.heading_color.into(),
        )?;

        let w = f64::from(layout.width());
        let h = f64::from(layout.height());
        let c = self.layout.heading_center;
        let text_box = Rect::new(c.x - w / 2.0, c.y - h / 2.0, c.x + w / 2.0, c.y + h / 2.0);

        draw_text_layout(
            &mut self.ctx,
            self.heading.font_data(),
            &layout,
            (text_box.x0, text_box.y0),
        );

        let rule_y = text_box.y1 + self.layout.rule_gap;
        let half = self.layout.rule_width / 2.0;
        let rule = self.layout.rule_color;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(rule.r(), rule.g(), rule.b(), 255));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            text_box.x0 - self.layout.rule_overhang,
            rule_y - half,
            text_box.x1 + self.layout.rule_overhang,
            rule_y + half,
        ));
        Ok(())
    }

    fn draw_bullets(&mut self, index: u32, points: &[String]) -> SlidecastResult<()> {
        let color = palette_color(&self.layout.palette, index);
        let size = self.layout.body_size_px;
        let x = self.layout.body_origin.x;
        let mut y = self.layout.body_origin.y;

        for point in points {
            let lines = {
                let mut measure = SizedMeasure::new(&mut self.body, size);
                wrap_text(point, &mut measure, self.layout.column_width)?
            };
            let last = lines.len().saturating_sub(1);
            for (i, line) in lines.iter().enumerate() {
                // Blank lines take up space but draw nothing.
                if !line.is_empty() {
                    let layout = self.body.layout_line(line, size, color.into())?;
                    draw_text_layout(&mut self.ctx, self.body.font_data(), &layout, (x, y));
                }
                if i < last {
                    y += self.layout.line_pitch;
                }
            }
            y += self.layout.point_pitch;
        }
        Ok(())
    }

    fn draw_background(&mut self, fitted: FittedImage) -> SlidecastResult<()> {
        let pixmap = pixmap_from_premul_bytes(&fitted.rgba8_premul, fitted.width, fitted.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let area = self.layout.image_area;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            area.x0.round(),
            area.y0.round(),
        )));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(fitted.width),
            f64::from(fitted.height),
        ));
        Ok(())
    }

    fn read_back(&mut self) -> SlidecastResult<image::RgbImage> {
        let (w, h) = canvas_u16(self.canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let bg = self.layout.background;
        let rgb = flatten_premul_to_rgb8(pixmap.data_as_u8_slice(), [bg.r(), bg.g(), bg.b()]);
        image::RgbImage::from_raw(self.canvas.width, self.canvas.height, rgb)
            .ok_or_else(|| SlidecastError::validation("rendered pixmap size mismatch"))
    }
}

fn draw_text_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
    origin: (f64, f64),
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate(origin));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn canvas_u16(canvas: Canvas) -> SlidecastResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SlidecastError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SlidecastError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SlidecastResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SlidecastError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SlidecastError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SlidecastError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

/// Flatten premultiplied RGBA8 over an opaque background into RGB8.
fn flatten_premul_to_rgb8(src: &[u8], bg: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for s in src.chunks_exact(4) {
        let inv = 255u16 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255(u16::from(bg[c]), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Encode `image` as PNG next to `path`, then rename it into place.
pub fn write_png_atomic(image: &image::RgbImage, path: &Path) -> SlidecastResult<()> {
    ensure_parent_dir(path)?;
    let dir = parent_dir(path);
    let mut tmp = tempfile::Builder::new()
        .prefix(".slidecast-")
        .suffix(".png")
        .tempfile_in(&dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;

    {
        let mut writer = std::io::BufWriter::new(tmp.as_file_mut());
        image
            .write_to(&mut writer, image::ImageFormat::Png)
            .context("encode png")?;
        std::io::Write::flush(&mut writer).context("flush png")?;
    }

    tmp.persist(path)
        .with_context(|| format!("move slide image into '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/slide.rs"]
mod tests;

//! Image, recording and sub-surfaces.
//!
//! Surfaces do not rasterize. Drawing operators are recorded as [`DrawOp`]s
//! on the target surface; image surfaces additionally own a pixel buffer that
//! can be supplied by the caller and written to a stream.

use crate::cairo::{NativePtr, Resource};
use crate::font::FontOptions;
use crate::{Cairo, Content, DrawOp, Extents, Format, Status, SurfaceType};

/// Leading bytes of a raw image stream.
pub const STREAM_MAGIC: [u8; 8] = *b"\x89OOCAIRO";

#[derive(Debug, Clone)]
pub(crate) struct ImageData {
    pub format: Format,
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) enum SurfaceKind {
    Image(ImageData),
    Recording { extents: Option<Extents> },
    /// A window onto `target`. `rect` is in the target's device space.
    Subsurface { target: NativePtr, rect: Extents },
}

#[derive(Debug, Clone)]
pub(crate) struct SurfaceData {
    pub status: Status,
    pub kind: SurfaceKind,
    pub content: Content,
    pub device_offset: (f64, f64),
    pub fallback_resolution: (f64, f64),
    pub finished: bool,
    pub ops: Vec<DrawOp>,
    pub pages: u32,
}

impl Resource for SurfaceData {
    fn status(&self) -> Status {
        self.status
    }

    fn children(&self) -> Vec<NativePtr> {
        match self.kind {
            SurfaceKind::Subsurface { target, .. } => vec![target],
            _ => Vec::new(),
        }
    }
}

impl SurfaceData {
    fn new(kind: SurfaceKind, content: Content) -> Self {
        Self {
            status: Status::Success,
            kind,
            content,
            device_offset: (0.0, 0.0),
            fallback_resolution: (300.0, 300.0),
            finished: false,
            ops: Vec::new(),
            pages: 0,
        }
    }

    fn error(status: Status) -> Self {
        let mut surface = Self::new(
            SurfaceKind::Image(ImageData {
                format: Format::Argb32,
                width: 0,
                height: 0,
                stride: 0,
                data: Vec::new(),
            }),
            Content::ColorAlpha,
        );
        surface.status = status;
        surface
    }

    /// Device-space bounds, `None` when unbounded.
    pub fn extents(&self) -> Option<Extents> {
        match &self.kind {
            SurfaceKind::Image(image) => Some(Extents::new(0.0, 0.0, f64::from(image.width), f64::from(image.height))),
            SurfaceKind::Recording { extents } => *extents,
            SurfaceKind::Subsurface { rect, .. } => Some(Extents::new(0.0, 0.0, rect.x2 - rect.x1, rect.y2 - rect.y1)),
        }
    }

    fn image(&self) -> Result<&ImageData, Status> {
        match &self.kind {
            SurfaceKind::Image(image) => Ok(image),
            _ => Err(Status::SurfaceTypeMismatch),
        }
    }
}

fn row_bytes(format: Format, width: i32) -> usize {
    (format.bits_per_pixel() as usize * width.max(0) as usize).div_ceil(8)
}

/// Row bytes rounded up to 32 bits, `None` when the width is out of range.
fn stride_for_width(format: Format, width: i32) -> Option<i32> {
    let bpp = u64::from(format.bits_per_pixel());
    let width = u64::try_from(width).ok()?;
    if width >= (i32::MAX as u64 - 7) / bpp {
        return None;
    }
    let bytes = (bpp * width).div_ceil(8);
    i32::try_from((bytes + 3) & !3).ok()
}

impl Cairo {
    /// Smallest stride for an image of `width` pixels, `None` when the width
    /// is out of range.
    pub fn format_stride_for_width(&self, format: Format, width: i32) -> Option<i32> {
        self.log("cairo_format_stride_for_width");
        stride_for_width(format, width)
    }

    pub fn image_surface_create(&self, format: Format, width: i32, height: i32) -> NativePtr {
        self.log("cairo_image_surface_create");
        if width < 0 || height < 0 {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        }
        let Some(stride) = self.format_stride_for_width(format, width) else {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        };
        let data = vec![0; stride as usize * height as usize];
        self.insert(SurfaceData::new(
            SurfaceKind::Image(ImageData {
                format,
                width,
                height,
                stride,
                data,
            }),
            format.content(),
        ))
    }

    /// Create an image surface owning a copy of `data`.
    pub fn image_surface_create_for_data(
        &self,
        data: Vec<u8>,
        format: Format,
        width: i32,
        height: i32,
        stride: i32,
    ) -> NativePtr {
        self.log("cairo_image_surface_create_for_data");
        if width < 0 || height < 0 {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        }
        let min_stride = self.format_stride_for_width(format, width);
        if stride % 4 != 0 || min_stride.is_none_or(|min| stride < min) {
            return self.insert(SurfaceData::error(Status::InvalidStride));
        }
        if data.len() < stride as usize * height as usize {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        }
        self.insert(SurfaceData::new(
            SurfaceKind::Image(ImageData {
                format,
                width,
                height,
                stride,
                data,
            }),
            format.content(),
        ))
    }

    /// Read an image surface from a raw stream. `read` must return exactly
    /// the number of bytes asked for.
    pub fn image_surface_create_from_stream(
        &self,
        read: &mut dyn FnMut(usize) -> Result<Vec<u8>, Status>,
    ) -> NativePtr {
        self.log("cairo_image_surface_create_from_png_stream");
        match read_image(read) {
            Ok(image) => {
                let content = image.format.content();
                self.insert(SurfaceData::new(SurfaceKind::Image(image), content))
            }
            Err(status) => self.insert(SurfaceData::error(status)),
        }
    }

    /// Create a recording surface, unbounded when `extents` is `None`.
    pub fn recording_surface_create(&self, content: Content, extents: Option<Extents>) -> NativePtr {
        self.log("cairo_recording_surface_create");
        self.recording_surface_new(content, extents)
    }

    pub(crate) fn recording_surface_new(&self, content: Content, extents: Option<Extents>) -> NativePtr {
        self.insert(SurfaceData::new(SurfaceKind::Recording { extents }, content))
    }

    /// Bounding box of everything drawn on a recording surface, as
    /// `(x, y, width, height)`.
    pub fn recording_surface_ink_extents(&self, surface: NativePtr) -> Result<(f64, f64, f64, f64), Status> {
        self.log("cairo_recording_surface_ink_extents");
        self.with(surface, |s: &SurfaceData| {
            if !matches!(s.kind, SurfaceKind::Recording { .. }) {
                return Err(Status::SurfaceTypeMismatch);
            }
            Ok(ink_extents(&s.ops)
                .map(|e| (e.x1, e.y1, e.x2 - e.x1, e.y2 - e.y1))
                .unwrap_or_default())
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn surface_create_similar(&self, other: NativePtr, content: Content, width: i32, height: i32) -> NativePtr {
        self.log("cairo_surface_create_similar");
        let Some((status, recording)) = self.with(other, |s: &SurfaceData| {
            (s.status, matches!(s.kind, SurfaceKind::Recording { .. }))
        }) else {
            return self.insert(SurfaceData::error(Status::NullPointer));
        };
        if !status.is_success() {
            return self.insert(SurfaceData::error(status));
        }
        if width < 0 || height < 0 {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        }
        if recording {
            let extents = Extents::new(0.0, 0.0, f64::from(width), f64::from(height));
            return self.insert(SurfaceData::new(SurfaceKind::Recording { extents: Some(extents) }, content));
        }
        self.image_surface_create(content.image_format(), width, height)
    }

    /// A surface drawing into the `width` x `height` rectangle of `target`
    /// at `(x, y)`. Drawing is clipped to the rectangle.
    pub fn surface_create_for_rectangle(
        &self,
        target: NativePtr,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> NativePtr {
        self.log("cairo_surface_create_for_rectangle");
        let Some((status, finished, content, (dx, dy))) = self.with(target, |s: &SurfaceData| {
            (s.status, s.finished, s.content, s.device_offset)
        }) else {
            return self.insert(SurfaceData::error(Status::NullPointer));
        };
        if !status.is_success() {
            return self.insert(SurfaceData::error(status));
        }
        if finished {
            return self.insert(SurfaceData::error(Status::SurfaceFinished));
        }
        if !(width >= 0.0 && height >= 0.0) {
            return self.insert(SurfaceData::error(Status::InvalidSize));
        }
        let rect = Extents::new(x + dx, y + dy, x + dx + width, y + dy + height);
        self.retain(target);
        self.insert(SurfaceData::new(SurfaceKind::Subsurface { target, rect }, content))
    }

    pub fn surface_finish(&self, surface: NativePtr) {
        self.log("cairo_surface_finish");
        self.with_mut(surface, |s: &mut SurfaceData, _| s.finished = true);
    }

    pub fn surface_flush(&self, _surface: NativePtr) {
        self.log("cairo_surface_flush");
    }

    pub fn surface_mark_dirty(&self, surface: NativePtr) {
        self.log("cairo_surface_mark_dirty");
        self.with_mut(surface, |s: &mut SurfaceData, _| {
            if s.finished {
                s.status.set_sticky(Status::SurfaceFinished);
            }
        });
    }

    pub fn surface_get_type(&self, surface: NativePtr) -> SurfaceType {
        self.log("cairo_surface_get_type");
        self.with(surface, |s: &SurfaceData| match s.kind {
            SurfaceKind::Image(_) => SurfaceType::Image,
            SurfaceKind::Recording { .. } => SurfaceType::Recording,
            SurfaceKind::Subsurface { .. } => SurfaceType::Subsurface,
        })
        .unwrap_or_default()
    }

    pub fn surface_get_content(&self, surface: NativePtr) -> Content {
        self.log("cairo_surface_get_content");
        self.with(surface, |s: &SurfaceData| s.content).unwrap_or_default()
    }

    pub fn image_surface_get_format(&self, surface: NativePtr) -> Result<Format, Status> {
        self.log("cairo_image_surface_get_format");
        self.image_query(surface, |image| image.format)
    }

    pub fn image_surface_get_width(&self, surface: NativePtr) -> Result<i32, Status> {
        self.log("cairo_image_surface_get_width");
        self.image_query(surface, |image| image.width)
    }

    pub fn image_surface_get_height(&self, surface: NativePtr) -> Result<i32, Status> {
        self.log("cairo_image_surface_get_height");
        self.image_query(surface, |image| image.height)
    }

    pub fn image_surface_get_stride(&self, surface: NativePtr) -> Result<i32, Status> {
        self.log("cairo_image_surface_get_stride");
        self.image_query(surface, |image| image.stride)
    }

    /// Copy of the pixel buffer.
    pub fn image_surface_get_data(&self, surface: NativePtr) -> Result<Vec<u8>, Status> {
        self.log("cairo_image_surface_get_data");
        self.image_query(surface, |image| image.data.clone())
    }

    fn image_query<R>(&self, surface: NativePtr, f: impl FnOnce(&ImageData) -> R) -> Result<R, Status> {
        self.with(surface, |s: &SurfaceData| s.image().map(f))
            .unwrap_or(Err(Status::NullPointer))
    }

    pub fn surface_get_device_offset(&self, surface: NativePtr) -> (f64, f64) {
        self.log("cairo_surface_get_device_offset");
        self.with(surface, |s: &SurfaceData| s.device_offset).unwrap_or_default()
    }

    pub fn surface_set_device_offset(&self, surface: NativePtr, x: f64, y: f64) {
        self.log("cairo_surface_set_device_offset");
        self.with_mut(surface, |s: &mut SurfaceData, _| s.device_offset = (x, y));
    }

    pub fn surface_get_fallback_resolution(&self, surface: NativePtr) -> (f64, f64) {
        self.log("cairo_surface_get_fallback_resolution");
        self.with(surface, |s: &SurfaceData| s.fallback_resolution).unwrap_or_default()
    }

    pub fn surface_set_fallback_resolution(&self, surface: NativePtr, x_ppi: f64, y_ppi: f64) {
        self.log("cairo_surface_set_fallback_resolution");
        self.with_mut(surface, |s: &mut SurfaceData, _| {
            if x_ppi <= 0.0 || y_ppi <= 0.0 {
                s.status.set_sticky(Status::InvalidMatrix);
            } else {
                s.fallback_resolution = (x_ppi, y_ppi);
            }
        });
    }

    /// Font options appropriate for text drawn on the surface.
    pub fn surface_get_font_options(&self, _surface: NativePtr) -> NativePtr {
        self.log("cairo_surface_get_font_options");
        let options = FontOptions {
            hint_metrics: crate::HintMetrics::On,
            ..FontOptions::default()
        };
        self.font_options_from(options)
    }

    pub fn surface_has_show_text_glyphs(&self, _surface: NativePtr) -> bool {
        self.log("cairo_surface_has_show_text_glyphs");
        false
    }

    pub fn surface_copy_page(&self, surface: NativePtr) {
        self.log("cairo_surface_copy_page");
        self.with_mut(surface, |s: &mut SurfaceData, _| s.pages += 1);
    }

    pub fn surface_show_page(&self, surface: NativePtr) {
        self.log("cairo_surface_show_page");
        self.with_mut(surface, |s: &mut SurfaceData, _| {
            s.pages += 1;
            s.ops.clear();
        });
    }

    /// Operations drawn on the surface since the last page break.
    pub fn surface_draw_ops(&self, surface: NativePtr) -> Vec<DrawOp> {
        self.with(surface, |s: &SurfaceData| s.ops.clone()).unwrap_or_default()
    }

    /// Write an image surface as a raw stream, one chunk per row.
    pub fn surface_write_to_stream(
        &self,
        surface: NativePtr,
        write: &mut dyn FnMut(&[u8]) -> Result<(), Status>,
    ) -> Result<(), Status> {
        self.log("cairo_surface_write_to_png_stream");
        // Snapshot first so the writer may call back into the library.
        let image = self
            .with(surface, |s: &SurfaceData| {
                s.status.into_result()?;
                if s.finished {
                    return Err(Status::SurfaceFinished);
                }
                s.image().cloned()
            })
            .unwrap_or(Err(Status::NullPointer))?;

        let mut header = Vec::with_capacity(17);
        header.extend_from_slice(&STREAM_MAGIC);
        header.push(i32::from(image.format) as u8);
        header.extend_from_slice(&(image.width as u32).to_be_bytes());
        header.extend_from_slice(&(image.height as u32).to_be_bytes());
        write(&header)?;

        let row = row_bytes(image.format, image.width);
        for y in 0..image.height as usize {
            let start = y * image.stride as usize;
            write(&image.data[start..start + row])?;
        }
        Ok(())
    }

    pub(crate) fn surface_extents(&self, surface: NativePtr) -> Option<Extents> {
        self.with(surface, SurfaceData::extents).flatten()
    }

    /// Record a drawing operation on `surface`. Sub-surfaces pass the
    /// operation on to their target, clipped and moved into its space.
    pub(crate) fn surface_record(&self, surface: NativePtr, op: DrawOp) -> Result<(), Status> {
        let forward = self
            .with_mut(surface, |s: &mut SurfaceData, _| {
                s.status.into_result()?;
                if s.finished {
                    return Err(Status::SurfaceFinished);
                }
                s.ops.push(op.clone());
                Ok(match s.kind {
                    SurfaceKind::Subsurface { target, rect } => Some((target, rect)),
                    _ => None,
                })
            })
            .unwrap_or(Err(Status::NullPointer))?;

        match forward {
            Some((target, rect)) => {
                let extents = op
                    .extents
                    .map(|e| Extents::new(e.x1 + rect.x1, e.y1 + rect.y1, e.x2 + rect.x1, e.y2 + rect.y1))
                    .map_or(rect, |e| e.intersect(&rect));
                self.surface_record(target, DrawOp { extents: Some(extents), ..op })
            }
            None => Ok(()),
        }
    }
}

fn read_exact(read: &mut dyn FnMut(usize) -> Result<Vec<u8>, Status>, len: usize) -> Result<Vec<u8>, Status> {
    let bytes = read(len)?;
    if bytes.len() != len {
        return Err(Status::ReadError);
    }
    Ok(bytes)
}

fn read_image(read: &mut dyn FnMut(usize) -> Result<Vec<u8>, Status>) -> Result<ImageData, Status> {
    let header = read_exact(read, 17)?;
    if header[..8] != STREAM_MAGIC {
        return Err(Status::ReadError);
    }
    let format = Format::try_from(i32::from(header[8])).map_err(|_| Status::InvalidFormat)?;
    let width = u32::from_be_bytes([header[9], header[10], header[11], header[12]]);
    let height = u32::from_be_bytes([header[13], header[14], header[15], header[16]]);
    let width = i32::try_from(width).map_err(|_| Status::InvalidSize)?;
    let height = i32::try_from(height).map_err(|_| Status::InvalidSize)?;

    let stride = stride_for_width(format, width).ok_or(Status::InvalidSize)?;

    let row = row_bytes(format, width);
    let mut data = vec![0; stride as usize * height as usize];
    for y in 0..height as usize {
        let bytes = read_exact(read, row)?;
        let start = y * stride as usize;
        data[start..start + row].copy_from_slice(&bytes);
    }
    Ok(ImageData {
        format,
        width,
        height,
        stride,
        data,
    })
}

pub(crate) fn ink_extents(ops: &[DrawOp]) -> Option<Extents> {
    ops.iter()
        .filter_map(|op| op.extents)
        .reduce(|a, b| a.union(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_for_width() {
        let cairo = Cairo::new();
        assert_eq!(cairo.format_stride_for_width(Format::Argb32, 10), Some(40));
        assert_eq!(cairo.format_stride_for_width(Format::A8, 5), Some(8));
        assert_eq!(cairo.format_stride_for_width(Format::A1, 33), Some(8));
        assert_eq!(cairo.format_stride_for_width(Format::A8, -1), None);
        assert_eq!(cairo.format_stride_for_width(Format::Argb32, i32::MAX), None);
    }

    #[test]
    fn test_image_surface_queries() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::Rgb24, 3, 2);
        assert_eq!(cairo.status(surface), Status::Success);
        assert_eq!(cairo.image_surface_get_width(surface), Ok(3));
        assert_eq!(cairo.image_surface_get_stride(surface), Ok(12));
        assert_eq!(cairo.surface_get_content(surface), Content::Color);
        assert_eq!(cairo.image_surface_get_data(surface).unwrap().len(), 24);
    }

    #[test]
    fn test_negative_size_is_error_surface() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::A8, -1, 4);
        assert_eq!(cairo.status(surface), Status::InvalidSize);
    }

    #[test]
    fn test_recording_surface_rejects_image_queries() {
        let cairo = Cairo::new();
        let surface = cairo.recording_surface_create(Content::ColorAlpha, None);
        assert_eq!(cairo.image_surface_get_width(surface), Err(Status::SurfaceTypeMismatch));
        assert_eq!(cairo.recording_surface_ink_extents(surface), Ok((0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_subsurface_draws_into_target() {
        let cairo = Cairo::new();
        let target = cairo.image_surface_create(Format::Argb32, 100, 100);
        let sub = cairo.surface_create_for_rectangle(target, 10.0, 20.0, 30.0, 40.0);
        assert_eq!(cairo.status(sub), Status::Success);
        assert_eq!(cairo.surface_get_type(sub), SurfaceType::Subsurface);
        assert_eq!(cairo.reference_count(target), 2);

        let cr = cairo.create(sub);
        cairo.paint(cr);
        let ops = cairo.surface_draw_ops(target);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].extents, Some(Extents::new(10.0, 20.0, 40.0, 60.0)));

        cairo.destroy(cr);
        cairo.destroy(sub);
        assert_eq!(cairo.reference_count(target), 1);
    }

    #[test]
    fn test_subsurface_of_finished_target() {
        let cairo = Cairo::new();
        let target = cairo.image_surface_create(Format::A8, 8, 8);
        let sub = cairo.surface_create_for_rectangle(target, 0.0, 0.0, -1.0, 4.0);
        assert_eq!(cairo.status(sub), Status::InvalidSize);
        cairo.surface_finish(target);
        let sub = cairo.surface_create_for_rectangle(target, 0.0, 0.0, 4.0, 4.0);
        assert_eq!(cairo.status(sub), Status::SurfaceFinished);
        assert_eq!(cairo.image_surface_get_width(sub), Err(Status::SurfaceTypeMismatch));
    }

    #[test]
    fn test_stream_round_trip() {
        let cairo = Cairo::new();
        let pixels: Vec<u8> = (0..16).collect();
        let surface = cairo.image_surface_create_for_data(pixels.clone(), Format::A8, 3, 4, 4);

        let mut out = Vec::new();
        let mut chunks = 0;
        cairo
            .surface_write_to_stream(surface, &mut |chunk| {
                chunks += 1;
                out.extend_from_slice(chunk);
                Ok(())
            })
            .unwrap();
        assert_eq!(chunks, 5);

        let mut cursor = 0;
        let copy = cairo.image_surface_create_from_stream(&mut |n| {
            let bytes = out[cursor..(cursor + n).min(out.len())].to_vec();
            cursor += n;
            Ok(bytes)
        });
        assert_eq!(cairo.status(copy), Status::Success);
        let data = cairo.image_surface_get_data(copy).unwrap();
        // Row padding is not carried by the stream.
        for y in 0..4 {
            assert_eq!(data[y * 4..y * 4 + 3], pixels[y * 4..y * 4 + 3]);
        }
    }

    #[test]
    fn test_short_read_is_read_error() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create_from_stream(&mut |_| Ok(vec![0; 3]));
        assert_eq!(cairo.status(surface), Status::ReadError);
    }

    #[test]
    fn test_writer_error_propagates() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::A8, 1, 1);
        let result = cairo.surface_write_to_stream(surface, &mut |_| Err(Status::WriteError));
        assert_eq!(result, Err(Status::WriteError));
    }
}

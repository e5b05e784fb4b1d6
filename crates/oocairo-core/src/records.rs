//! Structured value records.
//!
//! Records cross the boundary by value. Every field is validated before any
//! native call is made, and errors name the field or the 1-based element
//! that failed.

use oocairo_native::{
    ColorStop, FontExtents, Glyph, Matrix, PathSegment, RectangleInt, TextCluster, TextClusterFlags, TextExtents,
};

use crate::convert::number;
use crate::{ConversionError, FromValue, Table, TableKey, Value, tags};

const MATRIX_FIELDS: [&str; 6] = ["xx", "yx", "xy", "yy", "x0", "y0"];

fn table_of<'a>(value: &'a Value, expected: &'static str) -> Result<&'a crate::TableRef, ConversionError> {
    value.as_table().ok_or(ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    })
}

/// Read a named numeric field.
fn number_field(value: &Value, field: &'static str) -> Result<f64, ConversionError> {
    match value.get(field) {
        Value::Nil => Err(ConversionError::MissingField { field }),
        v => number(&v).map_err(|e| ConversionError::field(field, e)),
    }
}

/// Read the `i`th (1-based) numeric element of a fixed-size record.
fn number_at(value: &Value, i: usize, field: &'static str) -> Result<f64, ConversionError> {
    match value.index(i) {
        Value::Nil => Err(ConversionError::MissingField { field }),
        v => number(&v).map_err(|e| ConversionError::field(field, e)),
    }
}

fn non_negative_integer(n: f64, what: &'static str) -> Result<f64, ConversionError> {
    if n < 0.0 {
        return Err(ConversionError::Negative { what });
    }
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(ConversionError::NotAnInteger { value: n });
    }
    Ok(n)
}

/// Convert every array element of `value` with `f`, naming the failing
/// element.
fn elements<T>(
    value: &Value,
    expected: &'static str,
    mut f: impl FnMut(&Value) -> Result<T, ConversionError>,
) -> Result<Vec<T>, ConversionError> {
    let table = table_of(value, expected)?.borrow();
    table
        .array()
        .iter()
        .enumerate()
        .map(|(i, v)| f(v).map_err(|e| ConversionError::element(i + 1, e)))
        .collect()
}

// ============================================================================
// Matrices
// ============================================================================

/// A matrix record: a table of six numbers `xx, yx, xy, yy, x0, y0`.
pub fn matrix_from_value(value: &Value) -> Result<Matrix, ConversionError> {
    table_of(value, "matrix table")?;
    let mut v = [0.0; 6];
    for (i, field) in MATRIX_FIELDS.iter().enumerate() {
        v[i] = number_at(value, i + 1, field)?;
    }
    Ok(Matrix::from_array(v))
}

/// Tagged matrix table.
pub fn matrix_to_value(matrix: &Matrix) -> Value {
    let mut table = Table::with_tag(tags::MATRIX);
    for n in matrix.to_array() {
        table.push(Value::Number(n));
    }
    Value::table(table)
}

/// Overwrite the elements of an existing matrix table in place.
pub fn matrix_store(value: &Value, matrix: &Matrix) -> Result<(), ConversionError> {
    let table = table_of(value, "matrix table")?;
    let mut table = table.borrow_mut();
    for (i, n) in matrix.to_array().into_iter().enumerate() {
        table.set(TableKey::from(i + 1), Value::Number(n));
    }
    Ok(())
}

// ============================================================================
// Extents
// ============================================================================

pub fn font_extents_to_value(e: &FontExtents) -> Value {
    let mut t = Table::new();
    t.set_field("ascent", e.ascent);
    t.set_field("descent", e.descent);
    t.set_field("height", e.height);
    t.set_field("max_x_advance", e.max_x_advance);
    t.set_field("max_y_advance", e.max_y_advance);
    Value::table(t)
}

pub fn font_extents_from_value(value: &Value) -> Result<FontExtents, ConversionError> {
    table_of(value, "font extents table")?;
    Ok(FontExtents {
        ascent: number_field(value, "ascent")?,
        descent: number_field(value, "descent")?,
        height: number_field(value, "height")?,
        max_x_advance: number_field(value, "max_x_advance")?,
        max_y_advance: number_field(value, "max_y_advance")?,
    })
}

pub fn text_extents_to_value(e: &TextExtents) -> Value {
    let mut t = Table::new();
    t.set_field("x_bearing", e.x_bearing);
    t.set_field("y_bearing", e.y_bearing);
    t.set_field("width", e.width);
    t.set_field("height", e.height);
    t.set_field("x_advance", e.x_advance);
    t.set_field("y_advance", e.y_advance);
    Value::table(t)
}

pub fn text_extents_from_value(value: &Value) -> Result<TextExtents, ConversionError> {
    table_of(value, "text extents table")?;
    Ok(TextExtents {
        x_bearing: number_field(value, "x_bearing")?,
        y_bearing: number_field(value, "y_bearing")?,
        width: number_field(value, "width")?,
        height: number_field(value, "height")?,
        x_advance: number_field(value, "x_advance")?,
        y_advance: number_field(value, "y_advance")?,
    })
}

// ============================================================================
// Glyphs and clusters
// ============================================================================

fn glyph_from_value(value: &Value) -> Result<Glyph, ConversionError> {
    table_of(value, "glyph table")?;
    if value.len() != 3 {
        return Err(ConversionError::invalid("glyph should contain exactly 3 numbers"));
    }
    let index = non_negative_integer(number_at(value, 1, "index")?, "glyph index")?;
    Ok(Glyph {
        index: index as u64,
        x: number_at(value, 2, "x")?,
        y: number_at(value, 3, "y")?,
    })
}

/// A glyph array: a table of `{index, x, y}` tables.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn glyphs_from_value(value: &Value) -> Result<Vec<Glyph>, ConversionError> {
    elements(value, "glyph array", glyph_from_value)
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub fn glyphs_to_value(glyphs: &[Glyph]) -> Value {
    Value::list(
        glyphs
            .iter()
            .map(|g| Value::numbers([g.index as f64, g.x, g.y])),
    )
}

fn cluster_from_value(value: &Value) -> Result<TextCluster, ConversionError> {
    table_of(value, "text cluster table")?;
    if value.len() != 2 {
        return Err(ConversionError::invalid("text cluster should contain exactly 2 numbers"));
    }
    let count = |i: usize, field: &'static str, what: &'static str| -> Result<i32, ConversionError> {
        let n = non_negative_integer(number_at(value, i, field)?, what)?;
        i32::from_value(&Value::Number(n)).map_err(|e| ConversionError::field(field, e))
    };
    Ok(TextCluster {
        num_bytes: count(1, "num_bytes", "number of bytes")?,
        num_glyphs: count(2, "num_glyphs", "number of glyphs")?,
    })
}

/// A cluster table: `{num_bytes, num_glyphs}` elements plus an optional
/// `backward` flag field.
pub fn clusters_from_value(value: &Value) -> Result<(Vec<TextCluster>, TextClusterFlags), ConversionError> {
    let clusters = elements(value, "text cluster table", cluster_from_value)?;
    let flags = if value.get("backward").truthy() {
        TextClusterFlags::BACKWARD
    } else {
        TextClusterFlags::empty()
    };
    Ok((clusters, flags))
}

pub fn clusters_to_value(clusters: &[TextCluster], flags: TextClusterFlags) -> Value {
    let mut t = Table::from_values(
        clusters
            .iter()
            .map(|c| Value::numbers([f64::from(c.num_bytes), f64::from(c.num_glyphs)])),
    );
    t.set_field("backward", flags.contains(TextClusterFlags::BACKWARD));
    Value::table(t)
}

// ============================================================================
// Rectangles
// ============================================================================

fn int_field(value: &Value, field: &'static str) -> Result<i32, ConversionError> {
    match value.get(field) {
        Value::Nil => Err(ConversionError::MissingField { field }),
        v => i32::from_value(&v).map_err(|e| ConversionError::field(field, e)),
    }
}

/// A rectangle record `{x, y, width, height}` with integer fields.
pub fn rectangle_from_value(value: &Value) -> Result<RectangleInt, ConversionError> {
    table_of(value, "rectangle table")?;
    let rect = RectangleInt {
        x: int_field(value, "x")?,
        y: int_field(value, "y")?,
        width: int_field(value, "width")?,
        height: int_field(value, "height")?,
    };
    if rect.width < 0 {
        return Err(ConversionError::field("width", ConversionError::Negative { what: "width" }));
    }
    if rect.height < 0 {
        return Err(ConversionError::field("height", ConversionError::Negative { what: "height" }));
    }
    Ok(rect)
}

pub fn rectangle_to_value(rect: &RectangleInt) -> Value {
    let mut t = Table::new();
    t.set_field("x", rect.x);
    t.set_field("y", rect.y);
    t.set_field("width", rect.width);
    t.set_field("height", rect.height);
    Value::table(t)
}

pub fn rectangles_from_value(value: &Value) -> Result<Vec<RectangleInt>, ConversionError> {
    elements(value, "rectangle list", rectangle_from_value)
}

pub fn rectangles_to_value(rects: &[RectangleInt]) -> Value {
    Value::list(rects.iter().map(rectangle_to_value))
}

// ============================================================================
// Dashes, color stops and path segments
// ============================================================================

/// A dash array: non-negative lengths, not all zero. An empty array turns
/// dashing off.
pub fn dashes_from_value(value: &Value) -> Result<Vec<f64>, ConversionError> {
    let dashes = elements(value, "dash array", |v| {
        let n = number(v)?;
        if n < 0.0 {
            return Err(ConversionError::Negative { what: "dash length" });
        }
        Ok(n)
    })?;
    if !dashes.is_empty() && dashes.iter().all(|d| *d == 0.0) {
        return Err(ConversionError::invalid("dash lengths must not all be zero"));
    }
    Ok(dashes)
}

/// `{offset, r, g, b, a}` for each stop.
pub fn color_stops_to_value(stops: &[ColorStop]) -> Value {
    Value::list(stops.iter().map(|s| {
        let c = s.color;
        Value::numbers([s.offset, c.red, c.green, c.blue, c.alpha])
    }))
}

/// Points of a path segment as a flat coordinate table, `nil` for
/// close-path.
pub fn segment_points_to_value(segment: &PathSegment) -> Value {
    match segment {
        PathSegment::ClosePath => Value::Nil,
        other => Value::numbers(other.points().into_iter().flat_map(|(x, y)| [x, y])),
    }
}

//! Integration tests driving the bindings through the public `Runtime` API.
//!
//! Every call goes through the same path a host script would take: module
//! functions by name, methods on handles, results as host values. The
//! native call log of the stand-in library is used to check which native
//! functions actually ran.

use oocairo::Runtime;
use oocairo_core::{BindingError, Table, Value, tags};
use oocairo_native::Status;
use std::rc::Rc;

fn call(rt: &Runtime, name: &str, args: &[Value]) -> Value {
    rt.call(name, args)
        .unwrap_or_else(|e| panic!("{name} failed: {e}"))
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn method(rt: &Runtime, receiver: &Value, name: &str, args: &[Value]) -> Vec<Value> {
    rt.call_method(receiver, name, args)
        .unwrap_or_else(|e| panic!("{name} failed: {e}"))
}

fn image(rt: &Runtime, width: i32, height: i32) -> Value {
    call(rt, "image_surface_create", &["argb32".into(), width.into(), height.into()])
}

fn setup() -> (Rc<Runtime>, Value, Value) {
    let rt = Runtime::new();
    let surface = image(&rt, 10, 10);
    let cr = call(&rt, "context_create", &[surface.clone()]);
    (rt, surface, cr)
}

fn rect(x: i32, y: i32, width: i32, height: i32) -> Value {
    let mut t = Table::new();
    t.set_field("x", x);
    t.set_field("y", y);
    t.set_field("width", width);
    t.set_field("height", height);
    Value::table(t)
}

// =============================================================================
// Basic drawing
// =============================================================================

#[test]
fn test_smoke() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "set_source_rgb", &[0.into(), 0.into(), 0.into()]);
    method(&rt, &cr, "rectangle", &[1.into(), 1.into(), 5.into(), 5.into()]);
    method(&rt, &cr, "fill", &[]);
    assert!(method(&rt, &cr, "status", &[]).is_empty());
    assert!(rt.cairo().was_called("cairo_set_source_rgb"));
    assert!(rt.cairo().was_called("cairo_fill"));
}

#[test]
fn test_module_function_type_checks() {
    let rt = Runtime::new();
    let err = rt.call("context_create", &[Value::Number(1.0)]).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(err.position(), Some(1));
    assert!(err.to_string().contains("cairo surface object expected, got number"));

    let err = rt
        .call("image_surface_create", &["argb32".into(), (-1).into(), 1.into()])
        .unwrap_err();
    assert_eq!(err.position(), Some(2));
    assert!(!rt.cairo().was_called("cairo_image_surface_create"));
}

// =============================================================================
// Enums
// =============================================================================

fn state_round_trip(rt: &Runtime, receiver: &Value, setter: &str, getter: &str, names: &[&str]) {
    for name in names {
        method(rt, receiver, setter, &[Value::string(name)]);
        let got = method(rt, receiver, getter, &[]);
        assert_eq!(got, vec![Value::string(name)], "{getter}");
    }
}

#[test]
fn test_enum_state_round_trips() {
    let (rt, _surface, cr) = setup();
    state_round_trip(&rt, &cr, "set_antialias", "get_antialias", &["default", "none", "gray", "subpixel"]);
    state_round_trip(&rt, &cr, "set_fill_rule", "get_fill_rule", &["winding", "even-odd"]);
    state_round_trip(&rt, &cr, "set_line_cap", "get_line_cap", &["butt", "round", "square"]);
    state_round_trip(&rt, &cr, "set_line_join", "get_line_join", &["miter", "round", "bevel"]);
    state_round_trip(
        &rt,
        &cr,
        "set_operator",
        "get_operator",
        &[
            "clear", "source", "over", "in", "out", "atop", "dest", "dest-over", "dest-in", "dest-out", "dest-atop",
            "xor", "add", "saturate",
        ],
    );

    let options = call(&rt, "font_options_create", &[]);
    state_round_trip(&rt, &options, "set_subpixel_order", "get_subpixel_order", &[
        "default", "rgb", "bgr", "vrgb", "vbgr",
    ]);
    state_round_trip(&rt, &options, "set_hint_style", "get_hint_style", &[
        "default", "none", "slight", "medium", "full",
    ]);
    state_round_trip(&rt, &options, "set_hint_metrics", "get_hint_metrics", &["default", "off", "on"]);

    let pattern = call(&rt, "pattern_create_linear", &[0.into(), 0.into(), 1.into(), 1.into()]);
    state_round_trip(&rt, &pattern, "set_extend", "get_extend", &["none", "repeat", "reflect", "pad"]);
    state_round_trip(&rt, &pattern, "set_filter", "get_filter", &[
        "fast", "good", "best", "nearest", "bilinear", "gaussian",
    ]);
}

#[test]
fn test_antialias_accepts_booleans() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "set_antialias", &[false.into()]);
    assert_eq!(method(&rt, &cr, "get_antialias", &[]), vec![Value::string("none")]);
}

#[test]
fn test_invalid_antialias_name() {
    let rt = Runtime::new();
    let options = call(&rt, "font_options_create", &[]);
    rt.cairo().clear_calls();

    let err = rt
        .call_method(&options, "set_antialias", &[Value::string("bogus")])
        .unwrap_err();
    assert!(err.is_argument());
    assert_eq!(err.position(), Some(2));
    assert!(err.to_string().contains("antialias"));
    assert!(!rt.cairo().was_called("cairo_font_options_set_antialias"));
}

// =============================================================================
// Matrices
// =============================================================================

#[test]
fn test_matrix_round_trip() {
    let (rt, _surface, cr) = setup();
    let matrix = Value::numbers([2.0, 0.5, -0.25, 3.0, 7.0, -9.0]);
    method(&rt, &cr, "set_matrix", &[matrix.clone()]);
    let got = method(&rt, &cr, "get_matrix", &[]).remove(0);

    assert_eq!(got.table_tag(), Some(tags::MATRIX));
    for i in 1..=6 {
        assert_eq!(got.index(i), matrix.index(i), "element {i}");
    }
}

#[test]
fn test_matrix_methods_update_receiver() {
    let rt = Runtime::new();
    let m = call(&rt, "matrix_create", &[]);
    method(&rt, &m, "translate", &[3.into(), 4.into()]);
    method(&rt, &m, "scale", &[2.into(), 2.into()]);
    assert_eq!(m.index(5), Value::Number(3.0));
    assert_eq!(m.index(1), Value::Number(2.0));

    let point = method(&rt, &m, "transform_point", &[1.into(), 1.into()]);
    assert_eq!(point, vec![Value::Number(5.0), Value::Number(6.0)]);

    method(&rt, &m, "invert", &[]);
    let point = method(&rt, &m, "transform_point", &[5.into(), 6.into()]);
    assert_eq!(point, vec![Value::Number(1.0), Value::Number(1.0)]);
}

#[test]
fn test_singular_matrix_does_not_invert() {
    let rt = Runtime::new();
    let m = call(&rt, "matrix_create", &[]);
    method(&rt, &m, "scale", &[0.into(), 0.into()]);
    let err = rt.call_method(&m, "invert", &[]).unwrap_err();
    assert_eq!(err.status(), Some(Status::InvalidMatrix));

    // Untagged tables are not matrices as far as method lookup goes.
    let plain = Value::numbers([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert!(matches!(
        rt.call_method(&plain, "invert", &[]),
        Err(BindingError::UnknownMethod { .. })
    ));
}

#[test]
fn test_short_matrix_table() {
    let (rt, _surface, cr) = setup();
    let err = rt
        .call_method(&cr, "set_matrix", &[Value::numbers([1.0, 0.0, 0.0])])
        .unwrap_err();
    assert!(err.is_argument());
    assert_eq!(err.position(), Some(2));
    assert!(!rt.cairo().was_called("cairo_set_matrix"));
}

// =============================================================================
// Lifetimes
// =============================================================================

#[test]
fn test_finalize_twice() {
    let (rt, _surface, cr) = setup();
    assert!(rt.finalize(&cr));
    assert!(!rt.finalize(&cr));
    assert_eq!(rt.cairo().call_count("cairo_destroy"), 1);

    let err = rt.call_method(&cr, "save", &[]).unwrap_err();
    assert!(err.is_use_after_free());
    assert_eq!(err.position(), Some(1));
}

#[test]
fn test_aliasing_handles_release_independently() {
    let (rt, surface, cr) = setup();
    let target = method(&rt, &cr, "get_target", &[]).remove(0);
    assert_ne!(target, surface);

    rt.finalize(&surface);
    assert_eq!(method(&rt, &target, "get_width", &[]), vec![Value::Number(10.0)]);

    rt.finalize(&target);
    method(&rt, &cr, "paint", &[]);
    assert!(method(&rt, &cr, "status", &[]).is_empty());

    rt.finalize(&cr);
    assert_eq!(rt.cairo().live_objects(), 0);
}

#[test]
fn test_runtime_drop_releases_everything() {
    let (rt, _surface, cr) = setup();
    let _source = method(&rt, &cr, "get_source", &[]);
    let _path = method(&rt, &cr, "copy_path", &[]);
    assert!(rt.handle_count() >= 4);
    drop(rt);
}

// =============================================================================
// Dashes
// =============================================================================

#[test]
fn test_negative_dash_is_rejected_before_native_call() {
    let (rt, _surface, cr) = setup();
    let err = rt
        .call_method(&cr, "set_dash", &[Value::numbers([1.0, -2.0]), 0.into()])
        .unwrap_err();
    assert!(err.is_argument());
    assert_eq!(err.position(), Some(2));
    assert!(err.to_string().contains("element 2"));
    assert!(!rt.cairo().was_called("cairo_set_dash"));
}

#[test]
fn test_all_zero_dash_is_rejected() {
    let (rt, _surface, cr) = setup();
    let err = rt
        .call_method(&cr, "set_dash", &[Value::numbers([0.0, 0.0]), 0.into()])
        .unwrap_err();
    assert!(matches!(err, BindingError::Argument { position: 2, .. }));
    assert!(!rt.cairo().was_called("cairo_set_dash"));
}

#[test]
fn test_dash_round_trip() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "set_dash", &[Value::numbers([4.0, 2.0]), 1.5.into()]);
    let got = method(&rt, &cr, "get_dash", &[]);
    assert_eq!(got[0].len(), 2);
    assert_eq!(got[0].index(1), Value::Number(4.0));
    assert_eq!(got[1], Value::Number(1.5));
}

// =============================================================================
// Sources
// =============================================================================

#[test]
fn test_source_from_pattern() {
    let (rt, _surface, cr) = setup();
    let pattern = call(&rt, "pattern_create_rgb", &[1.into(), 0.into(), 0.into()]);
    rt.cairo().clear_calls();

    method(&rt, &cr, "set_source", &[pattern.clone()]);
    method(&rt, &cr, "mask", &[pattern]);
    assert!(rt.cairo().was_called("cairo_set_source"));
    assert!(rt.cairo().was_called("cairo_mask"));
    assert!(!rt.cairo().was_called("cairo_set_source_surface"));
    assert!(!rt.cairo().was_called("cairo_mask_surface"));
}

#[test]
fn test_source_from_surface() {
    let (rt, _surface, cr) = setup();
    let other = image(&rt, 2, 2);
    rt.cairo().clear_calls();

    method(&rt, &cr, "set_source", &[other.clone(), 1.into(), 2.into()]);
    method(&rt, &cr, "mask", &[other]);
    assert!(rt.cairo().was_called("cairo_set_source_surface"));
    assert!(rt.cairo().was_called("cairo_mask_surface"));
    assert!(!rt.cairo().was_called("cairo_set_source"));
    assert!(!rt.cairo().was_called("cairo_mask"));

    let source = method(&rt, &cr, "get_source", &[]).remove(0);
    assert_eq!(method(&rt, &source, "get_type", &[]), vec![Value::string("surface")]);
}

#[test]
fn test_source_rejects_other_handles() {
    let (rt, _surface, cr) = setup();
    let region = call(&rt, "region_create", &[]);
    let err = rt.call_method(&cr, "set_source", &[region]).unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(err.to_string().contains("cairo pattern or surface object expected"));
}

#[test]
fn test_gdk_color() {
    let (rt, _surface, cr) = setup();
    let mut color = Table::new();
    color.set_field("red", 65535);
    color.set_field("green", 0);
    color.set_field("blue", 0);
    method(&rt, &cr, "set_source_gdk_color", &[Value::table(color)]);
    let source = method(&rt, &cr, "get_source", &[]).remove(0);
    let rgba = method(&rt, &source, "get_rgba", &[]);
    assert_eq!(rgba, vec![Value::Number(1.0), Value::Number(0.0), Value::Number(0.0), Value::Number(1.0)]);

    let err = rt
        .call_method(&cr, "set_source_gdk_color", &[Value::table(Table::new())])
        .unwrap_err();
    assert!(err.to_string().contains("missing field 'red'"));
}

#[test]
fn test_gradient_color_stops() {
    let rt = Runtime::new();
    let pattern = call(&rt, "pattern_create_linear", &[0.into(), 0.into(), 10.into(), 0.into()]);
    method(&rt, &pattern, "add_color_stop_rgb", &[0.into(), 1.into(), 0.into(), 0.into()]);
    method(&rt, &pattern, "add_color_stop_rgba", &[1.into(), 0.into(), 0.into(), 1.into(), 0.5.into()]);

    let stops = method(&rt, &pattern, "get_color_stops", &[]).remove(0);
    assert_eq!(stops.len(), 2);
    assert_eq!(stops.index(2).index(5), Value::Number(0.5));
    let points = method(&rt, &pattern, "get_linear_points", &[]);
    assert_eq!(points[2], Value::Number(10.0));

    let err = rt.call_method(&pattern, "get_rgba", &[]).unwrap_err();
    assert_eq!(err.status(), Some(Status::PatternTypeMismatch));
}

// =============================================================================
// Font options
// =============================================================================

#[test]
fn test_font_options_equality_and_merge() {
    let rt = Runtime::new();
    let a = call(&rt, "font_options_create", &[]);
    let b = call(&rt, "font_options_create", &[]);
    assert_eq!(method(&rt, &a, "__eq", &[b.clone()]), vec![Value::Bool(true)]);

    method(&rt, &b, "set_hint_style", &[Value::string("full")]);
    assert_eq!(method(&rt, &a, "__eq", &[b.clone()]), vec![Value::Bool(false)]);
    method(&rt, &a, "merge", &[b.clone()]);
    assert_eq!(method(&rt, &a, "get_hint_style", &[]), vec![Value::string("full")]);
    assert_eq!(method(&rt, &a, "hash", &[]), method(&rt, &b, "hash", &[]));

    let copy = method(&rt, &a, "copy", &[]).remove(0);
    assert_ne!(copy, a);
    assert_eq!(method(&rt, &copy, "__eq", &[a]), vec![Value::Bool(true)]);
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn test_path_iteration() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "move_to", &[1.into(), 2.into()]);
    method(&rt, &cr, "line_to", &[3.into(), 4.into()]);
    let path = method(&rt, &cr, "copy_path", &[]).remove(0);

    let returns = method(&rt, &path, "each", &[]);
    let (iter, state) = (&returns[0], &returns[1]);
    assert_eq!(state, &path);

    let first = rt.call_function(iter, &[path.clone(), Value::Nil]).unwrap();
    assert_eq!(first[0], Value::Number(1.0));
    assert_eq!(first[1], Value::string("move-to"));
    assert_eq!(first[2].index(2), Value::Number(2.0));

    let second = rt.call_function(iter, &[path.clone(), first[0].clone()]).unwrap();
    assert_eq!(second[1], Value::string("line-to"));

    let end = rt.call_function(iter, &[path.clone(), second[0].clone()]).unwrap();
    assert!(end.is_empty());

    let segments = method(&rt, &path, "segments", &[]).remove(0);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments.index(2).get("kind"), Value::string("line-to"));
}

#[test]
fn test_path_iterator_is_shared() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "move_to", &[1.into(), 2.into()]);
    let path = method(&rt, &cr, "copy_path", &[]).remove(0);
    let other = method(&rt, &cr, "copy_path", &[]).remove(0);

    let iter = method(&rt, &path, "each", &[]).remove(0);
    assert_eq!(method(&rt, &path, "each", &[]).remove(0), iter);
    assert_eq!(method(&rt, &other, "each", &[]).remove(0), iter);

    rt.finalize(&iter);
    let fresh = method(&rt, &path, "each", &[]).remove(0);
    assert!(rt.is_live(&fresh));
    assert_eq!(rt.call_function(&fresh, &[path, Value::Nil]).unwrap()[1], Value::string("move-to"));
}

#[test]
fn test_arc_with_huge_angles() {
    let (rt, _surface, cr) = setup();
    method(&rt, &cr, "arc", &[0.into(), 0.into(), 1.into(), 0.into(), 1e12.into()]);
    method(&rt, &cr, "arc_negative", &[0.into(), 0.into(), 1.into(), 0.into(), (-1e12).into()]);
    assert!(method(&rt, &cr, "status", &[]).is_empty());
    assert_eq!(method(&rt, &cr, "has_current_point", &[]), vec![Value::Bool(true)]);

    method(&rt, &cr, "arc", &[0.into(), 0.into(), 1.into(), 0.into(), f64::INFINITY.into()]);
    assert_eq!(
        method(&rt, &cr, "status", &[]),
        vec![Value::string(Status::InvalidPathData.message())]
    );
}

#[test]
fn test_append_path_and_current_point() {
    let (rt, _surface, cr) = setup();
    assert!(method(&rt, &cr, "get_current_point", &[]).is_empty());
    method(&rt, &cr, "move_to", &[1.into(), 2.into()]);
    let path = method(&rt, &cr, "copy_path", &[]).remove(0);
    method(&rt, &cr, "new_path", &[]);
    method(&rt, &cr, "append_path", &[path]);
    assert_eq!(
        method(&rt, &cr, "get_current_point", &[]),
        vec![Value::Number(1.0), Value::Number(2.0)]
    );
}

// =============================================================================
// Regions
// =============================================================================

#[test]
fn test_region_from_rectangles() {
    let rt = Runtime::new();
    let rects = Value::list([rect(0, 0, 10, 10), rect(20, 0, 10, 10), rect(0, 20, 10, 10)]);
    let region = call(&rt, "region_create_rectangles", &[rects.clone()]);

    assert_eq!(method(&rt, &region, "num_rectangles", &[]), vec![Value::Number(3.0)]);
    let got = method(&rt, &region, "get_rectangles", &[]).remove(0);
    assert_eq!(got.len(), 3);
    for i in 1..=3 {
        for field in ["x", "y", "width", "height"] {
            assert_eq!(got.index(i).get(field), rects.index(i).get(field), "rect {i} {field}");
        }
    }

    let again = method(&rt, &region, "get_rectangles", &[]).remove(0);
    for i in 1..=3 {
        assert_eq!(again.index(i).get("x"), got.index(i).get("x"));
    }
}

#[test]
fn test_region_set_operations() {
    let rt = Runtime::new();
    let a = call(&rt, "region_create_rectangle", &[rect(0, 0, 10, 10)]);
    let b = call(&rt, "region_create_rectangle", &[rect(5, 0, 10, 10)]);
    assert!(method(&rt, &a, "union", &[b.clone()]).is_empty());
    assert_eq!(method(&rt, &a, "num_rectangles", &[]), vec![Value::Number(1.0)]);
    let extents = method(&rt, &a, "get_extents", &[]).remove(0);
    assert_eq!(extents.get("width"), Value::Number(15.0));

    assert!(method(&rt, &a, "subtract_rectangle", &[rect(0, 0, 15, 5)]).is_empty());
    assert_eq!(method(&rt, &a, "contains_point", &[1.into(), 1.into()]), vec![Value::Bool(false)]);
    assert_eq!(method(&rt, &a, "contains_point", &[1.into(), 7.into()]), vec![Value::Bool(true)]);
    assert_eq!(
        method(&rt, &a, "contains_rectangle", &[rect(0, 0, 20, 20)]),
        vec![Value::string("part")]
    );

    let copy = method(&rt, &a, "copy", &[]).remove(0);
    assert_eq!(method(&rt, &copy, "__eq", &[a.clone()]), vec![Value::Bool(true)]);
    method(&rt, &copy, "translate", &[1.into(), 0.into()]);
    assert_eq!(method(&rt, &copy, "__eq", &[a]), vec![Value::Bool(false)]);
}

#[test]
fn test_region_rejects_negative_width() {
    let rt = Runtime::new();
    let err = rt.call("region_create_rectangle", &[rect(0, 0, -1, 1)]).unwrap_err();
    assert!(err.is_argument());
    assert!(err.to_string().contains("width must not be negative"));
}

// =============================================================================
// Surfaces
// =============================================================================

#[test]
fn test_image_surface_queries() {
    let rt = Runtime::new();
    let surface = image(&rt, 3, 2);
    assert_eq!(method(&rt, &surface, "get_type", &[]), vec![Value::string("image")]);
    assert_eq!(method(&rt, &surface, "get_format", &[]), vec![Value::string("argb32")]);
    assert_eq!(method(&rt, &surface, "get_height", &[]), vec![Value::Number(2.0)]);
    assert_eq!(method(&rt, &surface, "get_stride", &[]), vec![Value::Number(12.0)]);

    let data = method(&rt, &surface, "get_data", &[]);
    assert_eq!(data[0].as_bytes().map(<[u8]>::len), Some(24));
    assert_eq!(data[1], Value::Number(12.0));
}

#[test]
fn test_create_from_data_checks_sizes() {
    let rt = Runtime::new();
    let args = |data: &[u8], stride: i32| {
        [Value::bytes(data), "a8".into(), 4.into(), 2.into(), stride.into()]
    };
    let err = rt.call("image_surface_create_from_data", &args(&[0; 8], 2)).unwrap_err();
    assert_eq!(err.position(), Some(5));
    let err = rt.call("image_surface_create_from_data", &args(&[0; 6], 4)).unwrap_err();
    assert_eq!(err.position(), Some(1));

    let surface = call(&rt, "image_surface_create_from_data", &args(&[7; 8], 4));
    let data = method(&rt, &surface, "get_data", &[]);
    assert_eq!(data[0].as_bytes(), Some(&[7u8; 8][..]));
}

#[test]
fn test_similar_surface() {
    let rt = Runtime::new();
    let surface = image(&rt, 4, 4);
    let similar = call(&rt, "surface_create_similar", &[surface.clone(), "alpha".into(), 2.into(), 3.into()]);
    assert_eq!(method(&rt, &similar, "get_content", &[]), vec![Value::string("alpha")]);
    let via_method = method(&rt, &surface, "create_similar", &["color".into(), 1.into(), 1.into()]);
    assert_eq!(via_method.len(), 1);
}

#[test]
fn test_create_for_rectangle() {
    let rt = Runtime::new();
    let surface = image(&rt, 20, 20);
    let args = |w: f64, h: f64| -> [Value; 4] { [2.into(), 3.into(), w.into(), h.into()] };

    let sub = method(&rt, &surface, "create_for_rectangle", &args(5.0, 6.0)).remove(0);
    assert_eq!(method(&rt, &sub, "get_type", &[]), vec![Value::string("subsurface")]);
    assert!(method(&rt, &sub, "status", &[]).is_empty());

    // Finalizing the parent handle leaves the sub-surface usable.
    rt.finalize(&surface);
    let cr = call(&rt, "context_create", &[sub.clone()]);
    method(&rt, &cr, "paint", &[]);
    assert!(method(&rt, &cr, "status", &[]).is_empty());

    let parent = image(&rt, 20, 20);
    rt.cairo().clear_calls();
    let err = rt
        .call_method(&parent, "create_for_rectangle", &args(-1.0, 6.0))
        .unwrap_err();
    assert_eq!(err.position(), Some(4));
    assert!(err.to_string().contains("surface width"));
    let err = rt
        .call_method(&parent, "create_for_rectangle", &args(1.0, -6.0))
        .unwrap_err();
    assert_eq!(err.position(), Some(5));
    assert!(!rt.cairo().was_called("cairo_surface_create_for_rectangle"));
}

#[test]
fn test_recording_surface() {
    let rt = Runtime::new();
    let surface = call(&rt, "recording_surface_create", &["color-alpha".into()]);
    let cr = call(&rt, "context_create", &[surface.clone()]);
    method(&rt, &cr, "rectangle", &[1.into(), 2.into(), 3.into(), 4.into()]);
    method(&rt, &cr, "fill", &[]);
    let extents = rt.call("recording_surface_ink_extents", &[surface.clone()]).unwrap();
    assert_eq!(extents, [1.0, 2.0, 3.0, 4.0].map(Value::Number).to_vec());

    let err = rt.call_method(&surface, "get_width", &[]).unwrap_err();
    assert_eq!(err.status(), Some(Status::SurfaceTypeMismatch));
}

// =============================================================================
// Module table
// =============================================================================

#[test]
fn test_version_functions() {
    let rt = Runtime::new();
    let version = |name: &str, minor: i32| rt.call(name, &[1.into(), minor.into(), 0.into()]).unwrap();
    assert_eq!(version("check_version", 18), vec![Value::Bool(true)]);
    assert_eq!(version("check_version", 20), vec![Value::Bool(false)]);
    assert_eq!(version("check_runtime_version", 2), vec![Value::Bool(true)]);
    assert_eq!(
        rt.call("format_stride_for_width", &["argb32".into(), 3.into()]).unwrap(),
        vec![Value::Number(12.0)]
    );
    let info = rt.module_info().to_value();
    assert_eq!(info.get("_CAIRO_VERSION"), Value::string("1.18.0"));
    assert_eq!(info.get("HAS_USER_FONT"), Value::Bool(true));
}

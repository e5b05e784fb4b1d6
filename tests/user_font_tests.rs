//! User font faces: host callbacks driven by native text operations.

use std::cell::Cell;
use std::rc::Rc;

use oocairo::Runtime;
use oocairo_core::{BindingError, Table, Value};
use oocairo_native::Status;

fn options(entries: &[(&str, Value)]) -> Value {
    let mut t = Table::new();
    for (name, value) in entries {
        t.set_field(name, value.clone());
    }
    Value::table(t)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn first(returns: Vec<Value>) -> Value {
    returns.into_iter().next().unwrap_or_default()
}

/// A `render_glyph` that counts its calls and draws a unit square through
/// the binding on the context it is handed.
fn counting_renderer(rt: &Runtime, count: Rc<Cell<u32>>) -> Value {
    rt.function(move |rt, args| {
        count.set(count.get() + 1);
        let cr = args.get(2).cloned().unwrap_or_default();
        rt.call_method(&cr, "rectangle", &[0.into(), (-1).into(), 1.into(), 1.into()])?;
        rt.call_method(&cr, "fill", &[])?;
        Ok(Vec::new())
    })
}

fn drawing_context(rt: &Runtime) -> Value {
    let surface = first(rt.call("image_surface_create", &["argb32".into(), 50.into(), 50.into()]).unwrap());
    first(rt.call("context_create", &[surface]).unwrap())
}

#[test]
fn test_render_glyph_alone_is_enough() {
    let rt = Runtime::new();
    let render = rt.function(|_, _| Ok(Vec::new()));
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render)])]).unwrap());
    assert_eq!(rt.call_method(&face, "get_type", &[]).unwrap(), vec![Value::string("user")]);
    assert_eq!(rt.callback_count(), 1);
}

#[test]
fn test_missing_render_glyph() {
    let rt = Runtime::new();
    let init = rt.function(|_, _| Ok(Vec::new()));
    let err = rt
        .call("user_font_face_create", &[options(&[("init", init)])])
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(rt.callback_count(), 0);

    let err = rt.call("user_font_face_create", &[Value::Number(1.0)]).unwrap_err();
    assert_eq!(err.position(), Some(1));
}

#[test]
fn test_user_font_requires_feature() {
    let rt = Runtime::with_cairo(oocairo_native::Cairo::with_features(oocairo_native::Features::empty()));
    let render = rt.function(|_, _| Ok(Vec::new()));
    let err = rt
        .call("user_font_face_create", &[options(&[("render_glyph", render)])])
        .unwrap_err();
    assert!(matches!(err, BindingError::UnknownFunction(_)));
}

#[test]
fn test_callbacks_released_once() {
    let rt = Runtime::new();
    let render = rt.function(|_, _| Ok(Vec::new()));
    let unicode = rt.function(|_, _| Ok(vec![Value::Number(1.0)]));
    let opts = options(&[("render_glyph", render.clone()), ("unicode_to_glyph", unicode.clone())]);
    let face = first(rt.call("user_font_face_create", &[opts]).unwrap());
    assert_eq!(rt.ref_count(&render), Some(2));
    assert_eq!(rt.ref_count(&unicode), Some(2));

    assert!(rt.finalize(&face));
    assert_eq!(rt.ref_count(&render), Some(1));
    assert_eq!(rt.ref_count(&unicode), Some(1));
    assert_eq!(rt.callback_count(), 0);

    assert!(!rt.finalize(&face));
    assert_eq!(rt.ref_count(&render), Some(1));
}

#[test]
fn test_callbacks_live_while_a_context_uses_the_face() {
    let rt = Runtime::new();
    let render = rt.function(|_, _| Ok(Vec::new()));
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render.clone())])]).unwrap());
    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face.clone()]).unwrap();

    rt.finalize(&face);
    assert_eq!(rt.callback_count(), 1);
    rt.call_method(&cr, "set_font_face", &[Value::Nil]).unwrap();
    assert_eq!(rt.callback_count(), 0);
    assert_eq!(rt.ref_count(&render), Some(1));
}

#[test]
fn test_render_glyph_reenters_the_binding() {
    let rt = Runtime::new();
    let count = Rc::new(Cell::new(0));
    let render = counting_renderer(&rt, count.clone());
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render)])]).unwrap());

    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face]).unwrap();
    rt.call_method(&cr, "set_font_size", &[10.into()]).unwrap();
    rt.call_method(&cr, "move_to", &[5.into(), 20.into()]).unwrap();
    rt.call_method(&cr, "show_text", &[Value::string("abba")]).unwrap();

    // Each distinct glyph is rendered once.
    assert_eq!(count.get(), 2);
    assert!(rt.call_method(&cr, "status", &[]).unwrap().is_empty());

    let extents = first(rt.call_method(&cr, "text_extents", &[Value::string("a")]).unwrap());
    assert_eq!(extents.get("width"), Value::Number(10.0));
    assert_eq!(count.get(), 2);
}

#[test]
fn test_render_glyph_failure_reaches_caller() {
    init_logging();
    let rt = Runtime::new();
    let render = rt.function(|_, _| Err(BindingError::raised("no such glyph")));
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render)])]).unwrap());

    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face]).unwrap();
    let err = rt.call_method(&cr, "show_text", &[Value::string("x")]).unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));
    assert!(err.to_string().contains("no such glyph"));

    let status = rt.call_method(&cr, "status", &[]).unwrap();
    assert_eq!(status.len(), 1);
}

#[test]
fn test_extents_report_render_glyph_failure() {
    init_logging();
    let rt = Runtime::new();
    let render = rt.function(|_, _| Err(BindingError::raised("glyph boom")));
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render)])]).unwrap());

    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face]).unwrap();
    let err = rt.call_method(&cr, "text_extents", &[Value::string("A")]).unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));
    assert!(err.to_string().contains("glyph boom"));

    // The host message belongs to that call only.
    let m = first(rt.call("matrix_create", &[]).unwrap());
    rt.call_method(&m, "scale", &[0.into(), 0.into()]).unwrap();
    match rt.call_method(&m, "invert", &[]).unwrap_err() {
        BindingError::NativeStatus { status, detail, .. } => {
            assert_eq!(status, Status::InvalidMatrix);
            assert_eq!(detail, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_glyph_ops_report_render_glyph_failure() {
    let rt = Runtime::new();
    let render = rt.function(|_, _| Err(BindingError::raised("glyph boom")));
    let face = first(rt.call("user_font_face_create", &[options(&[("render_glyph", render)])]).unwrap());

    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face]).unwrap();
    let glyphs = Value::list([Value::numbers([1.0, 0.0, 0.0])]);
    let err = rt.call_method(&cr, "glyph_extents", &[glyphs.clone()]).unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));

    // The context stays in error, so later queries fail too.
    let err = rt.call_method(&cr, "glyph_path", &[glyphs]).unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));
    let err = rt.call_method(&cr, "font_extents", &[]).unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));
}

#[test]
fn test_init_sets_font_extents() {
    let rt = Runtime::new();
    let init = rt.function(|_, args| {
        let extents = args.get(2).cloned().unwrap_or_default();
        if let Some(t) = extents.as_table() {
            t.borrow_mut().set_field("ascent", 0.75);
            t.borrow_mut().set_field("descent", 0.25);
        }
        Ok(Vec::new())
    });
    let render = rt.function(|_, _| Ok(Vec::new()));
    let opts = options(&[("init", init), ("render_glyph", render)]);
    let face = first(rt.call("user_font_face_create", &[opts]).unwrap());

    let matrix = first(rt.call("matrix_create", &[]).unwrap());
    let font_matrix = first(rt.call("matrix_create", &[]).unwrap());
    rt.call_method(&font_matrix, "scale", &[4.into(), 4.into()]).unwrap();
    let font = first(rt.call("scaled_font_create", &[face, font_matrix, matrix]).unwrap());

    let extents = first(rt.call_method(&font, "extents", &[]).unwrap());
    assert_eq!(extents.get("ascent"), Value::Number(3.0));
    assert_eq!(extents.get("descent"), Value::Number(1.0));
}

#[test]
fn test_init_failure_fails_creation() {
    init_logging();
    let rt = Runtime::new();
    let init = rt.function(|_, _| Err(BindingError::raised("init exploded")));
    let render = rt.function(|_, _| Ok(Vec::new()));
    let face = first(rt.call("user_font_face_create", &[options(&[("init", init), ("render_glyph", render)])]).unwrap());
    let identity = first(rt.call("matrix_create", &[]).unwrap());

    let err = rt
        .call("scaled_font_create", &[face, identity.clone(), identity])
        .unwrap_err();
    assert_eq!(err.status(), Some(Status::UserFontError));
    assert!(err.to_string().contains("init exploded"));
}

#[test]
fn test_text_to_glyphs_callback() {
    let rt = Runtime::new();
    let render = rt.function(|_, _| Ok(Vec::new()));
    let shape = rt.function(|_, args| {
        let text = args.get(1).and_then(|v| v.as_str().map(str::to_owned)).unwrap_or_default();
        let glyphs = (0..text.chars().count()).map(|i| Value::numbers([7.0, i as f64, 0.0]));
        Ok(vec![Value::list(glyphs)])
    });
    let opts = options(&[("render_glyph", render), ("text_to_glyphs", shape)]);
    let face = first(rt.call("user_font_face_create", &[opts]).unwrap());
    let identity = first(rt.call("matrix_create", &[]).unwrap());
    let font = first(rt.call("scaled_font_create", &[face, identity.clone(), identity]).unwrap());

    let returns = rt
        .call_method(&font, "text_to_glyphs", &[0.into(), 0.into(), Value::string("hi")])
        .unwrap();
    let glyphs = &returns[0];
    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs.index(2).index(1), Value::Number(7.0));
    assert_eq!(glyphs.index(2).index(2), Value::Number(1.0));
}

#[test]
fn test_bad_callback_result() {
    init_logging();
    let rt = Runtime::new();
    let render = rt.function(|_, _| Ok(Vec::new()));
    let unicode = rt.function(|_, _| Ok(vec![Value::string("not a glyph")]));
    let opts = options(&[("render_glyph", render), ("unicode_to_glyph", unicode)]);
    let face = first(rt.call("user_font_face_create", &[opts]).unwrap());

    let cr = drawing_context(&rt);
    rt.call_method(&cr, "set_font_face", &[face]).unwrap();
    let err = rt.call_method(&cr, "show_text", &[Value::string("a")]).unwrap_err();
    assert!(err.to_string().contains("bad glyph index returned from 'unicode_to_glyph' callback"));
}

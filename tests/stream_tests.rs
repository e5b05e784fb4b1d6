//! Surface I/O through host stream functions and file handles.

use std::cell::RefCell;
use std::rc::Rc;

use oocairo::Runtime;
use oocairo_core::{BindingError, Table, Value};
use oocairo_native::{STREAM_MAGIC, Status};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn first(returns: Vec<Value>) -> Value {
    returns.into_iter().next().unwrap_or_default()
}

fn small_image(rt: &Runtime) -> Value {
    let surface = first(rt.call("image_surface_create", &["a8".into(), 3.into(), 2.into()]).unwrap());
    let cr = first(rt.call("context_create", &[surface.clone()]).unwrap());
    rt.call_method(&cr, "paint", &[]).unwrap();
    surface
}

/// A write function appending every chunk to `sink`.
fn collector(rt: &Runtime, sink: Rc<RefCell<Vec<u8>>>) -> Value {
    rt.function(move |_, args| {
        let chunk = args.first().and_then(Value::as_bytes).unwrap_or_default();
        sink.borrow_mut().extend_from_slice(chunk);
        Ok(Vec::new())
    })
}

/// A read function serving `data` front to back.
fn feeder(rt: &Runtime, data: Vec<u8>) -> Value {
    let cursor = RefCell::new(0usize);
    rt.function(move |_, args| {
        let len = args.first().and_then(Value::as_number).unwrap_or_default() as usize;
        let mut pos = cursor.borrow_mut();
        let end = (*pos + len).min(data.len());
        let chunk = data[*pos..end].to_vec();
        *pos = end;
        Ok(vec![Value::bytes(chunk)])
    })
}

#[test]
fn test_write_to_function() {
    let rt = Runtime::new();
    let surface = small_image(&rt);
    let sink = Rc::new(RefCell::new(Vec::new()));
    let write = collector(&rt, sink.clone());

    assert!(rt.call_method(&surface, "write_to_stream", &[write]).unwrap().is_empty());
    let bytes = sink.borrow();
    assert!(bytes.starts_with(&STREAM_MAGIC));
    assert!(rt.cairo().was_called("cairo_surface_write_to_png_stream"));
}

#[test]
fn test_write_to_file_handle() {
    let rt = Runtime::new();
    let surface = small_image(&rt);
    let sink = Rc::new(RefCell::new(Vec::new()));
    let seen_self = Rc::new(RefCell::new(false));

    let mut handle = Table::new();
    let flag = seen_self.clone();
    let target = sink.clone();
    handle.set_field(
        "write",
        rt.function(move |_, args| {
            *flag.borrow_mut() = args.first().and_then(Value::as_table).is_some();
            let chunk = args.get(1).and_then(Value::as_bytes).unwrap_or_default();
            target.borrow_mut().extend_from_slice(chunk);
            Ok(Vec::new())
        }),
    );

    rt.call_method(&surface, "write_to_stream", &[Value::table(handle)]).unwrap();
    assert!(*seen_self.borrow());
    assert!(!sink.borrow().is_empty());
}

#[test]
fn test_write_failure_carries_host_message() {
    init_logging();
    let rt = Runtime::new();
    let surface = small_image(&rt);
    let write = rt.function(|_, _| Err(BindingError::raised("disk full")));

    let err = rt.call_method(&surface, "write_to_stream", &[write]).unwrap_err();
    match &err {
        BindingError::NativeStatus { status, detail, .. } => {
            assert_eq!(*status, Status::WriteError);
            assert_eq!(detail.as_deref(), Some("disk full"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_write_target_is_checked_first() {
    let rt = Runtime::new();
    let surface = small_image(&rt);
    rt.cairo().clear_calls();

    let err = rt
        .call_method(&surface, "write_to_stream", &[Value::table(Table::new())])
        .unwrap_err();
    assert!(err.is_argument());
    assert_eq!(err.position(), Some(2));
    assert!(err.to_string().contains("file handle does not have 'write' method"));

    let err = rt
        .call_method(&surface, "write_to_stream", &[Value::Number(5.0)])
        .unwrap_err();
    assert_eq!(err.position(), Some(2));
    assert!(!rt.cairo().was_called("cairo_surface_write_to_png_stream"));
}

#[test]
fn test_read_back_written_image() {
    let rt = Runtime::new();
    let surface = small_image(&rt);
    let sink = Rc::new(RefCell::new(Vec::new()));
    rt.call_method(&surface, "write_to_stream", &[collector(&rt, sink.clone())])
        .unwrap();

    let read = feeder(&rt, sink.borrow().clone());
    let copy = first(rt.call("image_surface_create_from_stream", &[read]).unwrap());
    assert_eq!(rt.call_method(&copy, "get_format", &[]).unwrap(), vec![Value::string("a8")]);
    assert_eq!(rt.call_method(&copy, "get_width", &[]).unwrap(), vec![Value::Number(3.0)]);
    assert_eq!(rt.call_method(&copy, "get_height", &[]).unwrap(), vec![Value::Number(2.0)]);
}

#[test]
fn test_short_read_fails() {
    init_logging();
    let rt = Runtime::new();
    let read = feeder(&rt, STREAM_MAGIC.to_vec());
    let live = rt.cairo().live_objects();

    let err = rt.call("image_surface_create_from_stream", &[read]).unwrap_err();
    assert_eq!(err.status(), Some(Status::ReadError));
    assert!(err.to_string().contains("wrong amount of data"));
    assert_eq!(rt.cairo().live_objects(), live);
}

#[test]
fn test_read_from_non_stream() {
    let rt = Runtime::new();
    let err = rt
        .call("image_surface_create_from_stream", &[Value::Number(5.0)])
        .unwrap_err();
    assert!(err.is_argument());
    assert_eq!(err.position(), Some(1));
    assert!(err.to_string().contains("function or file handle expected, got number"));
    assert!(!rt.cairo().was_called("cairo_image_surface_create_from_png_stream"));
    assert_eq!(rt.cairo().live_objects(), 0);
}

//! Conversion of JS side errors into the portable [`Error`] shape.

use wasm_bindgen::{JsCast as _, JsValue};

use crate::platform::Error;

impl From<JsValue> for Error {
    fn from(err: JsValue) -> Self {
        match err.dyn_into::<js_sys::Error>() {
            Ok(err) => Self::new(
                String::from(err.name()),
                String::from(err.message()),
            ),
            Err(val) => Self::new(
                "Error",
                val.as_string()
                    .unwrap_or_else(|| "no string representation".to_owned()),
            ),
        }
    }
}

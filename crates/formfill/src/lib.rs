// File: src/lib.rs
// Purpose: Crate root - public API surface

//! Populate and validate HTML-style forms from flat key/value records.
//!
//! A [`Form`] wraps a `<form>` element inside a [`Document`]. Feeding it
//! a [`Record`] writes each value into the matching named field,
//! enforcing the field's declared constraints (`required`, `pattern`,
//! `min`/`max`/`step`, typed formats) along the way, and hands back the
//! form's resulting state as a new record.
//!
//! ```
//! use formfill::{Form, Record};
//!
//! let mut doc = formfill::dom::Document::parse(
//!     r#"<form><input type="number" name="age" min="0"></form>"#,
//! )?;
//! let form = Form::first_in(&doc)?;
//!
//! let mut data = Record::new();
//! data.insert("age", "42");
//!
//! let state = form.submit(&mut doc, &data)?;
//! assert_eq!(state.get("age").and_then(|v| v.as_single()), Some("42"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Error handling is configurable per pass via [`PopulateOptions`]:
//! fail-fast (the default), collect-and-annotate through an
//! [`ErrorSink`] such as [`DisplayHtml`], or per-kind suppression for
//! hydration flows.

pub mod datetime;
mod error;
mod policy;
mod populate;
mod record;
mod serialize;
mod validators;

pub use formfill_dom as dom;

pub use error::{ErrorKind, FieldError, FormError};
pub use policy::{DisplayHtml, ErrorSink, OnError, PopulateOptions};
pub use populate::Form;
pub use record::{Record, Value};

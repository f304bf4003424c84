// File: src/policy.rs
// Purpose: Configurable error policy - fail-fast vs collect, per-kind suppression

use std::collections::HashSet;
use std::fmt;

use formfill_dom::Document;

use crate::error::{ErrorKind, FieldError, FormError};

/// Receives each unsuppressed validation error during a collect-mode
/// pass. Sinks may mutate the document, e.g. to annotate the offending
/// field with a visible message.
pub trait ErrorSink {
    fn report(&mut self, doc: &mut Document, error: &FieldError);
}

impl<F> ErrorSink for F
where
    F: FnMut(&mut Document, &FieldError),
{
    fn report(&mut self, doc: &mut Document, error: &FieldError) {
        self(doc, error)
    }
}

/// Sink that appends `<span class="error">message</span>` after the
/// offending field. The first error of a pass additionally gets
/// `id="first-error"` so client code can scroll to it.
#[derive(Debug, Default)]
pub struct DisplayHtml {
    reported: usize,
}

impl DisplayHtml {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorSink for DisplayHtml {
    fn report(&mut self, doc: &mut Document, error: &FieldError) {
        let span = doc.create_element("span");
        doc.set_attr(span, "class", "error");

        if self.reported == 0 {
            doc.set_attr(span, "id", "first-error");
        }
        self.reported += 1;

        doc.set_text(span, &error.message);
        doc.insert_after(error.node, span);
    }
}

/// What to do with an unsuppressed validation error.
#[derive(Default)]
pub enum OnError {
    /// Abort the pass on the first error (the default).
    #[default]
    Raise,
    /// Hand every error to the sink and keep validating; the pass fails
    /// at the end if anything was reported.
    Collect(Box<dyn ErrorSink>),
}

impl fmt::Debug for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnError::Raise => write!(f, "Raise"),
            OnError::Collect(_) => write!(f, "Collect(..)"),
        }
    }
}

/// Per-pass configuration: which error kinds to silently permit, and
/// how unsuppressed errors propagate. There is no process-wide default
/// handler; every pass gets its options explicitly.
#[derive(Debug, Default)]
pub struct PopulateOptions {
    pub suppress: HashSet<ErrorKind>,
    pub on_error: OnError,
}

impl PopulateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Silently permit writes that would raise the given error kind.
    /// Suppressed errors are not sunk and do not fail the pass, but the
    /// value is still written.
    pub fn suppress(mut self, kind: ErrorKind) -> Self {
        self.suppress.insert(kind);
        self
    }

    /// Switch to collect mode with the given sink.
    pub fn collect(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.on_error = OnError::Collect(Box::new(sink));
        self
    }

    /// Options for hydrating a freshly built tree from stored state:
    /// readonly and disabled fields accept their stored values without
    /// tripping validation.
    pub fn hydration() -> Self {
        Self::new()
            .suppress(ErrorKind::Readonly)
            .suppress(ErrorKind::Disabled)
    }
}

/// Mutable error accumulator threaded through one population pass.
/// Built fresh per pass so unrelated passes share no state.
pub(crate) struct ErrorPolicy {
    suppress: HashSet<ErrorKind>,
    on_error: OnError,
    errors: Vec<FieldError>,
}

impl ErrorPolicy {
    pub(crate) fn new(options: PopulateOptions) -> Self {
        Self {
            suppress: options.suppress,
            on_error: options.on_error,
            errors: Vec::new(),
        }
    }

    /// Route one validation failure. Suppression is evaluated before the
    /// sink runs; in fail-fast mode the error aborts the pass via `Err`.
    pub(crate) fn report(
        &mut self,
        doc: &mut Document,
        error: FieldError,
    ) -> Result<(), FormError> {
        if self.suppress.contains(&error.kind) {
            return Ok(());
        }

        match &mut self.on_error {
            OnError::Raise => Err(FormError::Validation(vec![error])),
            OnError::Collect(sink) => {
                sink.report(doc, &error);
                self.errors.push(error);
                Ok(())
            }
        }
    }

    pub(crate) fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_dom::Document;

    fn doc_with_input() -> (Document, formfill_dom::NodeId) {
        let mut doc = Document::parse(r#"<form><input name="a"></form>"#).unwrap();
        let input = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("input"))
            .unwrap();
        (doc, input)
    }

    #[test]
    fn raise_mode_aborts_on_first_error() {
        let (mut doc, input) = doc_with_input();
        let mut policy = ErrorPolicy::new(PopulateOptions::new());

        let err = policy
            .report(
                &mut doc,
                FieldError::new(ErrorKind::BadValue, input, "bad"),
            )
            .unwrap_err();

        assert!(matches!(err, FormError::Validation(errors) if errors.len() == 1));
    }

    #[test]
    fn suppressed_kinds_are_not_counted() {
        let (mut doc, input) = doc_with_input();
        let mut policy =
            ErrorPolicy::new(PopulateOptions::new().suppress(ErrorKind::Readonly));

        policy
            .report(
                &mut doc,
                FieldError::new(ErrorKind::Readonly, input, "read only"),
            )
            .unwrap();

        assert!(!policy.failed());
    }

    #[test]
    fn collect_mode_accumulates_and_sinks() {
        let (mut doc, input) = doc_with_input();
        let mut seen = 0;

        // Count reports through a closure sink, then check accumulation.
        let mut policy = ErrorPolicy::new(PopulateOptions::new().collect(
            move |_: &mut Document, _: &FieldError| {
                seen += 1;
            },
        ));

        for _ in 0..2 {
            policy
                .report(
                    &mut doc,
                    FieldError::new(ErrorKind::BadValue, input, "bad"),
                )
                .unwrap();
        }

        assert!(policy.failed());
        assert_eq!(policy.into_errors().len(), 2);
    }

    #[test]
    fn display_html_annotates_the_tree() {
        let (mut doc, input) = doc_with_input();
        let mut sink = DisplayHtml::new();

        sink.report(
            &mut doc,
            &FieldError::new(ErrorKind::ValueRequired, input, "Must be filled"),
        );

        let span = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("span"))
            .unwrap();

        assert_eq!(doc.attr(span, "class"), Some("error"));
        assert_eq!(doc.attr(span, "id"), Some("first-error"));
        assert_eq!(doc.text(span), "Must be filled");
    }
}

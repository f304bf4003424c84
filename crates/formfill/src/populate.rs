// File: src/populate.rs
// Purpose: Population engine - locate fields, validate, write values

use std::collections::HashSet;

use formfill_dom::{Document, NodeId, Selector};
use once_cell::sync::Lazy;

use crate::error::{ErrorKind, FieldError, FormError};
use crate::policy::{ErrorPolicy, PopulateOptions};
use crate::record::{Record, Value};
use crate::serialize;
use crate::validators::{self, CheckResult, Refusal};

static FORMS: Lazy<Selector> = Lazy::new(|| Selector::parse("form").unwrap());
static CHECKBOXES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[type='checkbox'][name]").unwrap());
static RADIOS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[type='radio'][name]").unwrap());
static REQUIRED_RADIOS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[type='radio'][name][required]").unwrap());
static OPTIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("option").unwrap());
static SELECTED_OPTIONS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[selected]").unwrap());

/// Handle on a `<form>` subtree. The document is borrowed per
/// operation; a population pass holds it exclusively, so interleaved
/// passes over one tree are impossible by construction.
#[derive(Debug, Clone, Copy)]
pub struct Form {
    root: NodeId,
}

impl Form {
    /// Wrap an element, asserting it actually is a form.
    pub fn new(doc: &Document, element: NodeId) -> Result<Self, FormError> {
        if doc.tag(element) != Some("form") {
            return Err(FormError::NotAForm);
        }

        Ok(Self { root: element })
    }

    /// The first `<form>` in the document.
    pub fn first_in(doc: &Document) -> Result<Self, FormError> {
        doc.select_first(doc.root(), &FORMS)
            .map(|root| Self { root })
            .ok_or(FormError::NotAForm)
    }

    /// The underlying form element.
    pub fn element(&self) -> NodeId {
        self.root
    }

    /// Populate with default options: fail-fast, nothing suppressed.
    pub fn submit(&self, doc: &mut Document, data: &Record) -> Result<Record, FormError> {
        self.populate(doc, data, PopulateOptions::default())
    }

    /// Write a record into the form, validating each field against its
    /// declared constraints.
    ///
    /// Every key must resolve to at least one element named by `name`
    /// or `data-name`; a key with no match aborts the pass regardless
    /// of error policy. Checkboxes and radios are additionally resolved
    /// in a whole-tree pass afterwards, because for them an absent key
    /// means "uncheck" rather than "missing".
    ///
    /// On success returns the serialized, validated form state. On
    /// failure returns [`FormError::Validation`] with one error
    /// (fail-fast) or everything accumulated (collect mode) and never
    /// partial output.
    pub fn populate(
        &self,
        doc: &mut Document,
        data: &Record,
        options: PopulateOptions,
    ) -> Result<Record, FormError> {
        tracing::debug!(keys = data.len(), "starting population pass");

        let mut policy = ErrorPolicy::new(options);

        for (key, value) in data.iter() {
            for node in self.locate(doc, key)? {
                self.populate_node(doc, node, value, &mut policy)?;
            }
        }

        // Checked state works on key presence, not key values, so these
        // run once over the whole tree after the per-key pass.
        self.populate_checkboxes(doc, data, &mut policy)?;
        self.populate_radios(doc, data, &mut policy)?;

        if policy.failed() {
            let errors = policy.into_errors();
            tracing::debug!(errors = errors.len(), "population pass failed");
            return Err(FormError::Validation(errors));
        }

        let record = serialize::serialize(doc, self.root);
        tracing::debug!(fields = record.len(), "population pass succeeded");

        Ok(record)
    }

    /// Resolve a record key to the elements carrying it as `name` or
    /// `data-name`. Zero matches means the form and the record have
    /// diverged; that is never a validation question.
    fn locate(&self, doc: &Document, key: &str) -> Result<Vec<NodeId>, FormError> {
        let nodes: Vec<NodeId> = doc
            .descendants(self.root)
            .filter(|&id| {
                doc.attr(id, "name") == Some(key) || doc.attr(id, "data-name") == Some(key)
            })
            .collect();

        if nodes.is_empty() {
            return Err(FormError::NoElementsToPopulate {
                key: key.to_string(),
            });
        }

        Ok(nodes)
    }

    fn populate_node(
        &self,
        doc: &mut Document,
        node: NodeId,
        value: &Value,
        policy: &mut ErrorPolicy,
    ) -> Result<(), FormError> {
        let scalar = value.as_single().unwrap_or_default();

        if doc.has_attr(node, "required") && value.is_empty() {
            let result = validators::validate_required(doc, node, "");
            route(doc, policy, node, result)?;
        }

        if doc.has_attr(node, "readonly") {
            let result = validators::validate_readonly(doc, node, scalar);
            route(doc, policy, node, result)?;
        }

        if doc.has_attr(node, "disabled") {
            let result = validators::validate_disabled(doc, node, scalar);
            route(doc, policy, node, result)?;
        }

        match doc.tag(node) {
            Some("input") => self.populate_input(doc, node, value, policy),
            Some("select") => self.populate_select(doc, node, value, policy),
            _ => {
                // Textareas and generic data-name targets carry their
                // value as text content.
                let Some(scalar) = expect_single(doc, policy, node, value)? else {
                    return Ok(());
                };
                doc.set_text(node, &scalar);
                Ok(())
            }
        }
    }

    fn populate_input(
        &self,
        doc: &mut Document,
        node: NodeId,
        value: &Value,
        policy: &mut ErrorPolicy,
    ) -> Result<(), FormError> {
        let Some(value) = expect_single(doc, policy, node, value)? else {
            return Ok(());
        };

        // The pattern constraint applies to every input sub-type.
        if doc.has_attr(node, "pattern") {
            let result = validators::validate_pattern(doc, node, &value);
            route(doc, policy, node, result)?;
        }

        let type_attr = doc
            .attr(node, "type")
            .unwrap_or_default()
            .to_ascii_lowercase();

        if let Some(validator) = validators::VALIDATORS.get(type_attr.as_str()) {
            let result = validator(doc, node, &value);
            route(doc, policy, node, result)?;
        }

        // Radio selection is owned by the group pass; writing the value
        // here would clobber each sibling's distinct option value.
        if type_attr != "radio" {
            doc.set_attr(node, "value", &value);
        }

        Ok(())
    }

    fn populate_select(
        &self,
        doc: &mut Document,
        node: NodeId,
        value: &Value,
        policy: &mut ErrorPolicy,
    ) -> Result<(), FormError> {
        let multiple = doc.has_attr(node, "multiple");

        let wanted: Vec<String> = if multiple {
            let name = doc.attr(node, "name").unwrap_or_default();
            if !name.ends_with("[]") {
                tracing::warn!(name, "expected multi-select name to end with []");
            }

            match value.as_many() {
                Some(values) => values.to_vec(),
                None => {
                    let error = FieldError::new(
                        ErrorKind::BadValue,
                        node,
                        "Expected a list for multi-select",
                    );
                    return policy.report(doc, error);
                }
            }
        } else {
            let Some(scalar) = expect_single(doc, policy, node, value)? else {
                return Ok(());
            };
            vec![scalar]
        };

        let options = doc.select(node, &OPTIONS);

        // Option elements keep stale "selected" markers across repeated
        // populations, so prior selection state is always cleared first.
        for option in doc.select(node, &SELECTED_OPTIONS) {
            doc.remove_attr(option, "selected");
        }

        for entry in wanted {
            let matched = options.iter().copied().find(|&option| {
                match doc.attr(option, "value") {
                    Some(value) => value == entry,
                    None => doc.text(option) == entry,
                }
            });

            match matched {
                Some(option) => doc.set_attr(option, "selected", "selected"),
                None => {
                    // Invalid entries are reported and never applied.
                    let error = FieldError::new(
                        ErrorKind::BadValue,
                        node,
                        "Specified selection is invalid",
                    );
                    policy.report(doc, error)?;
                }
            }
        }

        Ok(())
    }

    fn populate_checkboxes(
        &self,
        doc: &mut Document,
        data: &Record,
        policy: &mut ErrorPolicy,
    ) -> Result<(), FormError> {
        for checkbox in doc.select(self.root, &CHECKBOXES) {
            let name = doc.attr(checkbox, "name").unwrap_or_default().to_string();

            if data.contains_key(&name) {
                doc.set_attr(checkbox, "checked", "checked");
            } else {
                if doc.has_attr(checkbox, "required") {
                    let error =
                        FieldError::new(ErrorKind::CheckboxRequired, checkbox, "Must be checked");
                    policy.report(doc, error)?;
                }

                doc.remove_attr(checkbox, "checked");
            }
        }

        Ok(())
    }

    fn populate_radios(
        &self,
        doc: &mut Document,
        data: &Record,
        policy: &mut ErrorPolicy,
    ) -> Result<(), FormError> {
        let radios: Vec<(NodeId, String)> = doc
            .select(self.root, &RADIOS)
            .into_iter()
            .map(|radio| {
                let name = doc.attr(radio, "name").unwrap_or_default().to_string();
                (radio, name)
            })
            .collect();

        let required_groups: HashSet<String> = doc
            .select(self.root, &REQUIRED_RADIOS)
            .into_iter()
            .map(|radio| doc.attr(radio, "name").unwrap_or_default().to_string())
            .collect();

        // A missing required group is reported once, not once per radio.
        let mut reported_groups: HashSet<String> = HashSet::new();

        for (radio, name) in &radios {
            let Some(value) = data.get(name) else {
                if required_groups.contains(name) && reported_groups.insert(name.clone()) {
                    let error =
                        FieldError::new(ErrorKind::RadioRequired, *radio, "Selection required");
                    policy.report(doc, error)?;
                }
                continue;
            };

            let Some(wanted) = value.as_single() else {
                continue;
            };

            if doc.attr(*radio, "value") != Some(wanted) {
                continue;
            }

            // Check this radio exclusively within its group.
            for (sibling, sibling_name) in &radios {
                if sibling_name == name {
                    doc.remove_attr(*sibling, "checked");
                }
            }

            doc.set_attr(*radio, "checked", "checked");
        }

        Ok(())
    }
}

/// Route a validator outcome through the error policy. Field failures
/// follow the policy's mode; structural faults abort unconditionally.
fn route(
    doc: &mut Document,
    policy: &mut ErrorPolicy,
    node: NodeId,
    result: CheckResult,
) -> Result<(), FormError> {
    match result {
        Ok(()) => Ok(()),
        Err(Refusal::Invalid { kind, message }) => {
            policy.report(doc, FieldError::new(kind, node, message))
        }
        Err(Refusal::Fatal(error)) => Err(error),
    }
}

/// Scalar view of a value for single-valued controls. A list where a
/// scalar belongs is a `BadValue`; the write is skipped.
fn expect_single(
    doc: &mut Document,
    policy: &mut ErrorPolicy,
    node: NodeId,
    value: &Value,
) -> Result<Option<String>, FormError> {
    match value.as_single() {
        Some(scalar) => Ok(Some(scalar.to_string())),
        None => {
            let error = FieldError::new(ErrorKind::BadValue, node, "Expected a scalar value");
            policy.report(doc, error)?;
            Ok(None)
        }
    }
}

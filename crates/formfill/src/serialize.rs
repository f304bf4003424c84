// File: src/serialize.rs
// Purpose: Read current form state back out as a flat record

use formfill_dom::{Document, NodeId, Selector};
use once_cell::sync::Lazy;

use crate::record::{Record, Value};

static NAMED_CONTROLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name], select[name], textarea[name]").unwrap());
static OPTIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("option").unwrap());
static SELECTED_OPTIONS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[selected]").unwrap());

/// Flatten the form's current state into a record, in tree order.
///
/// Unchecked checkboxes and radios contribute nothing. Later controls
/// sharing a name overwrite earlier ones, except that an unchecked
/// control never erases a checked sibling's entry.
pub(crate) fn serialize(doc: &Document, root: NodeId) -> Record {
    let mut record = Record::new();

    for control in doc.select(root, &NAMED_CONTROLS) {
        let name = match doc.attr(control, "name") {
            Some(name) => name.to_string(),
            None => continue,
        };

        match doc.tag(control) {
            Some("select") => {
                if let Some(value) = serialize_select(doc, control, &name) {
                    record.insert(name, value);
                }
            }
            Some("textarea") => {
                record.insert(name, doc.text(control));
            }
            _ => {
                let type_attr = doc
                    .attr(control, "type")
                    .unwrap_or_default()
                    .to_ascii_lowercase();

                if matches!(type_attr.as_str(), "checkbox" | "radio")
                    && !doc.has_attr(control, "checked")
                {
                    continue;
                }

                let value = doc.attr(control, "value").unwrap_or_default().to_string();
                record.insert(name, value);
            }
        }
    }

    record
}

/// A select's contribution to the record.
///
/// A multi-select (`multiple` plus a `[]`-suffixed name) yields the list
/// of selected option values. A single select yields its first selected
/// option, falling back to the first option when nothing is selected;
/// the option's `value` attribute wins over its text. A select with no
/// options at all contributes nothing.
fn serialize_select(doc: &Document, select: NodeId, name: &str) -> Option<Value> {
    let selected = doc.select(select, &SELECTED_OPTIONS);

    if doc.has_attr(select, "multiple") {
        if name.ends_with("[]") {
            let values: Vec<String> = selected
                .iter()
                .map(|&option| option_value(doc, option))
                .collect();
            return Some(Value::Many(values));
        }

        tracing::warn!(name, "expected multi-select name to end with []");
    }

    let first = selected
        .first()
        .copied()
        .or_else(|| doc.select(select, &OPTIONS).first().copied())?;

    Some(Value::Single(option_value(doc, first)))
}

fn option_value(doc: &Document, option: NodeId) -> String {
    match doc.attr(option, "value") {
        Some(value) => value.to_string(),
        None => doc.text(option),
    }
}

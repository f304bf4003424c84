// File: tests/common/mod.rs
// Purpose: Shared fixture form and submission helpers

#![allow(dead_code)]

use formfill::dom::Document;
use formfill::{Form, FormError, Record, Value};

/// One form exercising every supported control and constraint.
pub const SAMPLE_FORM: &str = r##"
<form id="form">
    <input type="text" name="animal" value="Lion">
    <input type="text" name="required" required value="Required value">
    <input type="text" name="readonly" readonly value="Read only value">
    <input type="text" name="disabled" disabled value="Disabled value">
    <input type="hidden" name="hidden" value="Hidden value">
    <input type="url" name="url" value="https://example.com">
    <input type="email" name="email" value="test@example.com">
    <input type="email" name="bcc" multiple value="a@example.com,b@example.com">
    <input type="number" name="numeric" value="42">
    <input type="range" name="range" min="-1000000" max="1000000" value="0">
    <input type="number" name="minimum" min="1" value="1">
    <input type="number" name="maximum" max="-1" value="-1">
    <input type="number" name="stepped-integer" step="3" value="3">
    <input type="range" name="stepped-float" step="0.1" value="0.2">
    <input type="color" name="color" value="#ff0000">
    <input type="datetime-local" name="datetime-local" value="2023-11-10T18:00">
    <input type="datetime-local" name="datetime-local-with-min" min="2018-06-07T00:00" value="2018-06-10T00:00">
    <input type="datetime-local" name="datetime-local-with-max" max="2018-06-14T00:00" value="2018-06-10T00:00">
    <input type="month" name="month" value="2023-10">
    <input type="month" name="month-with-min" min="2018-03" value="2018-04">
    <input type="month" name="month-with-max" max="2018-07" value="2018-06">
    <input type="week" name="week" min="2013-W28" max="2013-W32" value="2013-W29">
    <input type="time" name="time" min="08:00" max="16:00" value="12:00">
    <input type="text" name="postcode" pattern="[A-Za-z]{1,2}\d[A-Za-z\d]? ?\d[A-Za-z]{2}" value="SW1A 1AA">
    <input type="checkbox" name="checkbox" value="on">
    <input type="checkbox" name="required-checkbox" value="on" checked required>
    <input type="radio" name="favourite-car" value="ford" required>
    <input type="radio" name="favourite-car" value="mercedes" checked required>
    <input type="radio" name="favourite-car" value="bmw" required>
    <input type="radio" name="favourite-animal" value="lions">
    <input type="radio" name="favourite-animal" value="tigers">
    <select name="select">
        <option value="lions">Lions</option>
        <option value="bears">Bears</option>
    </select>
    <select name="select-with-implicit-values">
        <option>Jazz</option>
        <option>Blues</option>
    </select>
    <select name="select-with-selected-option">
        <option value="potatoes">Potatoes</option>
        <option value="carrots" selected>Carrots</option>
        <option value="turnips">Turnips</option>
    </select>
    <select name="select-with-optgroups">
        <optgroup label="Cars">
            <option value="ford">Ford</option>
        </optgroup>
        <optgroup label="Planes">
            <option value="boeing">Boeing</option>
        </optgroup>
    </select>
    <select name="multi-select[]" multiple>
        <option value="ford">Ford</option>
        <option value="iveco" selected>Iveco</option>
        <option value="mercedes">Mercedes</option>
    </select>
    <textarea name="textarea">Original content</textarea>
    <span data-name="populated-span">Original span</span>
</form>
"##;

pub fn fixture() -> (Document, Form) {
    let doc = Document::parse(SAMPLE_FORM).unwrap();
    let form = Form::first_in(&doc).unwrap();
    (doc, form)
}

/// The minimal record that satisfies the fixture's required fields:
/// every `[required]` control mapped to its current value, checkables
/// only when checked.
pub fn required_entries(doc: &Document, form: &Form) -> Record {
    let mut record = Record::new();

    for node in doc.descendants(form.element()) {
        if !doc.has_attr(node, "required") {
            continue;
        }
        let Some(name) = doc.attr(node, "name") else {
            continue;
        };

        let type_attr = doc.attr(node, "type").unwrap_or_default();
        if matches!(type_attr, "checkbox" | "radio") && !doc.has_attr(node, "checked") {
            continue;
        }

        record.insert(name, doc.attr(node, "value").unwrap_or_default());
    }

    record
}

/// Submit the required entries plus the given extras against a fresh
/// fixture, with default (fail-fast) options.
pub fn submit(extra: Vec<(&str, Value)>) -> Result<Record, FormError> {
    let (mut doc, form) = fixture();

    let mut data = required_entries(&doc, &form);
    for (key, value) in extra {
        data.insert(key, value);
    }

    form.submit(&mut doc, &data)
}

/// Shorthand for asserting a successful submission's readback value.
pub fn submit_one(key: &str, value: impl Into<Value>) -> Result<Record, FormError> {
    submit(vec![(key, value.into())])
}

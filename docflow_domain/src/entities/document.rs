// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document
//!
//! The mutable record that flows through the pipeline. See §3/§4.1 of the
//! specification for the full mutation contract; this module is the
//! reference implementation of that contract.

use crate::error::PipelineError;
use crate::value_objects::{DocumentId, FieldValue, RenameMode, RunId, ScalarValue};
use std::collections::BTreeMap;

/// Field names a general-purpose mutator may never touch directly.
const RESERVED_FIELDS: [&str; 4] = ["id", "run_id", ".children", "errors"];

fn guard_reserved(name: &str) -> Result<(), PipelineError> {
    if RESERVED_FIELDS.contains(&name) {
        Err(PipelineError::invalid_argument(format!(
            "field '{name}' is reserved and cannot be mutated directly"
        )))
    } else {
        Ok(())
    }
}

/// A mutable, JSON-like record flowing through a pipeline.
///
/// `fields` uses a `BTreeMap` rather than a `HashMap`: field insertion
/// order is explicitly not significant to consumers (§3), and a
/// deterministic iteration order makes `as_map`/`to_json_string` output
/// reproducible, which both the wire format and the test suite rely on.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    run_id: Option<RunId>,
    fields: BTreeMap<String, FieldValue>,
    children: Vec<Document>,
    errors: Vec<String>,
    dropped: bool,
    source_offset: Option<u64>,
}

impl Document {
    /// Construct a document with only an id.
    pub fn new(id: impl Into<String>) -> Result<Self, PipelineError> {
        Ok(Self {
            id: DocumentId::new(id)?,
            run_id: None,
            fields: BTreeMap::new(),
            children: Vec::new(),
            errors: Vec::new(),
            dropped: false,
            source_offset: None,
        })
    }

    /// Construct a document with an id and a run association already
    /// assigned (used by Connectors re-publishing into a known run).
    pub fn with_run_id(id: impl Into<String>, run_id: RunId) -> Result<Self, PipelineError> {
        let mut doc = Self::new(id)?;
        doc.run_id = Some(run_id);
        Ok(doc)
    }

    /// Construct a document from its JSON wire representation, rejecting
    /// a missing, empty, or non-textual `id` per §8's boundary behaviors.
    pub fn from_json(value: serde_json::Value) -> Result<Self, PipelineError> {
        let serde_json::Value::Object(mut obj) = value else {
            return Err(PipelineError::validation("document JSON must be an object"));
        };

        let id = match obj.remove("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::String(_)) => {
                return Err(PipelineError::validation("document id must be non-empty"))
            }
            Some(_) => return Err(PipelineError::validation("document id must be a string")),
            None => return Err(PipelineError::validation("document JSON is missing 'id'")),
        };

        let mut doc = Self::new(id)?;

        if let Some(serde_json::Value::String(run_id)) = obj.remove("run_id") {
            doc.run_id = Some(RunId::new(run_id));
        }

        if let Some(serde_json::Value::Array(children)) = obj.remove(".children") {
            for child in children {
                doc.children.push(Document::from_json(child)?);
            }
        }

        if let Some(serde_json::Value::Array(errors)) = obj.remove("errors") {
            for err in errors {
                if let serde_json::Value::String(s) = err {
                    doc.errors.push(s);
                }
            }
        }

        for (key, value) in obj {
            doc.fields.insert(key, FieldValue::from_json(value)?);
        }

        Ok(doc)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Assign `run_id`. The specification allows this to happen "at most
    /// once during a run, may be cleared" — attempting to assign over an
    /// already-set run id without first calling `clear_run_id` is an
    /// invalid-state error.
    pub fn assign_run_id(&mut self, run_id: RunId) -> Result<(), PipelineError> {
        if self.run_id.is_some() {
            return Err(PipelineError::invalid_state(
                "run_id is already set for this document; clear it before reassigning",
            ));
        }
        self.run_id = Some(run_id);
        Ok(())
    }

    pub fn clear_run_id(&mut self) {
        self.run_id = None;
    }

    /// The document's position in its originating source partition, if
    /// the transport assigns one. Used as an external monotonic version
    /// when the Indexer's optional versioning is enabled (§4.5).
    pub fn source_offset(&self) -> Option<u64> {
        self.source_offset
    }

    /// Stamp the offset the source transport assigned this document.
    /// Called by a Connector/Publisher-side transport handle, never by a
    /// Stage.
    pub fn assign_source_offset(&mut self, offset: u64) {
        self.source_offset = Some(offset);
    }

    /// True if `name` has any value set (including an explicit `Null`).
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// True if `name` is set to a non-null value.
    pub fn has_non_null(&self, name: &str) -> bool {
        self.fields.get(name).map(|v| !v.is_null()).unwrap_or(false)
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// `getString`: first element if multi-valued, the scalar otherwise.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(FieldValue::as_string)
    }

    /// `getStringList`: a single-valued field is wrapped in a one-element
    /// sequence.
    pub fn get_string_list(&self, name: &str) -> Vec<String> {
        self.fields.get(name).map(FieldValue::as_string_list).unwrap_or_default()
    }

    /// Set `name` to `value`, replacing any existing value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Result<(), PipelineError> {
        let name = name.into();
        guard_reserved(&name)?;
        self.fields.insert(name, value.into());
        Ok(())
    }

    /// Append `value` to `name`, promoting a scalar to a sequence if
    /// necessary. If `name` is absent, it is created as a one-element
    /// sequence (consistent with the invariant that `add_to_field`
    /// always grows a multi-valued field by one).
    pub fn add_to_field(&mut self, name: impl Into<String>, value: ScalarValue) -> Result<(), PipelineError> {
        let name = name.into();
        guard_reserved(&name)?;
        let updated = match self.fields.remove(&name) {
            Some(existing) => existing.promote_and_append(value),
            None => FieldValue::Sequence(vec![value]),
        };
        self.fields.insert(name, updated);
        Ok(())
    }

    /// Set `name` to `value` if absent, otherwise append (auto-promoting).
    pub fn set_or_add(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Result<(), PipelineError> {
        let name = name.into();
        guard_reserved(&name)?;
        let value = value.into();
        match self.fields.remove(&name) {
            Some(existing) => {
                self.fields.insert(name, existing.promote_and_append_all(&value));
            }
            None => {
                self.fields.insert(name, value);
            }
        }
        Ok(())
    }

    /// Splice field `name` from `other` into `self`, promoting to
    /// multi-valued on collision. A no-op if `other` does not have `name`.
    pub fn set_or_add_from(&mut self, name: &str, other: &Document) -> Result<(), PipelineError> {
        guard_reserved(name)?;
        let Some(incoming) = other.fields.get(name).cloned() else {
            return Ok(());
        };
        match self.fields.remove(name) {
            Some(existing) => {
                self.fields.insert(name.to_string(), existing.promote_and_append_all(&incoming));
            }
            None => {
                self.fields.insert(name.to_string(), incoming);
            }
        }
        Ok(())
    }

    /// Apply `set_or_add_from` for every non-reserved field of `other`.
    pub fn set_or_add_all(&mut self, other: &Document) -> Result<(), PipelineError> {
        let names: Vec<String> = other.fields.keys().cloned().collect();
        for name in names {
            self.set_or_add_from(&name, other)?;
        }
        Ok(())
    }

    /// Sugar for `set_field`-then-`add_to_field`: when `overwrite` is
    /// true, `name` is cleared and reset to `values`; otherwise `values`
    /// are appended with the ordinary promotion rule. See design notes
    /// for the resolution of the `writeToField` open question.
    pub fn write_to_field(
        &mut self,
        name: impl Into<String>,
        overwrite: bool,
        values: Vec<ScalarValue>,
    ) -> Result<(), PipelineError> {
        let name = name.into();
        guard_reserved(&name)?;
        if overwrite {
            self.fields.remove(&name);
        }
        for value in values {
            self.add_to_field(&name, value)?;
        }
        Ok(())
    }

    pub fn remove_field(&mut self, name: &str) -> Result<(), PipelineError> {
        guard_reserved(name)?;
        self.fields.remove(name);
        Ok(())
    }

    /// Remove element `index` from a sequence field. A no-op (not an
    /// error) if `name` is absent, not a sequence, or `index` is
    /// out-of-range, per §8's documented boundary behavior.
    pub fn remove_from_array(&mut self, name: &str, index: usize) -> Result<(), PipelineError> {
        guard_reserved(name)?;
        if let Some(FieldValue::Sequence(seq)) = self.fields.get_mut(name) {
            if index < seq.len() {
                seq.remove(index);
            }
        }
        Ok(())
    }

    /// Rename `old` to `new` under `mode`. The source field is always
    /// removed; see `RenameMode` for merge semantics.
    pub fn rename_field(&mut self, old: &str, new: &str, mode: RenameMode) -> Result<(), PipelineError> {
        guard_reserved(old)?;
        guard_reserved(new)?;

        let Some(source) = self.fields.remove(old) else {
            return Ok(());
        };

        match mode {
            RenameMode::Overwrite => {
                self.fields.insert(new.to_string(), source);
            }
            RenameMode::Append => {
                let merged = match self.fields.remove(new) {
                    Some(existing) => existing.promote_and_append_all(&source),
                    None => source,
                };
                self.fields.insert(new.to_string(), merged);
            }
            RenameMode::Skip => {
                if !self.fields.contains_key(new) {
                    self.fields.insert(new.to_string(), source);
                }
                // else: destination already present, source stays dropped.
            }
        }
        Ok(())
    }

    pub fn add_child(&mut self, child: Document) {
        self.children.push(child);
    }

    /// Deep copies of the children, to prevent aliasing (§9 "Children
    /// graph").
    pub fn get_children(&self) -> Vec<Document> {
        self.children.clone()
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_dropped(&mut self) {
        self.dropped = true;
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Create a new document sharing this one's fields and children but
    /// with a freshly assigned id and cleared run association.
    pub fn clone_with_new_id(&self, new_id: impl Into<String>) -> Result<Document, PipelineError> {
        let mut clone = self.clone();
        clone.id = DocumentId::new(new_id)?;
        clone.run_id = None;
        Ok(clone)
    }

    /// Serialize to a plain key -> value tree (`asMap`).
    pub fn as_map(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("id".to_string(), serde_json::Value::String(self.id.to_string()));
        if let Some(run_id) = &self.run_id {
            obj.insert("run_id".to_string(), serde_json::Value::String(run_id.to_string()));
        }
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.to_json());
        }
        if !self.children.is_empty() {
            obj.insert(
                ".children".to_string(),
                serde_json::Value::Array(self.children.iter().map(Document::as_map).collect()),
            );
        }
        if !self.errors.is_empty() {
            obj.insert(
                "errors".to_string(),
                serde_json::Value::Array(self.errors.iter().cloned().map(serde_json::Value::String).collect()),
            );
        }
        serde_json::Value::Object(obj)
    }

    /// Canonical JSON string representation (`toString`).
    pub fn to_json_string(&self) -> String {
        self.as_map().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_present_after_construction() {
        let doc = Document::new("d1").unwrap();
        assert_eq!(doc.id().as_str(), "d1");
    }

    #[test]
    fn construction_rejects_empty_id() {
        assert!(Document::new("").is_err());
    }

    #[test]
    fn from_json_rejects_missing_id() {
        let value = serde_json::json!({"name": "Matt"});
        assert!(matches!(Document::from_json(value), Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn from_json_rejects_non_string_id() {
        let value = serde_json::json!({"id": 42});
        assert!(Document::from_json(value).is_err());
    }

    #[test]
    fn set_field_then_get_string_round_trips() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("name", "Matt").unwrap();
        assert_eq!(doc.get_string("name"), Some("Matt".to_string()));
    }

    #[test]
    fn add_to_field_promotes_to_sequence_preserving_order() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("tags", "x").unwrap();
        doc.add_to_field("tags", ScalarValue::String("y".into())).unwrap();
        assert_eq!(doc.get_string_list("tags"), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn set_or_add_applied_n_times_yields_field_of_length_n() {
        let mut doc = Document::new("d1").unwrap();
        for i in 0..4 {
            doc.set_or_add("tags", i.to_string()).unwrap();
        }
        assert_eq!(doc.get_string_list("tags").len(), 4);
    }

    #[test]
    fn reserved_fields_cannot_be_mutated_directly() {
        let mut doc = Document::new("d1").unwrap();
        assert!(doc.set_field("id", "new").is_err());
        assert!(doc.set_field("run_id", "r1").is_err());
        assert!(doc.set_field(".children", "x").is_err());
        assert!(doc.set_field("errors", "x").is_err());
    }

    #[test]
    fn errors_is_writable_only_via_log_error() {
        let mut doc = Document::new("d1").unwrap();
        doc.log_error("boom");
        assert_eq!(doc.errors(), &["boom".to_string()]);
    }

    #[test]
    fn assigning_run_id_twice_without_clearing_is_invalid_state() {
        let mut doc = Document::new("d1").unwrap();
        doc.assign_run_id(RunId::new("r1")).unwrap();
        assert!(matches!(
            doc.assign_run_id(RunId::new("r2")),
            Err(PipelineError::InvalidState(_))
        ));
        doc.clear_run_id();
        assert!(doc.assign_run_id(RunId::new("r2")).is_ok());
    }

    #[test]
    fn clone_is_deep_and_independent() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("name", "Matt").unwrap();
        doc.add_child(Document::new("child").unwrap());

        let mut clone = doc.clone();
        assert_eq!(clone, doc);

        clone.set_field("name", "Other").unwrap();
        clone.add_child(Document::new("extra").unwrap());

        assert_eq!(doc.get_string("name"), Some("Matt".to_string()));
        assert_eq!(doc.children_len(), 1);
        assert_eq!(clone.children_len(), 2);
    }

    #[test]
    fn clone_with_new_id_clears_run_id() {
        let mut doc = Document::new("d1").unwrap();
        doc.assign_run_id(RunId::new("r1")).unwrap();
        let clone = doc.clone_with_new_id("d2").unwrap();
        assert_eq!(clone.id().as_str(), "d2");
        assert!(clone.run_id().is_none());
    }

    #[test]
    fn get_children_returns_copies_not_aliases() {
        let mut doc = Document::new("parent").unwrap();
        doc.add_child(Document::new("child").unwrap());

        let mut children = doc.get_children();
        children[0].set_field("touched", true).unwrap();

        assert!(doc.get_children()[0].get_field("touched").is_none());
    }

    #[test]
    fn remove_from_array_out_of_range_is_noop() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("tags", "a").unwrap();
        doc.add_to_field("tags", ScalarValue::String("b".into())).unwrap();
        doc.remove_from_array("tags", 99).unwrap();
        assert_eq!(doc.get_string_list("tags").len(), 2);
    }

    #[test]
    fn rename_overwrite_replaces_destination() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("a", "x").unwrap();
        doc.set_field("b", "y").unwrap();
        doc.rename_field("a", "b", RenameMode::Overwrite).unwrap();
        assert_eq!(doc.get_string("b"), Some("x".to_string()));
        assert!(!doc.has("a"));
    }

    #[test]
    fn rename_append_unpacks_source_sequence() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("a", "x").unwrap();
        doc.set_field("b", "y").unwrap();
        doc.rename_field("a", "b", RenameMode::Append).unwrap();
        assert_eq!(doc.get_string_list("b"), vec!["y".to_string(), "x".to_string()]);
    }

    #[test]
    fn rename_skip_leaves_destination_untouched() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("a", "x").unwrap();
        doc.set_field("b", "y").unwrap();
        doc.rename_field("a", "b", RenameMode::Skip).unwrap();
        assert_eq!(doc.get_string("b"), Some("y".to_string()));
        assert!(!doc.has("a"));
    }

    #[test]
    fn rename_round_trips_modulo_overwrite() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("a", "x").unwrap();
        doc.rename_field("a", "b", RenameMode::Overwrite).unwrap();
        doc.rename_field("b", "a", RenameMode::Overwrite).unwrap();
        assert_eq!(doc.get_string("a"), Some("x".to_string()));
    }

    #[test]
    fn set_or_add_all_splices_every_non_reserved_field() {
        let mut source = Document::new("src").unwrap();
        source.set_field("a", "1").unwrap();
        source.set_field("b", "2").unwrap();

        let mut dest = Document::new("dst").unwrap();
        dest.set_field("a", "0").unwrap();
        dest.set_or_add_all(&source).unwrap();

        assert_eq!(dest.get_string_list("a"), vec!["0".to_string(), "1".to_string()]);
        assert_eq!(dest.get_string("b"), Some("2".to_string()));
    }

    #[test]
    fn write_to_field_overwrite_resets_then_appends() {
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("tags", "stale").unwrap();
        doc.write_to_field(
            "tags",
            true,
            vec![ScalarValue::String("a".into()), ScalarValue::String("b".into())],
        )
        .unwrap();
        assert_eq!(doc.get_string_list("tags"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn json_round_trip_preserves_fields_and_children() {
        let mut doc = Document::new("parent").unwrap();
        doc.set_field("name", "Matt").unwrap();
        doc.add_child(Document::new("child").unwrap());

        let json = doc.as_map();
        let parsed = Document::from_json(json).unwrap();
        assert_eq!(parsed.id().as_str(), "parent");
        assert_eq!(parsed.get_string("name"), Some("Matt".to_string()));
        assert_eq!(parsed.children_len(), 1);
    }
}

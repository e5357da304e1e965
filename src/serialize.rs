//! Form data serialization.
//!
//! Submission reads every field in document order into name/value pairs,
//! then renders them either as a URL-encoded body or as a JSON object.
//! Choice groups contribute one pair per picked option, checkboxes only
//! contribute while ticked, and file inputs contribute the attached file
//! name. JSON payloads additionally fold repeated names into arrays and
//! apply [`FieldGroup`] nesting and extra top-level data.

use serde_json::Value;

use crate::document::FormDocument;
use crate::error::{FormError, FormResult};
use crate::field::{FieldDescriptor, FieldKind};

/// Wire format of the submission body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
	/// `application/x-www-form-urlencoded` pairs.
	#[default]
	UrlEncoded,
	/// A JSON object.
	Json,
}

/// Serialized form data, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	/// URL-encoded body.
	UrlEncoded(String),
	/// JSON body.
	Json(Value),
}

/// Nests a set of already-collected fields under one key.
///
/// The members disappear from the top level of the JSON object and
/// reappear inside a single-element array of one object under `name`,
/// which is the shape list-like backends ingest. URL-encoded payloads are
/// flat and ignore grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
	/// Key the members are nested under.
	pub name: String,
	/// Names of the fields to move into the group.
	pub members: Vec<String>,
}

impl FieldGroup {
	/// Creates a group from a key and its member field names.
	pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
		Self {
			name: name.into(),
			members,
		}
	}
}

/// Reads every field's current value into pairs, in document order.
///
/// Names on the ignore list never reach the payload.
pub(crate) fn collect_pairs(
	document: &dyn FormDocument,
	fields: &[FieldDescriptor],
	ignore: &[String],
) -> Vec<(String, String)> {
	let mut pairs = Vec::new();

	for field in fields {
		if ignore.iter().any(|name| *name == field.name) {
			continue;
		}
		match &field.kind {
			FieldKind::MultiChoice => {
				for value in document.checked_values(&field.name) {
					pairs.push((field.name.clone(), value));
				}
			}
			FieldKind::SingleCheckbox => {
				if document.is_checked(&field.name) {
					let value = document
						.value(&field.name)
						.filter(|value| !value.is_empty())
						.unwrap_or_else(|| "on".to_string());
					pairs.push((field.name.clone(), value));
				}
			}
			FieldKind::File => {
				if let Some(file) = document.file_info(&field.name) {
					pairs.push((field.name.clone(), file.name));
				}
			}
			_ => {
				let value = document.value(&field.name).unwrap_or_default();
				pairs.push((field.name.clone(), value));
			}
		}
	}

	pairs
}

/// Renders collected pairs in the requested format.
///
/// Extra fields are appended after everything read from the document, in
/// both formats.
pub(crate) fn build_payload(
	mut pairs: Vec<(String, String)>,
	format: PayloadFormat,
	groups: &[FieldGroup],
	extra_fields: &[(String, String)],
) -> FormResult<Payload> {
	match format {
		PayloadFormat::UrlEncoded => {
			pairs.extend(extra_fields.iter().cloned());
			let encoded = serde_urlencoded::to_string(&pairs)
				.map_err(|e| FormError::Encode(e.to_string()))?;
			Ok(Payload::UrlEncoded(encoded))
		}
		PayloadFormat::Json => Ok(Payload::Json(build_json(&pairs, groups, extra_fields))),
	}
}

fn build_json(
	pairs: &[(String, String)],
	groups: &[FieldGroup],
	extra_fields: &[(String, String)],
) -> Value {
	let mut object = serde_json::Map::new();

	for (name, value) in pairs {
		let value = Value::String(value.clone());
		match object.get_mut(name) {
			None => {
				object.insert(name.clone(), value);
			}
			Some(Value::Array(items)) => items.push(value),
			Some(existing) => {
				// A repeated name promotes the first value into an array.
				let first = existing.take();
				*existing = Value::Array(vec![first, value]);
			}
		}
	}

	for group in groups {
		let mut inner = serde_json::Map::new();
		for member in &group.members {
			if let Some(value) = object.remove(member) {
				inner.insert(member.clone(), value);
			}
		}
		object.insert(group.name.clone(), Value::Array(vec![Value::Object(inner)]));
	}

	for (name, value) in extra_fields {
		object.insert(name.clone(), Value::String(value.clone()));
	}

	Value::Object(object)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::MemoryDocument;
	use serde_json::json;

	fn sample_document() -> (MemoryDocument, Vec<FieldDescriptor>) {
		let fields = vec![
			FieldDescriptor::new("name"),
			FieldDescriptor::new("color").with_kind("radio"),
			FieldDescriptor::new("terms").with_kind("single-checkbox"),
			FieldDescriptor::new("avatar").with_kind("file"),
			FieldDescriptor::new("comment"),
		];
		let mut document = MemoryDocument::new();
		for field in &fields {
			document = document.with_field(field.clone());
		}
		document.set_value("name", "Ada");
		document.set_checked_values("color", vec!["red".to_string(), "blue".to_string()]);
		document.set_checked("terms", true);
		(document, fields)
	}

	#[test]
	fn test_pairs_follow_document_order() {
		// Arrange
		let (document, fields) = sample_document();

		// Act
		let pairs = collect_pairs(&document, &fields, &[]);

		// Assert: one pair per picked option, ticked checkbox falls back to
		// "on", the empty file input is skipped, the empty text stays
		assert_eq!(
			pairs,
			vec![
				("name".to_string(), "Ada".to_string()),
				("color".to_string(), "red".to_string()),
				("color".to_string(), "blue".to_string()),
				("terms".to_string(), "on".to_string()),
				("comment".to_string(), String::new()),
			],
		);
	}

	#[test]
	fn test_ignored_names_never_reach_the_payload() {
		// Arrange
		let (document, fields) = sample_document();

		// Act
		let pairs = collect_pairs(&document, &fields, &["comment".to_string()]);

		// Assert
		assert!(!pairs.iter().any(|(name, _)| name == "comment"));
		assert!(pairs.iter().any(|(name, _)| name == "name"));
	}

	#[test]
	fn test_unticked_checkbox_is_left_out() {
		// Arrange
		let (mut document, fields) = sample_document();
		document.set_checked("terms", false);

		// Act
		let pairs = collect_pairs(&document, &fields, &[]);

		// Assert
		assert!(!pairs.iter().any(|(name, _)| name == "terms"));
	}

	#[test]
	fn test_attached_file_contributes_its_name() {
		// Arrange
		let (mut document, fields) = sample_document();
		document.attach_file("avatar", "me.png", 1_024);

		// Act
		let pairs = collect_pairs(&document, &fields, &[]);

		// Assert
		assert!(pairs.contains(&("avatar".to_string(), "me.png".to_string())));
	}

	#[test]
	fn test_url_encoded_repeats_names() {
		// Arrange
		let (document, fields) = sample_document();
		let pairs = collect_pairs(&document, &fields, &[]);

		// Act
		let payload = build_payload(pairs, PayloadFormat::UrlEncoded, &[], &[]).unwrap();

		// Assert
		assert_eq!(
			payload,
			Payload::UrlEncoded("name=Ada&color=red&color=blue&terms=on&comment=".to_string()),
		);
	}

	#[test]
	fn test_json_folds_repeated_names_into_arrays() {
		// Arrange
		let (document, fields) = sample_document();
		let pairs = collect_pairs(&document, &fields, &[]);

		// Act
		let payload = build_payload(pairs, PayloadFormat::Json, &[], &[]).unwrap();

		// Assert
		assert_eq!(
			payload,
			Payload::Json(json!({
				"name": "Ada",
				"color": ["red", "blue"],
				"terms": "on",
				"comment": "",
			})),
		);
	}

	#[test]
	fn test_groups_nest_members_under_one_key() {
		// Arrange
		let (document, fields) = sample_document();
		let pairs = collect_pairs(&document, &fields, &[]);
		let groups = vec![FieldGroup::new(
			"contact",
			vec!["name".to_string(), "comment".to_string()],
		)];

		// Act
		let payload = build_payload(pairs, PayloadFormat::Json, &groups, &[]).unwrap();

		// Assert
		assert_eq!(
			payload,
			Payload::Json(json!({
				"color": ["red", "blue"],
				"terms": "on",
				"contact": [{ "name": "Ada", "comment": "" }],
			})),
		);
	}

	#[test]
	fn test_extra_fields_land_in_both_formats() {
		// Arrange
		let (document, fields) = sample_document();
		let extra = vec![("source".to_string(), "landing".to_string())];

		// Act
		let json = build_payload(
			collect_pairs(&document, &fields, &[]),
			PayloadFormat::Json,
			&[],
			&extra,
		)
		.unwrap();
		let encoded = build_payload(
			collect_pairs(&document, &fields, &[]),
			PayloadFormat::UrlEncoded,
			&[],
			&extra,
		)
		.unwrap();

		// Assert
		let Payload::Json(value) = json else {
			panic!("expected a JSON payload");
		};
		assert_eq!(value["source"], json!("landing"));
		assert_eq!(value["name"], json!("Ada"));
		let Payload::UrlEncoded(body) = encoded else {
			panic!("expected a URL-encoded payload");
		};
		assert!(body.ends_with("&source=landing"));
	}
}

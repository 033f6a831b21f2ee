use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A raw source record as it appears in one of the JSON collections.
///
/// Fields are decoded leniently: numbers are accepted wherever text is expected
/// and a lone string is accepted wherever a list is expected. Anything not named
/// here is kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
	/// Explicit id; generated by the builder when absent.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Display name.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Some technology records spell the label field with a capital letter.
	#[serde(
		rename = "Label",
		deserialize_with = "lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub label_alt: Option<String>,
	/// Free-form date: a year, a range or a reign-era phrase.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub year: Option<String>,
	/// Dynasty or era name (technologies use it instead of `year`).
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub period: Option<String>,
	/// Dynasty name, matched exactly.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub dynasty: Option<String>,
	/// Long description.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Short details shown in tooltips.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub details: Option<String>,
	/// Project category.
	#[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// The record's own `type` field (technology and flood records use it as category).
	#[serde(
		rename = "type",
		deserialize_with = "lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub kind: Option<String>,
	/// Id or label of the preceding project.
	#[serde(
		rename = "prevProject",
		deserialize_with = "lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub prev_project: Option<String>,
	/// Id or label of the following project.
	#[serde(
		rename = "nextProject",
		deserialize_with = "lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub next_project: Option<String>,
	/// Ids or labels of technologies this record applies.
	#[serde(
		rename = "techChain",
		deserialize_with = "lenient_list",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub tech_chain: Vec<String>,
	/// Ids or labels of related records.
	#[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
	pub related: Vec<String>,
	/// Every field not named above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Record {
	/// A record carrying only a label, mostly useful in tests.
	pub fn labelled(label: impl Into<String>) -> Self {
		Self {
			label: Some(label.into()),
			..Self::default()
		}
	}

	/// The explicit id, ignoring blank strings.
	pub fn explicit_id(&self) -> Option<&str> {
		non_blank(self.id.as_deref())
	}

	/// A field without a typed slot, as non-blank text.
	pub fn extra_text(&self, key: &str) -> Option<String> {
		let text = self.extra.get(key).and_then(scalar_text)?;
		non_blank(Some(&text)).map(str::to_string)
	}
}

/// Returns the trimmed text when it has any content.
pub(crate) fn non_blank(text: Option<&str>) -> Option<&str> {
	text.map(str::trim).filter(|t| !t.is_empty())
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	Ok(scalar_text(&value))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	Ok(match value {
		Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
		Value::String(s) => vec![s],
		_ => Vec::new(),
	})
}

/// Coerces one input collection into a list of records.
///
/// Arrays are taken as-is. Objects with at least one numeric key are treated as
/// array-like and contribute their values in index order. Any other object
/// becomes a single record and everything else yields nothing. Null entries and
/// entries that are not objects are skipped.
pub fn coerce_collection(collection: &str, value: &Value) -> Vec<Record> {
	let items: Vec<&Value> = match value {
		Value::Array(items) => items.iter().collect(),
		Value::Object(map) if map.keys().any(|k| k.trim().parse::<i64>().is_ok()) => {
			// Numeric keys in numeric order, then the rest in key order.
			let mut entries: Vec<(Option<i64>, &Value)> = map
				.iter()
				.map(|(k, v)| (k.trim().parse::<i64>().ok(), v))
				.collect();
			entries.sort_by_key(|(index, _)| index.map_or((1, 0), |n| (0, n)));
			entries.into_iter().map(|(_, v)| v).collect()
		}
		Value::Object(_) => vec![value],
		_ => Vec::new(),
	};

	items
		.into_iter()
		.filter(|item| item.is_object())
		.filter_map(|item| match Record::deserialize(item) {
			Ok(record) => Some(record),
			Err(err) => {
				warn!("skipping malformed {} record: {}", collection, err);
				None
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn numbers_decode_as_text() {
		let records = coerce_collection("projects", &json!([{ "id": 7, "year": 1276 }]));
		assert_eq!(records[0].id.as_deref(), Some("7"));
		assert_eq!(records[0].year.as_deref(), Some("1276"));
	}

	#[test]
	fn single_string_list_becomes_vec() {
		let records = coerce_collection("floods", &json!([{ "label": "x", "related": "都江堰" }]));
		assert_eq!(records[0].related, vec!["都江堰".to_string()]);
	}

	#[test]
	fn unknown_fields_are_kept() {
		let records = coerce_collection("projects", &json!([{ "label": "x", "location": "四川" }]));
		assert_eq!(records[0].extra.get("location"), Some(&json!("四川")));
		assert_eq!(records[0].extra_text("location").as_deref(), Some("四川"));
		assert_eq!(records[0].extra_text("builder"), None);
	}

	#[test]
	fn capitalised_label_is_read() {
		let records = coerce_collection("technologies", &json!([{ "Label": "鱼嘴" }]));
		assert_eq!(records[0].label_alt.as_deref(), Some("鱼嘴"));
		assert_eq!(records[0].label, None);
	}

	#[test]
	fn collection_shapes() {
		assert!(coerce_collection("p", &Value::Null).is_empty());
		assert!(coerce_collection("p", &json!("text")).is_empty());
		assert_eq!(coerce_collection("p", &json!({ "label": "single" })).len(), 1);
		let array_like = json!({ "0": { "label": "a" }, "1": { "label": "b" } });
		assert_eq!(coerce_collection("p", &array_like).len(), 2);
		assert_eq!(coerce_collection("p", &json!([null, { "label": "a" }, 3])).len(), 1);
	}

	#[test]
	fn array_like_keeps_index_order() {
		let mut array_like = serde_json::Map::new();
		for i in 0..=10 {
			array_like.insert(i.to_string(), json!({ "label": format!("n{i}") }));
		}
		let labels: Vec<String> = coerce_collection("p", &Value::Object(array_like))
			.into_iter()
			.filter_map(|r| r.label)
			.collect();
		let expected: Vec<String> = (0..=10).map(|i| format!("n{i}")).collect();
		assert_eq!(labels, expected);
	}

	#[test]
	fn blank_ids_are_not_explicit() {
		let record = Record {
			id: Some("  ".into()),
			..Record::default()
		};
		assert_eq!(record.explicit_id(), None);
	}
}

//! Shape coercion for extracted records.
//!
//! A parsed object is normalized so downstream code can rely on field
//! shapes: list fields hold strings, map fields are objects, sentiment
//! labels sit on the fixed three-value scale. Fields outside the standard
//! set pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sovrank_core::{BrandMention, Sentiment};

/// Keys coerced to a list of strings.
const LIST_KEYS: [&str; 2] = ["brand_list", "spu_list"];

/// One annotator record with its standard fields guaranteed present and
/// well-shaped.
///
/// Serializes as the bare JSON object, so records round-trip to the same
/// shape they were extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord {
    pub fields: Map<String, Value>,
}

impl ExtractedRecord {
    /// Brand names exactly as the annotator wrote them.
    #[must_use]
    pub fn brand_list(&self) -> Vec<String> {
        self.string_field("brand_list")
    }

    /// Product (SPU) names exactly as the annotator wrote them.
    #[must_use]
    pub fn spu_list(&self) -> Vec<String> {
        self.string_field("spu_list")
    }

    /// One mention per listed brand, carrying sentiment and evaluation
    /// keywords where the annotator provided them.
    #[must_use]
    pub fn brands(&self) -> Vec<BrandMention> {
        let emotions = self.fields.get("emotion_dict").and_then(Value::as_object);
        let evaluations = self.fields.get("evaluation_dict").and_then(Value::as_object);

        self.brand_list()
            .into_iter()
            .map(|surface_form| {
                let sentiment = emotions
                    .and_then(|map| map.get(&surface_form))
                    .and_then(Value::as_str)
                    .map(Sentiment::from_label);
                let keywords = evaluations
                    .and_then(|map| map.get(&surface_form))
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                BrandMention {
                    surface_form,
                    sentiment,
                    keywords,
                }
            })
            .collect()
    }

    fn string_field(&self, key: &str) -> Vec<String> {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Normalizes the standard fields in place. Missing fields are inserted
/// with empty values, wrongly-typed ones replaced, everything else kept.
pub(crate) fn coerce_record(mut fields: Map<String, Value>) -> ExtractedRecord {
    for key in LIST_KEYS {
        let items = fields.get(key).map(string_items).unwrap_or_default();
        fields.insert(
            key.to_string(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
    }

    let emotions = coerce_emotions(fields.get("emotion_dict"));
    fields.insert("emotion_dict".to_string(), Value::Object(emotions));

    let evaluations = coerce_evaluations(fields.get("evaluation_dict"));
    fields.insert("evaluation_dict".to_string(), Value::Object(evaluations));

    ExtractedRecord { fields }
}

/// List coercion: arrays keep their scalar entries, a bare string becomes
/// a single-entry list, anything else is empty.
fn string_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Every emotion value is forced onto the canonical label, unknown or
/// non-string labels included.
fn coerce_emotions(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(raw)) => raw
            .iter()
            .map(|(brand, label)| {
                let sentiment = Sentiment::from_label(label.as_str().unwrap_or_default());
                (brand.clone(), Value::String(sentiment.to_string()))
            })
            .collect(),
        _ => Map::new(),
    }
}

fn coerce_evaluations(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(raw)) => raw
            .iter()
            .map(|(brand, words)| {
                let list = string_items(words);
                (
                    brand.clone(),
                    Value::Array(list.into_iter().map(Value::String).collect()),
                )
            })
            .collect(),
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ExtractedRecord {
        match value {
            Value::Object(map) => coerce_record(map),
            other => panic!("fixture must be an object, got: {other:?}"),
        }
    }

    #[test]
    fn missing_standard_fields_default_to_empty() {
        let coerced = record(json!({}));
        assert_eq!(coerced.fields.get("brand_list"), Some(&json!([])));
        assert_eq!(coerced.fields.get("spu_list"), Some(&json!([])));
        assert_eq!(coerced.fields.get("emotion_dict"), Some(&json!({})));
        assert_eq!(coerced.fields.get("evaluation_dict"), Some(&json!({})));
    }

    #[test]
    fn brand_list_keeps_strings_and_stringifies_scalars() {
        let coerced = record(json!({
            "brand_list": ["Aveda", 42, true, {"nested": 1}, "  ", " OR "]
        }));
        assert_eq!(coerced.brand_list(), vec!["Aveda", "42", "true", "OR"]);
    }

    #[test]
    fn bare_string_brand_list_becomes_single_entry() {
        let coerced = record(json!({"brand_list": " Aveda "}));
        assert_eq!(coerced.brand_list(), vec!["Aveda"]);
    }

    #[test]
    fn non_list_brand_list_becomes_empty() {
        let coerced = record(json!({"brand_list": {"not": "a list"}}));
        assert!(coerced.brand_list().is_empty());

        let coerced = record(json!({"spu_list": 7}));
        assert!(coerced.spu_list().is_empty());
    }

    #[test]
    fn sentiment_labels_normalize_to_the_fixed_scale() {
        let coerced = record(json!({
            "emotion_dict": {
                "A": "正向",
                "B": "negative",
                "C": "no idea what this is",
                "D": 5
            }
        }));
        assert_eq!(
            coerced.fields.get("emotion_dict"),
            Some(&json!({
                "A": "positive",
                "B": "negative",
                "C": "neutral",
                "D": "neutral"
            }))
        );
    }

    #[test]
    fn non_object_emotion_dict_becomes_empty() {
        let coerced = record(json!({"emotion_dict": ["positive"]}));
        assert_eq!(coerced.fields.get("emotion_dict"), Some(&json!({})));
    }

    #[test]
    fn evaluation_values_always_become_lists() {
        let coerced = record(json!({
            "evaluation_dict": {
                "A": "好用",
                "B": ["香", 3],
                "C": 9
            }
        }));
        assert_eq!(
            coerced.fields.get("evaluation_dict"),
            Some(&json!({
                "A": ["好用"],
                "B": ["香", "3"],
                "C": []
            }))
        );
    }

    #[test]
    fn unknown_fields_survive_coercion() {
        let coerced = record(json!({
            "brand_list": ["X"],
            "extra": {"deep": [1, 2]},
            "note": "keep me"
        }));
        assert_eq!(coerced.fields.get("extra"), Some(&json!({"deep": [1, 2]})));
        assert_eq!(coerced.fields.get("note"), Some(&json!("keep me")));
    }

    #[test]
    fn record_serializes_as_the_bare_object() {
        let coerced = record(json!({"brand_list": ["X"], "note": "n"}));
        let value = serde_json::to_value(&coerced).expect("serialize");
        assert_eq!(
            value,
            json!({
                "brand_list": ["X"],
                "spu_list": [],
                "emotion_dict": {},
                "evaluation_dict": {},
                "note": "n"
            })
        );

        let back: ExtractedRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, coerced);
    }

    #[test]
    fn brands_view_joins_sentiment_and_keywords() {
        let coerced = record(json!({
            "brand_list": ["Aveda", "OR"],
            "emotion_dict": {"Aveda": "正向"},
            "evaluation_dict": {"Aveda": ["好用", "香"]}
        }));

        let mentions = coerced.brands();
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].surface_form, "Aveda");
        assert_eq!(mentions[0].sentiment, Some(Sentiment::Positive));
        assert_eq!(mentions[0].keywords, vec!["好用", "香"]);
        assert_eq!(mentions[1].surface_form, "OR");
        assert_eq!(mentions[1].sentiment, None);
        assert!(mentions[1].keywords.is_empty());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------- Records flowing through the pipeline ----------

/// Best-effort structured view of the user's free text, as returned by the
/// completion service. Nothing is guaranteed: a field the model could not
/// extract, or extracted with the wrong type, is `None`. Validation is the
/// only integrity gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedRecord {
    pub sex: Option<String>,
    pub age: Option<f64>,
    pub time_5km_s: Option<f64>,
}

impl ExtractedRecord {
    /// Build a record from an arbitrary JSON object, dropping absent or
    /// wrong-typed fields to `None`.
    pub fn from_json(v: &Value) -> Self {
        Self {
            sex: v.get("sex").and_then(Value::as_str).map(str::to_owned),
            age: v.get("age").and_then(Value::as_f64),
            time_5km_s: v.get("time_5km_s").and_then(Value::as_f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Wire code used by the extractor and the training data: M / K.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "K" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// A record that passed every validation rule. Only the validator constructs
/// this, so the prediction path never sees a malformed feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedRecord {
    pub sex: Sex,
    pub age: f64,
    pub time_5km_s: f64,
}

// ---------- Pipeline outcome ----------

/// Terminal state of one pipeline run. Exactly one branch applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Validation rejected the extracted record; prediction never ran.
    Rejected {
        parsed: ExtractedRecord,
        errors: Vec<String>,
    },
    /// The full pipeline ran and produced a prediction.
    Predicted {
        parsed: ExtractedRecord,
        seconds: f64,
        formatted: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_reads_well_typed_fields() {
        let rec = ExtractedRecord::from_json(&json!({
            "sex": "M", "age": 35, "time_5km_s": 1500
        }));
        assert_eq!(rec.sex.as_deref(), Some("M"));
        assert_eq!(rec.age, Some(35.0));
        assert_eq!(rec.time_5km_s, Some(1500.0));
    }

    #[test]
    fn from_json_drops_absent_and_wrong_typed_fields() {
        let rec = ExtractedRecord::from_json(&json!({
            "sex": 1, "age": "thirty", "time_5km_s": null
        }));
        assert_eq!(rec, ExtractedRecord::default());
    }

    #[test]
    fn sex_codes_map_to_variants() {
        assert_eq!(Sex::from_code("M"), Some(Sex::Male));
        assert_eq!(Sex::from_code("K"), Some(Sex::Female));
        assert_eq!(Sex::from_code("X"), None);
        assert_eq!(Sex::from_code("m"), None);
    }
}

use crate::types::{ExtractedRecord, Sex, ValidatedRecord};

pub const MIN_AGE: f64 = 18.0;
pub const MAX_AGE: f64 = 80.0;

/// Check an extracted record against the fixed domain rules.
///
/// All three checks run unconditionally; every violated rule contributes one
/// message, in the fixed order sex, age, time. An empty error list means the
/// record is safe to feed to the model, and is returned as a
/// [`ValidatedRecord`].
pub fn validate(rec: &ExtractedRecord) -> Result<ValidatedRecord, Vec<String>> {
    let mut errors = Vec::new();

    let sex = rec.sex.as_deref().and_then(Sex::from_code);
    if sex.is_none() {
        errors.push("Missing or invalid sex (expected M or K)".to_string());
    }

    let age = rec
        .age
        .filter(|a| a.fract() == 0.0 && (MIN_AGE..=MAX_AGE).contains(a));
    if age.is_none() {
        errors.push("Missing or invalid age (expected 18-80)".to_string());
    }

    let time_5km_s = rec.time_5km_s.filter(|t| *t > 0.0);
    if time_5km_s.is_none() {
        errors.push("Missing or invalid 5 km time".to_string());
    }

    match (sex, age, time_5km_s) {
        (Some(sex), Some(age), Some(time_5km_s)) => Ok(ValidatedRecord {
            sex,
            age,
            time_5km_s,
        }),
        _ => Err(errors),
    }
}

use crate::error::EncodingError;
use model::{
    core::value::Value,
    records::row::{Row, RowIndex},
    scoring::payload::ScoreRequestPayload,
};
use serde_json::{Map, Number, Value as Json};
use std::num::NonZeroUsize;

pub const DEFAULT_ENVELOPE_KEY: &str = "examples";

/// Renders predictor rows as `{"<envelope>": [ {column: value, ...}, ... ]}`.
///
/// Columns keep their order, missing values become JSON `null`, and values
/// with no scalar JSON form are rejected before anything is sent.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    envelope_key: String,
}

impl Default for RequestEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_ENVELOPE_KEY)
    }
}

impl RequestEncoder {
    pub fn new(envelope_key: impl Into<String>) -> Self {
        Self {
            envelope_key: envelope_key.into(),
        }
    }

    pub fn encode(&self, row: &Row) -> Result<ScoreRequestPayload, EncodingError> {
        Ok(self.envelope(vec![row.index], vec![encode_row(row)?]))
    }

    /// Groups `rows` into payloads of at most `per_request` examples, in order.
    /// Every row is encoded before the first payload is returned.
    pub fn encode_batch(
        &self,
        rows: &[Row],
        per_request: NonZeroUsize,
    ) -> Result<Vec<ScoreRequestPayload>, EncodingError> {
        let examples = rows
            .iter()
            .map(|r| Ok((r.index, encode_row(r)?)))
            .collect::<Result<Vec<_>, EncodingError>>()?;
        Ok(self.group(examples, per_request))
    }

    /// Like [`encode_batch`](Self::encode_batch), but rows that cannot be
    /// encoded are left out and handed back with their error.
    pub fn encode_batch_lenient(
        &self,
        rows: &[Row],
        per_request: NonZeroUsize,
    ) -> (Vec<ScoreRequestPayload>, Vec<(RowIndex, EncodingError)>) {
        let mut examples = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for row in rows {
            match encode_row(row) {
                Ok(example) => examples.push((row.index, example)),
                Err(err) => rejected.push((row.index, err)),
            }
        }
        (self.group(examples, per_request), rejected)
    }

    fn group(
        &self,
        examples: Vec<(RowIndex, Json)>,
        per_request: NonZeroUsize,
    ) -> Vec<ScoreRequestPayload> {
        examples
            .chunks(per_request.get())
            .map(|chunk| {
                let (indices, examples) = chunk.iter().cloned().unzip();
                self.envelope(indices, examples)
            })
            .collect()
    }

    fn envelope(&self, indices: Vec<RowIndex>, examples: Vec<Json>) -> ScoreRequestPayload {
        let mut body = Map::new();
        body.insert(self.envelope_key.clone(), Json::Array(examples));
        ScoreRequestPayload {
            indices,
            body: Json::Object(body),
        }
    }
}

fn encode_row(row: &Row) -> Result<Json, EncodingError> {
    let mut map = Map::with_capacity(row.fields.len());
    for field in &row.fields {
        map.insert(field.name.clone(), encode_value(&field.name, row.index, &field.value)?);
    }
    Ok(Json::Object(map))
}

fn encode_value(column: &str, index: RowIndex, value: &Value) -> Result<Json, EncodingError> {
    let json = match value {
        Value::Null => Json::Null,
        Value::Float(v) if v.is_nan() => Json::Null,
        Value::Float(v) => Number::from_f64(*v)
            .map(Json::Number)
            .ok_or_else(|| EncodingError::NonFinite {
                column: column.to_string(),
                index,
            })?,
        Value::Int(v) => Json::from(*v),
        Value::Boolean(v) => Json::Bool(*v),
        Value::String(v) => Json::String(v.clone()),
        Value::Json(v) if value.is_scalar() => v.clone(),
        Value::Json(_) => {
            return Err(EncodingError::NonScalar {
                column: column.to_string(),
                index,
            });
        }
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::FieldValue;
    use serde_json::json;

    fn row(index: usize, fields: Vec<(&str, Value)>) -> Row {
        Row::new(
            index,
            fields
                .into_iter()
                .map(|(n, v)| FieldValue::new(n, v))
                .collect(),
        )
    }

    #[test]
    fn wraps_row_in_envelope_with_column_order() {
        let encoder = RequestEncoder::default();
        let payload = encoder
            .encode(&row(
                4,
                vec![
                    ("VALUE", Value::Float(39025.0)),
                    ("LOAN", Value::Int(1100)),
                    ("REASON", "HomeImp".into()),
                ],
            ))
            .unwrap();

        assert_eq!(payload.indices, vec![RowIndex(4)]);
        assert_eq!(
            String::from_utf8(payload.to_bytes()).unwrap(),
            r#"{"examples":[{"VALUE":39025.0,"LOAN":1100,"REASON":"HomeImp"}]}"#
        );
    }

    #[test]
    fn missing_values_become_null() {
        let encoder = RequestEncoder::new("instances");
        let payload = encoder
            .encode(&row(
                0,
                vec![("MORTDUE", Value::Null), ("DEBTINC", Value::Float(f64::NAN))],
            ))
            .unwrap();

        assert_eq!(
            payload.body,
            json!({"instances": [{"MORTDUE": null, "DEBTINC": null}]})
        );
        let text = String::from_utf8(payload.to_bytes()).unwrap();
        assert!(!text.contains("nan") && !text.contains("NaN"));
    }

    #[test]
    fn rejects_nested_and_infinite_values() {
        let encoder = RequestEncoder::default();
        let nested = encoder
            .encode(&row(2, vec![("TAGS", Value::Json(json!(["a", "b"])))]))
            .unwrap_err();
        assert_eq!(
            nested,
            EncodingError::NonScalar {
                column: "TAGS".into(),
                index: RowIndex(2)
            }
        );

        let infinite = encoder
            .encode(&row(3, vec![("CLAGE", Value::Float(f64::INFINITY))]))
            .unwrap_err();
        assert!(matches!(infinite, EncodingError::NonFinite { .. }));
    }

    #[test]
    fn batches_keep_row_order() {
        let encoder = RequestEncoder::default();
        let rows: Vec<Row> = (0..5)
            .map(|i| row(i, vec![("LOAN", Value::Int(i as i64))]))
            .collect();

        let payloads = encoder
            .encode_batch(&rows, NonZeroUsize::new(2).unwrap())
            .unwrap();

        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0].indices, vec![RowIndex(0), RowIndex(1)]);
        assert_eq!(payloads[2].indices, vec![RowIndex(4)]);
        assert_eq!(
            payloads[1].body,
            json!({"examples": [{"LOAN": 2}, {"LOAN": 3}]})
        );
    }

    #[test]
    fn batch_fails_before_any_payload_when_a_row_is_bad() {
        let encoder = RequestEncoder::default();
        let rows = vec![
            row(0, vec![("LOAN", Value::Int(1))]),
            row(1, vec![("LOAN", Value::Json(json!({"a": 1})))]),
        ];
        assert!(encoder.encode_batch(&rows, NonZeroUsize::MIN).is_err());
    }

    #[test]
    fn lenient_batch_sets_bad_rows_aside() {
        let encoder = RequestEncoder::default();
        let rows = vec![
            row(0, vec![("LOAN", Value::Int(1100))]),
            row(1, vec![("LOAN", Value::Float(f64::INFINITY))]),
            row(2, vec![("LOAN", Value::Int(1300))]),
            row(3, vec![("LOAN", Value::Int(1500))]),
        ];

        let (payloads, rejected) =
            encoder.encode_batch_lenient(&rows, NonZeroUsize::new(2).unwrap());

        let indices: Vec<Vec<RowIndex>> = payloads.iter().map(|p| p.indices.clone()).collect();
        assert_eq!(
            indices,
            vec![vec![RowIndex(0), RowIndex(2)], vec![RowIndex(3)]]
        );
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, RowIndex(1));
        assert!(matches!(rejected[0].1, EncodingError::NonFinite { .. }));
    }
}

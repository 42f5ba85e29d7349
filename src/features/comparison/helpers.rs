use jsonschema::JSONSchema;
use serde_json::{Value, json};

use crate::core::error::AppError;
use crate::features::news::Outlet;

const OUTPUT_FIELDS: [&str; 4] = [
    "liberal_summary",
    "conservative_summary",
    "bias_notes",
    "blind_spots",
];

/// The shape the model is asked to answer with. Each field may come back as
/// a string or as a list of bullet strings.
pub fn comparison_output_schema() -> Value {
    output_schema(&OUTPUT_FIELDS)
}

/// The answer shape when only `outlet` could be fetched: its summary plus
/// the framing and blind-spot analysis.
pub fn single_outlet_output_schema(outlet: Outlet) -> Value {
    output_schema(&[summary_field(outlet), "bias_notes", "blind_spots"])
}

pub(super) fn summary_field(outlet: Outlet) -> &'static str {
    match outlet {
        Outlet::Liberal => "liberal_summary",
        Outlet::Conservative => "conservative_summary",
    }
}

fn output_schema(fields: &[&str]) -> Value {
    let field = json!({
        "oneOf": [
            { "type": "string", "minLength": 1 },
            {
                "type": "array",
                "minItems": 1,
                "items": { "type": "string" }
            }
        ]
    });

    let properties = fields
        .iter()
        .map(|name| (name.to_string(), field.clone()))
        .collect::<serde_json::Map<_, _>>();

    json!({
        "type": "object",
        "required": fields,
        "properties": properties
    })
}

pub(super) fn compile_output_schema(schema: &Value) -> Result<JSONSchema, AppError> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|err| AppError::internal(format!("invalid comparison schema: {err}")))?;
    Ok(compiled)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ComparisonFields {
    pub liberal_summary: String,
    pub conservative_summary: String,
    pub bias_notes: String,
    pub blind_spots: String,
}

/// Parses the model's answer, tolerating a Markdown code fence or chatter
/// around the JSON object.
pub(super) fn parse_comparison_output(
    schema: &JSONSchema,
    raw: &str,
) -> Result<ComparisonFields, AppError> {
    let candidate = extract_json_object(raw).ok_or_else(|| {
        AppError::generation(format!(
            "model output contained no JSON object: {}",
            snippet(raw)
        ))
    })?;

    let value: Value = serde_json::from_str(candidate)
        .map_err(|err| AppError::generation(format!("model output is not valid JSON: {err}")))?;

    if let Err(errors) = schema.validate(&value) {
        let details = errors
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::generation(format!(
            "model output did not match the comparison schema: {details}"
        )));
    }

    Ok(ComparisonFields {
        liberal_summary: field_text(&value, "liberal_summary"),
        conservative_summary: field_text(&value, "conservative_summary"),
        bias_notes: field_text(&value, "bias_notes"),
        blind_spots: field_text(&value, "blind_spots"),
    })
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

fn field_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| {
                let item = item.trim().trim_start_matches(['-', '*', '•']).trim();
                format!("- {item}")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn snippet(raw: &str) -> String {
    raw.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> JSONSchema {
        compile_output_schema(&comparison_output_schema()).expect("schema compiles")
    }

    #[test]
    fn accepts_fenced_json_with_bullet_lists() {
        let raw = "```json\n{\"liberal_summary\": [\"- Bill passes\", \"Dems cheer\"], \"conservative_summary\": \"Spending concerns\", \"bias_notes\": \"Tone differs\", \"blind_spots\": [\"Cost estimates\"]}\n```";
        let fields = parse_comparison_output(&schema(), raw).expect("parsed");

        assert_eq!(fields.liberal_summary, "- Bill passes\n- Dems cheer");
        assert_eq!(fields.conservative_summary, "Spending concerns");
        assert_eq!(fields.blind_spots, "- Cost estimates");
    }

    #[test]
    fn rejects_missing_fields() {
        let raw = r#"{"liberal_summary": "a", "conservative_summary": "b", "bias_notes": "c"}"#;
        let err = parse_comparison_output(&schema(), raw).unwrap_err();
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("schema")));
    }

    #[test]
    fn rejects_wrong_types_and_prose() {
        let raw = r#"{"liberal_summary": 4, "conservative_summary": "b", "bias_notes": "c", "blind_spots": "d"}"#;
        assert!(parse_comparison_output(&schema(), raw).is_err());

        let err = parse_comparison_output(&schema(), "I cannot help with that.").unwrap_err();
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("no JSON object")));

        assert!(parse_comparison_output(&schema(), "{ not json }").is_err());
    }

    #[test]
    fn single_outlet_schema_omits_the_missing_summary() {
        let schema = compile_output_schema(&single_outlet_output_schema(Outlet::Conservative))
            .expect("schema compiles");
        let raw = r#"{"conservative_summary": ["Costs questioned"], "bias_notes": "Stresses spending", "blind_spots": "Relief for states"}"#;

        let fields = parse_comparison_output(&schema, raw).expect("parsed");

        assert_eq!(fields.conservative_summary, "- Costs questioned");
        assert_eq!(fields.liberal_summary, "");

        let missing = r#"{"conservative_summary": "a", "bias_notes": "b"}"#;
        assert!(parse_comparison_output(&schema, missing).is_err());
    }
}

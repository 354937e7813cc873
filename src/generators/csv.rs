//! CSV generator.
//!
//! Templates are plain text rendered without escaping. `csv_quote`, `csv_join`
//! and `csv_str` are available as filters and functions:
//!
//! ```text
//! id,name
//! {% for row in rows %}{{ row.id | csv_str }},{{ row.name | csv_quote }}
//! {% endfor %}
//! ```

use minijinja::AutoEscape;
use serde_json::Value;

use super::traits::Generator;
use super::{render_template, GeneratedOutput, GeneratorError, GeneratorKind};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvGenerator;

impl CsvGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for CsvGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Csv
    }

    fn generate(
        &self,
        template_source: &str,
        data: &Value,
    ) -> Result<GeneratedOutput, GeneratorError> {
        let rendered = render_template(AutoEscape::None, template_source, data)?;
        Ok(GeneratedOutput {
            bytes: rendered.into_bytes(),
            content_type: CSV_CONTENT_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, data: Value) -> String {
        let out = CsvGenerator::new().generate(source, &data).unwrap();
        assert_eq!(out.content_type, "text/csv");
        String::from_utf8(out.bytes).unwrap()
    }

    #[test]
    fn test_renders_row_template() {
        let out = render("id,name\n{{ id }},{{ name }}", json!({"id": 1, "name": "Ann"}));
        assert_eq!(out, "id,name\n1,Ann");
    }

    #[test]
    fn test_helpers_as_filters_and_functions() {
        let data = json!({
            "note": "He said \"hi\", ok",
            "tags": ["a", "b,c"],
            "price": 3.0,
            "missing": null
        });
        assert_eq!(
            render("{{ note | csv_quote }}", data.clone()),
            r#""He said ""hi"", ok""#
        );
        assert_eq!(render("{{ csv_join(tags) }}", data.clone()), r#"a,"b,c""#);
        assert_eq!(render("{{ price | csv_str }}", data.clone()), "3");
        assert_eq!(render("[{{ missing | csv_str }}]", data), "[]");
    }

    #[test]
    fn test_does_not_html_escape() {
        let out = render("{{ name }}", json!({"name": "<b>&"}));
        assert_eq!(out, "<b>&");
    }

    #[test]
    fn test_loops_over_rows() {
        let data = json!({"rows": [{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo, Jr"}]});
        let out = render(
            "{% for row in rows %}{{ row.id }},{{ row.name | csv_quote }}\n{% endfor %}",
            data,
        );
        assert_eq!(out, "1,Ann\n2,\"Bo, Jr\"\n");
    }

    #[test]
    fn test_non_object_payload_is_bound_to_data() {
        let out = render("{{ data | csv_join }}", json!(["x", "y"]));
        assert_eq!(out, "x,y");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = CsvGenerator::new()
            .generate("{% for x in %}", &json!({}))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateSyntax(_)));
        assert!(!err.is_conversion());
    }
}

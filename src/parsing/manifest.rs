use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::core::manifest::{Coordinate, CoordinateId, DiagramManifest};
use crate::core::types::ValidationMode;

/// Why a manifest was rejected. Callers above the parser treat every variant
/// as the same invalid-manifest outcome; the detail is for logs.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("content is an HTML page, not JSON")]
    HtmlPage,

    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("manifest failed {0} validation")]
    Structure(ValidationMode),
}

/// Detect an HTML error page served in place of a JSON file
#[must_use]
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Parse and validate manifest text
///
/// # Errors
///
/// Returns `ManifestError::HtmlPage` for HTML content, `ManifestError::Syntax`
/// for malformed JSON, or `ManifestError::Structure` if validation fails.
pub fn parse_manifest(text: &str, mode: ValidationMode) -> Result<DiagramManifest, ManifestError> {
    if looks_like_html(text) {
        return Err(ManifestError::HtmlPage);
    }

    let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
    let manifest = validate_manifest(&value, mode).ok_or(ManifestError::Structure(mode))?;

    let duplicates = manifest.duplicate_numbers();
    if !duplicates.is_empty() {
        warn!(
            image = %manifest.image_name,
            duplicates = ?duplicates,
            "Manifest repeats marker numbers"
        );
    }

    Ok(manifest)
}

/// Structurally validate a JSON value as a manifest.
///
/// Requires an object with a non-empty string `imageName` and an array
/// `coordinates` whose elements are objects with numeric `x`/`y` and a string
/// `number`. Strict mode additionally requires at least one coordinate.
#[must_use]
pub fn validate_manifest(value: &Value, mode: ValidationMode) -> Option<DiagramManifest> {
    let object = value.as_object()?;

    let image_name = object.get("imageName")?.as_str()?;
    if image_name.trim().is_empty() {
        return None;
    }

    let raw_coordinates = object.get("coordinates")?.as_array()?;
    if mode == ValidationMode::Strict && raw_coordinates.is_empty() {
        return None;
    }

    let coordinates = raw_coordinates
        .iter()
        .enumerate()
        .map(|(index, raw)| coordinate_from_json(index, raw.as_object()?))
        .collect::<Option<Vec<_>>>()?;

    Some(DiagramManifest::new(image_name, coordinates))
}

fn coordinate_from_json(index: usize, object: &Map<String, Value>) -> Option<Coordinate> {
    let x = object.get("x").filter(|v| v.is_number())?.as_f64()?;
    let y = object.get("y").filter(|v| v.is_number())?.as_f64()?;
    let number = object.get("number")?.as_str()?.to_string();

    let id = match object.get("id") {
        Some(Value::Number(n)) => n
            .as_i64()
            .map_or_else(|| CoordinateId::Text(n.to_string()), CoordinateId::Int),
        Some(Value::String(s)) => CoordinateId::Text(s.clone()),
        _ => CoordinateId::Int(i64::try_from(index + 1).unwrap_or(i64::MAX)),
    };

    Some(Coordinate {
        id,
        number,
        x,
        y,
        part_number: object
            .get("partNumber")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OIL_SYSTEM: &str =
        r#"{"imageName":"Oil-System","coordinates":[{"number":"1","x":50,"y":50,"partNumber":"P1"}]}"#;

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = parse_manifest(OIL_SYSTEM, ValidationMode::Strict).unwrap();
        assert_eq!(manifest.image_name, "Oil-System");
        assert_eq!(manifest.marker_count(), 1);

        let coordinate = &manifest.coordinates[0];
        assert_eq!(coordinate.id, CoordinateId::Int(1));
        assert_eq!(coordinate.part_number, "P1");
        assert!((coordinate.x - 50.0).abs() < f64::EPSILON);
        assert!(coordinate.description.is_none());
    }

    #[test]
    fn test_html_page_rejected() {
        for page in [
            "<!DOCTYPE html><html><body>Not Found</body></html>",
            "  \n<html><head></head></html>",
            "<!doctype HTML>",
        ] {
            assert!(matches!(
                parse_manifest(page, ValidationMode::Lenient),
                Err(ManifestError::HtmlPage)
            ));
        }
    }

    #[test]
    fn test_syntax_error_rejected() {
        assert!(matches!(
            parse_manifest(r#"{"imageName": "x", "coordinates": ["#, ValidationMode::Lenient),
            Err(ManifestError::Syntax(_))
        ));
    }

    #[test]
    fn test_empty_coordinates_by_mode() {
        let value = json!({"imageName": "Blank", "coordinates": []});
        assert!(validate_manifest(&value, ValidationMode::Lenient).is_some());
        assert!(validate_manifest(&value, ValidationMode::Strict).is_none());
    }

    #[test]
    fn test_structural_rejections() {
        let cases = [
            json!(null),
            json!([]),
            json!({"coordinates": []}),
            json!({"imageName": 3, "coordinates": []}),
            json!({"imageName": "", "coordinates": []}),
            json!({"imageName": "x", "coordinates": {}}),
            json!({"imageName": "x"}),
            json!({"imageName": "x", "coordinates": [7]}),
            json!({"imageName": "x", "coordinates": [{"number": "1", "x": "5", "y": 1}]}),
            json!({"imageName": "x", "coordinates": [{"number": 1, "x": 5, "y": 1}]}),
            json!({"imageName": "x", "coordinates": [{"number": "1", "x": 5}]}),
        ];
        for case in cases {
            for mode in [ValidationMode::Lenient, ValidationMode::Strict] {
                assert!(
                    validate_manifest(&case, mode).is_none(),
                    "{case} should fail {mode} validation"
                );
            }
        }
    }

    #[test]
    fn test_ids_and_optional_fields() {
        let value = json!({
            "imageName": "Pump",
            "coordinates": [
                {"id": "a-1", "number": "1", "x": 1.5, "y": 2},
                {"number": "2", "x": 3, "y": 4, "description": "Impeller"},
                {"id": 40, "number": "3", "x": 5, "y": 6}
            ]
        });
        let manifest = validate_manifest(&value, ValidationMode::Strict).unwrap();

        assert_eq!(manifest.coordinates[0].id, CoordinateId::Text("a-1".to_string()));
        assert_eq!(manifest.coordinates[1].id, CoordinateId::Int(2));
        assert_eq!(manifest.coordinates[1].description.as_deref(), Some("Impeller"));
        assert_eq!(manifest.coordinates[1].part_number, "");
        assert_eq!(manifest.coordinates[2].id, CoordinateId::Int(40));
    }
}

use serde::de::DeserializeOwned;

use crate::error::{SchemaError, SchemaResult};

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> SchemaResult<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_schema_error)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> SchemaResult<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_schema_error)
}

fn into_schema_error(err: serde_path_to_error::Error<serde_json::Error>) -> SchemaError {
    SchemaError::Json {
        pointer: err.path().to_string(),
        source: err.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Check;

    #[test]
    fn error_names_the_failing_node() {
        let err = from_str_with_path::<Vec<Check>>(r#"[{"kind": "bool"}, {"kind": "integer", "min": "x"}]"#)
            .unwrap_err();
        match err {
            SchemaError::Json { pointer, .. } => assert!(pointer.starts_with("[1]"), "{pointer}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn slices_parse_like_strings() {
        let checks: Vec<Check> = from_slice_with_path(br#"[{"kind": "slice"}]"#).unwrap();
        assert_eq!(checks, vec![Check::Slice]);
    }
}

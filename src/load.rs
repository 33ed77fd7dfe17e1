//! Reading schemas from disk with JSON-path context in errors.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{Schema, TypeConfigOption};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("at JSON path {at} → {message}")]
    Parse { at: String, message: String },
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Parse {
        at: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Parse {
        at: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// A single `TypeConfig` or a list of alternatives.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, LoadError> {
    from_slice_with_path(&read(path.as_ref())?)
}

/// A `{ props, return }` guard schema.
pub fn load_guard_schema(path: impl AsRef<Path>) -> Result<TypeConfigOption, LoadError> {
    from_slice_with_path(&read(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeConfig;

    #[test]
    fn parse_errors_name_the_field_path() {
        let src = r#"{"props": [{"type": "number"}, {"type": "string", "required": "yes"}]}"#;
        let err = from_str_with_path::<TypeConfigOption>(src).unwrap_err();
        match err {
            LoadError::Parse { at, .. } => assert_eq!(at, "props[1].required"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reads_schema_files() {
        let dir = std::env::temp_dir().join(format!("json-typecheck-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.json");
        std::fs::write(&path, r#"[{"type": "string"}, {"type": "number"}]"#).unwrap();
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema, Schema::Many(vec![TypeConfig::new("string"), TypeConfig::new("number")]));
        assert!(matches!(load_schema(dir.join("missing.json")), Err(LoadError::Io { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }
}

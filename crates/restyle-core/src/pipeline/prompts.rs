//! Prompt loading from a YAML list.
//!
//! The file must hold a top-level sequence of strings. Anything else is
//! rejected as a whole; there is no partial recovery.

use crate::error::SourceError;
use serde_yaml::Value;
use std::path::Path;

/// Load prompts, returning the reason on failure.
pub fn try_load_prompts(path: &Path) -> Result<Vec<String>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(path.to_path_buf())
        } else {
            SourceError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_prompts(&content, path)
}

/// Load prompts, logging any failure and returning an empty list instead.
pub fn load_prompts(path: &Path) -> Vec<String> {
    match try_load_prompts(path) {
        Ok(prompts) => {
            tracing::debug!("Loaded {} prompt(s) from {:?}", prompts.len(), path);
            prompts
        }
        Err(e) => {
            tracing::error!("{e}");
            Vec::new()
        }
    }
}

fn parse_prompts(content: &str, path: &Path) -> Result<Vec<String>, SourceError> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| SourceError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })?;

    let Value::Sequence(items) = value else {
        return Err(SourceError::Shape {
            path: path.to_path_buf(),
            message: format!("top level is {}", describe(&value)),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(SourceError::Shape {
                path: path.to_path_buf(),
                message: format!("entry {i} is {}, not a string", describe(&other)),
            }),
        })
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "empty",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("prompts.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_loads_list_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "- Make it look like a watercolor\n- \"Add snow: lots of it\"\n- Turn day into night\n",
        );
        assert_eq!(
            load_prompts(&path),
            vec![
                "Make it look like a watercolor",
                "Add snow: lots of it",
                "Turn day into night"
            ]
        );
    }

    #[test]
    fn test_empty_list_is_ok_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[]\n");
        assert!(try_load_prompts(&path).unwrap().is_empty());
    }

    #[test]
    fn test_mapping_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "prompts:\n  - a\n  - b\n");
        let err = try_load_prompts(&path).unwrap_err();
        assert!(matches!(err, SourceError::Shape { .. }));
        assert!(err.to_string().contains("a mapping"));
        assert!(load_prompts(&path).is_empty());
    }

    #[test]
    fn test_scalar_and_empty_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_prompts(&write(&dir, "just one prompt\n")).is_empty());
        assert!(load_prompts(&write(&dir, "")).is_empty());
    }

    #[test]
    fn test_non_string_entry_rejects_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "- first\n- 42\n- third\n");
        let err = try_load_prompts(&path).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
        assert!(load_prompts(&path).is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "- a\n- [unclosed\n");
        assert!(matches!(
            try_load_prompts(&path),
            Err(SourceError::Yaml { .. })
        ));
        assert!(load_prompts(&path).is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(matches!(
            try_load_prompts(&path),
            Err(SourceError::NotFound(_))
        ));
        assert!(load_prompts(&path).is_empty());
    }
}

use crate::error::{AppError, Result};
use std::path::{Component, Path};

/// Validates that a client-supplied image name is one plain file name inside
/// the working directory. Anything that could address another location is
/// rejected before the filesystem is touched.
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(AppError::validation("image", "Missing image or label"));
    }

    if contains_control_chars(name) {
        return Err(AppError::InvalidPath {
            message: "Invalid image name: contains null bytes or control characters".to_string(),
        });
    }

    if name.contains('/') || name.contains('\\') {
        return Err(AppError::InvalidPath {
            message: "Invalid image name: contains path separators".to_string(),
        });
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(AppError::InvalidPath {
            message: "Path traversal attempt detected".to_string(),
        }),
    }
}

/// Validates a label text used as a folder name below the working directory.
/// Nested folders are allowed; anything that would climb out or restart from
/// a root is not.
pub fn validate_label_dir(label: &str) -> Result<()> {
    if label.is_empty() || contains_control_chars(label) {
        return Err(AppError::ConfigError {
            message: format!("Label '{}' is not usable as a folder name", label.escape_debug()),
        });
    }

    for component in Path::new(label).components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => {
                return Err(AppError::ConfigError {
                    message: format!("Label '{}' would escape the images directory", label),
                });
            }
        }
    }

    if !Path::new(label)
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
    {
        return Err(AppError::ConfigError {
            message: format!("Label '{}' does not name a folder", label),
        });
    }

    Ok(())
}

fn contains_control_chars(value: &str) -> bool {
    value.contains('\0') || value.chars().any(|c| c.is_control())
}

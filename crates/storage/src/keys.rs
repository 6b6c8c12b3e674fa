//! Object key layout.

use std::path::Path;

/// Key for a rendered artifact: `outputs/<uuid>.<ext>`.
pub fn output_key(extension: &str) -> String {
    format!("outputs/{}.{extension}", uuid::Uuid::new_v4())
}

/// Key for a client upload: `uploads/<uuid><ext>`, keeping the original
/// file extension or falling back to `.bin`.
pub fn upload_key(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".bin".to_string());
    format!("uploads/{}{ext}", uuid::Uuid::new_v4())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use tauri::State;

use crate::{
    export::{
        export_filename, generate_export_content, generate_json_export, group_contexts,
        select_quick_export, ExportFormat, ExportMethod, QuickExportKind,
    },
    log_info,
    AppState,
};

const ENABLE_LOGS: bool = true;

/// Export every saved context, organized per `method`, into `dir`.
/// Returns the paths of the files written.
#[tauri::command]
pub async fn export_contexts(
    state: State<'_, AppState>,
    method: ExportMethod,
    format: ExportFormat,
    dir: String,
) -> Result<Vec<String>, String> {
    let blocks = state
        .db
        .list_context_blocks()
        .await
        .map_err(|e| e.to_string())?;

    if blocks.is_empty() {
        return Err("Nothing to export yet. Save a context first.".to_string());
    }

    let dir = PathBuf::from(dir);
    let mut written = Vec::new();

    for (label, group) in group_contexts(method, &blocks) {
        let path = dir.join(export_filename(&label, format));
        write_export(&path, &label, &group, format).map_err(|e| e.to_string())?;
        written.push(path.to_string_lossy().into_owned());
    }

    log_info!("Exported {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// One-click exports: favorites, last 30 days, or a single context.
#[tauri::command]
pub async fn quick_export(
    state: State<'_, AppState>,
    kind: QuickExportKind,
    format: ExportFormat,
    dir: String,
    id: Option<String>,
) -> Result<String, String> {
    let blocks = state
        .db
        .list_context_blocks()
        .await
        .map_err(|e| e.to_string())?;

    let selected = select_quick_export(kind, &blocks, id.as_deref());
    if selected.is_empty() {
        return Err(match kind {
            QuickExportKind::Favorites => "No favorite contexts to export.".to_string(),
            QuickExportKind::Recent => "No contexts saved in the last 30 days.".to_string(),
            QuickExportKind::Single => "Context not found.".to_string(),
        });
    }

    let label = match kind {
        QuickExportKind::Favorites => "Favorites".to_string(),
        QuickExportKind::Recent => "Recent".to_string(),
        QuickExportKind::Single => selected[0].title.clone(),
    };

    let path = PathBuf::from(dir).join(export_filename(&label, format));
    write_export(&path, &label, &selected, format).map_err(|e| e.to_string())?;
    Ok(path.to_string_lossy().into_owned())
}

fn write_export(
    path: &std::path::Path,
    label: &str,
    blocks: &[crate::db::ContextBlock],
    format: ExportFormat,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export directory {}", parent.display()))?;
    }

    let content = match format {
        ExportFormat::Text => generate_export_content(&format!("ChatSeed Export: {label}"), blocks),
        ExportFormat::Json => generate_json_export(blocks)?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("failed to write export file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::write_export;
    use crate::db::ContextBlock;
    use crate::export::ExportFormat;
    use crate::platform::PlatformKind;
    use tempfile::TempDir;

    #[test]
    fn write_export_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        let blocks = vec![ContextBlock::new(
            "a".to_string(),
            "body".to_string(),
            vec![],
            PlatformKind::Chatgpt,
        )];

        write_export(&path, "All", &blocks, ExportFormat::Text).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Title: a"));
    }
}

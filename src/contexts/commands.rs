use tauri::State;

use crate::{
    contexts::{apply_filters, compute_stats, ContextFilter, ContextStats},
    db::ContextBlock,
    extract::{format_messages_for_saving, ChatMessage},
    log_info,
    platform::PlatformKind,
    AppState,
};

const ENABLE_LOGS: bool = true;

/// Save a set of captured messages as one context block.
#[tauri::command]
pub async fn save_context(
    state: State<'_, AppState>,
    title: String,
    tags: Vec<String>,
    platform: PlatformKind,
    messages: Vec<ChatMessage>,
) -> Result<ContextBlock, String> {
    if messages.is_empty() {
        return Err("No messages selected. Please select at least one message.".to_string());
    }

    let body = format_messages_for_saving(&messages);
    let block = ContextBlock::new(resolve_title(title, &body), body, tags, platform);

    log_info!(
        "Saving context '{}' with {} messages from {}",
        block.title,
        messages.len(),
        platform.as_str()
    );

    state
        .db
        .insert_context_block(block)
        .await
        .map_err(|e| e.to_string())
}

/// Save free text the user highlighted on the page, bypassing message
/// extraction entirely.
#[tauri::command]
pub async fn save_selection_context(
    state: State<'_, AppState>,
    title: String,
    tags: Vec<String>,
    platform: PlatformKind,
    text: String,
) -> Result<ContextBlock, String> {
    let body = text.trim().to_string();
    if body.is_empty() {
        return Err("Selection is empty. Highlight some text first.".to_string());
    }

    let block = ContextBlock::new(resolve_title(title, &body), body, tags, platform);
    state
        .db
        .insert_context_block(block)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_contexts(
    state: State<'_, AppState>,
    filter: Option<ContextFilter>,
) -> Result<Vec<ContextBlock>, String> {
    let blocks = state
        .db
        .list_context_blocks()
        .await
        .map_err(|e| e.to_string())?;

    Ok(match filter {
        Some(filter) => apply_filters(&blocks, &filter),
        None => blocks,
    })
}

#[tauri::command]
pub async fn get_context(
    state: State<'_, AppState>,
    id: String,
) -> Result<Option<ContextBlock>, String> {
    state
        .db
        .get_context_block(id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_context_stats(state: State<'_, AppState>) -> Result<ContextStats, String> {
    let blocks = state
        .db
        .list_context_blocks()
        .await
        .map_err(|e| e.to_string())?;
    Ok(compute_stats(&blocks))
}

#[tauri::command]
pub async fn update_context(
    state: State<'_, AppState>,
    id: String,
    title: String,
    body: String,
    tags: Vec<String>,
) -> Result<ContextBlock, String> {
    state
        .db
        .update_context_block(id, title, body, tags)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_favorite(state: State<'_, AppState>, id: String) -> Result<bool, String> {
    state.db.toggle_favorite(id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_context(state: State<'_, AppState>, id: String) -> Result<(), String> {
    log_info!("Deleting context {id}");
    state
        .db
        .delete_context_block(id)
        .await
        .map_err(|e| e.to_string())
}

/// A blank title falls back to the first line of the body, clipped so
/// the list view stays readable.
fn resolve_title(title: String, body: &str) -> String {
    let trimmed = title.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    let first_line = body.lines().find(|line| !line.trim().is_empty()).unwrap_or("Untitled");
    let mut fallback: String = first_line.trim().chars().take(50).collect();
    if fallback.is_empty() {
        fallback = "Untitled".to_string();
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::resolve_title;

    #[test]
    fn explicit_title_wins() {
        assert_eq!(resolve_title("My chat".to_string(), "body text"), "My chat");
    }

    #[test]
    fn blank_title_falls_back_to_first_body_line() {
        assert_eq!(
            resolve_title("   ".to_string(), "User:\nhello there"),
            "User:"
        );
    }

    #[test]
    fn fallback_is_clipped_to_fifty_chars() {
        let long = "x".repeat(120);
        assert_eq!(resolve_title(String::new(), &long).len(), 50);
    }
}

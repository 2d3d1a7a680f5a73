mod contexts;
mod db;
mod export;
mod extract;
mod inject;
mod platform;
mod settings;
mod utils;

use contexts::commands::{
    delete_context, get_context, get_context_stats, list_contexts, save_context,
    save_selection_context, toggle_favorite, update_context,
};
use db::Database;
use export::commands::{export_contexts, quick_export};
use extract::{extract_messages, ExtractError};
use inject::{plan_insertion, prompts, InjectionPlan, SummaryKind};
use platform::{detect_platform, InputKind, PlatformKind};
use serde::Serialize;
use settings::{SettingsStore, UserSettings};
use std::sync::RwLock;
use tauri::{Manager, State};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: SettingsStore,
    /// Latest page snapshot reported by the capture shim; the bounded
    /// readiness wait polls this.
    pub(crate) snapshot: RwLock<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    kind: PlatformKind,
    display_name: &'static str,
    input_kind: InputKind,
}

/// Which platform, if any, the given page URL belongs to.
#[tauri::command]
fn detect_chat_platform(url: String) -> Option<PlatformInfo> {
    detect_platform(&url).map(|descriptor| PlatformInfo {
        kind: descriptor.key,
        display_name: descriptor.display_name,
        input_kind: descriptor.input_kind,
    })
}

/// Extract the conversation from a page snapshot. Unsupported pages and
/// pages with no recognizable messages are reported as errors here so the
/// UI can show an alert.
#[tauri::command]
fn extract_chat_messages(url: String, html: String) -> Result<Vec<extract::ChatMessage>, String> {
    let Some(descriptor) = detect_platform(&url) else {
        return Err(ExtractError::UnsupportedPage.to_string());
    };

    let messages = extract_messages(&html, Some(descriptor));
    if messages.is_empty() {
        return Err(ExtractError::NoMessages.to_string());
    }
    Ok(messages)
}

/// Whether the chat UI has rendered in this snapshot.
#[tauri::command]
fn check_chat_interface(html: String) -> bool {
    extract::wait::chat_interface_ready(&html)
}

/// The capture shim pushes the current page HTML here after every
/// navigation or mutation batch.
#[tauri::command]
fn report_page_snapshot(state: State<AppState>, html: String) -> Result<(), String> {
    *state.snapshot.write().unwrap() = Some(html);
    Ok(())
}

/// Block (bounded) until the reported snapshots contain a rendered chat
/// root. Exhausting the retry cap is a distinct timeout error.
#[tauri::command]
async fn wait_for_chat_interface(state: State<'_, AppState>) -> Result<(), String> {
    extract::wait::wait_for_chat_interface(|| state.snapshot.read().unwrap().clone())
        .await
        .map_err(|e| e.to_string())
}

/// Plan inserting a saved context into the page's input, stamping the
/// context's last-used time on success.
#[tauri::command]
async fn plan_context_insertion(
    state: State<'_, AppState>,
    id: String,
    url: String,
    html: String,
) -> Result<InjectionPlan, String> {
    let Some(descriptor) = detect_platform(&url) else {
        return Err(ExtractError::UnsupportedPage.to_string());
    };

    let block = state
        .db
        .get_context_block(id.clone())
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("context block not found: {id}"))?;

    let payload = prompts::context_insertion_payload(&block.title, &block.body);
    let plan = plan_insertion(&html, descriptor, &payload)
        .ok_or_else(|| ExtractError::InputNotFound.to_string())?;

    state
        .db
        .touch_last_used(id)
        .await
        .map_err(|e| e.to_string())?;

    Ok(plan)
}

/// Plan inserting a conversation-summary prompt into the page's input.
#[tauri::command]
fn plan_summarize_insertion(
    url: String,
    html: String,
    kind: SummaryKind,
) -> Result<InjectionPlan, String> {
    let Some(descriptor) = detect_platform(&url) else {
        return Err(ExtractError::UnsupportedPage.to_string());
    };

    plan_insertion(&html, descriptor, prompts::summarize_prompt(kind))
        .ok_or_else(|| ExtractError::InputNotFound.to_string())
}

/// Plan asking the assistant to summarize one saved context.
#[tauri::command]
async fn plan_context_summary(
    state: State<'_, AppState>,
    id: String,
    url: String,
    html: String,
) -> Result<InjectionPlan, String> {
    let Some(descriptor) = detect_platform(&url) else {
        return Err(ExtractError::UnsupportedPage.to_string());
    };

    let block = state
        .db
        .get_context_block(id.clone())
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("context block not found: {id}"))?;

    let payload = prompts::context_summary_payload(&block.title, &block.body);
    plan_insertion(&html, descriptor, &payload)
        .ok_or_else(|| ExtractError::InputNotFound.to_string())
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<UserSettings, String> {
    Ok(state.settings.current())
}

#[tauri::command]
fn update_settings(
    settings: UserSettings,
    state: State<AppState>,
) -> Result<UserSettings, String> {
    state.settings.update(settings).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("ChatSeed starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("chatseed.sqlite3");
                let database = Database::new(db_path)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;

                app.manage(AppState {
                    db: database,
                    settings: settings_store,
                    snapshot: RwLock::new(None),
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            detect_chat_platform,
            extract_chat_messages,
            check_chat_interface,
            report_page_snapshot,
            wait_for_chat_interface,
            save_context,
            save_selection_context,
            list_contexts,
            get_context,
            get_context_stats,
            update_context,
            toggle_favorite,
            delete_context,
            plan_context_insertion,
            plan_summarize_insertion,
            plan_context_summary,
            export_contexts,
            quick_export,
            get_settings,
            update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

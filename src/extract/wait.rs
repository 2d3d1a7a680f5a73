//! Bounded readiness polling for the chat interface.
//!
//! The page shim can only hand us snapshots, so readiness is checked by
//! re-fetching a snapshot every poll interval until a chat root container
//! appears. The wait is bounded; exhaustion is a distinct timeout error,
//! not "element never found".

use tokio::time::{sleep, Duration};

use scraper::Html;

use super::error::ExtractError;
use super::extractor::try_selectors;

const ENABLE_LOGS: bool = true;
use crate::{log_info, log_warn};

pub const POLL_INTERVAL_MS: u64 = 100;
pub const MAX_ATTEMPTS: u32 = 50;

/// Root containers that indicate the chat UI has rendered.
const CHAT_CONTAINER_SELECTORS: &[&str] = &["main", "#main", "body > div", "[id*=\"app\"]"];

/// Whether a snapshot contains a rendered chat root.
pub fn chat_interface_ready(html: &str) -> bool {
    let doc = Html::parse_document(html);
    !try_selectors(&doc, CHAT_CONTAINER_SELECTORS).is_empty()
}

/// Poll `fetch_snapshot` until the chat interface is ready, at most
/// `MAX_ATTEMPTS` times spaced `POLL_INTERVAL_MS` apart.
pub async fn wait_for_chat_interface<F>(mut fetch_snapshot: F) -> Result<(), ExtractError>
where
    F: FnMut() -> Option<String>,
{
    for attempt in 0..MAX_ATTEMPTS {
        if let Some(html) = fetch_snapshot() {
            if chat_interface_ready(&html) {
                log_info!("chat interface ready after {} checks", attempt + 1);
                return Ok(());
            }
        }
        sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }

    log_warn!("chat interface never appeared after {MAX_ATTEMPTS} checks");
    Err(ExtractError::WaitTimeout {
        attempts: MAX_ATTEMPTS,
    })
}

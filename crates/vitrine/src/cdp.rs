//! Live browser sessions over the Chrome DevTools Protocol.
//!
//! Every element operation evaluates the locator's JavaScript form in the
//! page, so the same [`Locator`] drives both this session and the in-memory
//! store. Dialogs are observed through `Page.javascriptDialogOpening` and
//! answered with `Page.handleJavaScriptDialog` as soon as they open.

use crate::dialog::{AutoDialogBehavior, Dialog, DialogAction, DialogLog, DialogType};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::runner::SessionFactory;
use crate::session::UiSession;
use crate::signal::{ArmedSignal, SignalHub, SignalKind};
use crate::wait::{wait_until, WaitOptions};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    DialogType as CdpDialogType, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How to launch the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run without a window
    pub headless: bool,
    /// Chromium executable, auto-detected when `None`
    pub chromium_path: Option<String>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// What to do with dialogs nobody is waiting for
    pub auto_dialog: AutoDialogBehavior,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            auto_dialog: AutoDialogBehavior::default(),
        }
    }
}

impl LaunchOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the Chromium executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (containers, CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

fn protocol_error(error: impl std::fmt::Display) -> ProbeError {
    ProbeError::session(error.to_string())
}

fn dialog_type(kind: &CdpDialogType) -> DialogType {
    match kind {
        CdpDialogType::Alert => DialogType::Alert,
        CdpDialogType::Confirm => DialogType::Confirm,
        CdpDialogType::Prompt => DialogType::Prompt,
        CdpDialogType::Beforeunload => DialogType::BeforeUnload,
    }
}

// =============================================================================
// SCRIPTS
// =============================================================================

fn count_script(locator: &Locator) -> String {
    format!("{}.length", locator.to_js())
}

/// Wraps `body` so it runs with `el` bound to the first match, or returns
/// `missing` when there is none
fn first_match_script(locator: &Locator, missing: &str, body: &str) -> String {
    format!(
        "(() => {{ const el = {}[0]; if (!el) return {missing}; {body} }})()",
        locator.to_js()
    )
}

fn visible_script(locator: &Locator) -> String {
    first_match_script(
        locator,
        "false",
        "const style = window.getComputedStyle(el); const rect = el.getBoundingClientRect(); \
         return style.visibility !== 'hidden' && style.display !== 'none' \
         && rect.width > 0 && rect.height > 0;",
    )
}

fn text_script(locator: &Locator) -> String {
    first_match_script(locator, "null", "return el.innerText ?? el.textContent ?? '';")
}

fn click_script(locator: &Locator) -> String {
    first_match_script(
        locator,
        "false",
        "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
    )
}

fn fill_script(locator: &Locator, value: &str) -> ProbeResult<String> {
    let value = serde_json::to_string(value)?;
    Ok(first_match_script(
        locator,
        "false",
        &format!(
            "el.focus(); el.value = {value}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;"
        ),
    ))
}

const READY_SCRIPT: &str = "document.readyState === 'complete'";

// =============================================================================
// SESSION
// =============================================================================

/// One browser page driven over CDP
pub struct CdpSession {
    page: Page,
    hub: Arc<SignalHub>,
    dialogs: JoinHandle<()>,
}

impl CdpSession {
    /// Take over a page and start answering its dialogs
    pub async fn attach(page: Page, auto_dialog: AutoDialogBehavior) -> ProbeResult<Self> {
        let hub = Arc::new(SignalHub::new(auto_dialog));
        let mut events = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(protocol_error)?;

        let listener_page = page.clone();
        let listener_hub = Arc::clone(&hub);
        let dialogs = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let dialog = listener_hub.deliver(Dialog::new(
                    dialog_type(&event.r#type),
                    event.message.clone(),
                ));
                let accept = matches!(dialog.action(), DialogAction::Accept);
                debug!(message = dialog.message(), accept, "answering dialog");
                if let Err(error) = listener_page
                    .execute(HandleJavaScriptDialogParams::new(accept))
                    .await
                {
                    warn!(%error, "could not answer dialog");
                }
            }
        });

        Ok(Self { page, hub, dialogs })
    }

    /// Dialogs this page raised, with how each was answered
    #[must_use]
    pub fn dialogs(&self) -> &DialogLog {
        self.hub.log()
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
        let result = self.page.evaluate(script).await.map_err(protocol_error)?;
        Ok(result.into_value()?)
    }

    async fn act(&self, locator: &Locator, script: String) -> ProbeResult<()> {
        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }
}

impl std::fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpSession")
            .field("dialogs", &self.hub.log().len())
            .finish_non_exhaustive()
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.dialogs.abort();
    }
}

#[async_trait]
impl UiSession for CdpSession {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        self.page.reload().await.map_err(protocol_error)?;
        Ok(())
    }

    async fn wait_for_load(&self, options: &WaitOptions) -> ProbeResult<()> {
        wait_until(
            "document to load",
            || self.eval::<bool>(READY_SCRIPT.to_string()),
            options,
        )
        .await?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.eval(count_script(locator)).await
    }

    async fn is_visible_now(&self, locator: &Locator) -> ProbeResult<bool> {
        self.eval(visible_script(locator)).await
    }

    async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.eval::<Option<String>>(text_script(locator))
            .await?
            .ok_or_else(|| ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.act(locator, click_script(locator)).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.act(locator, fill_script(locator, value)?).await
    }

    async fn on_next_signal(&self, kind: SignalKind) -> ProbeResult<ArmedSignal> {
        match kind {
            SignalKind::Dialog => Ok(self.hub.arm()),
        }
    }

    async fn close(&self) -> ProbeResult<()> {
        self.dialogs.abort();
        self.page.clone().close().await.map_err(protocol_error)
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Launches one browser and opens a fresh page per scenario
pub struct CdpSessionFactory {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    options: LaunchOptions,
}

impl CdpSessionFactory {
    /// Launch the browser
    pub async fn launch(options: LaunchOptions) -> ProbeResult<Self> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(headless = options.headless, "browser launched");
        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            options,
        })
    }

    /// Close the browser
    pub async fn shutdown(self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(protocol_error)?;
        self.handler.abort();
        Ok(())
    }
}

impl std::fmt::Debug for CdpSessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpSessionFactory")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionFactory for CdpSessionFactory {
    async fn open(&self) -> ProbeResult<Box<dyn UiSession>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(protocol_error)?;
        let session = CdpSession::attach(page, self.options.auto_dialog).await?;
        Ok(Box::new(session))
    }

    fn describe(&self) -> String {
        if self.options.headless {
            "chromium (headless)".to_string()
        } else {
            "chromium".to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Selector;

    fn welcome() -> Locator {
        Locator::new(Selector::css("#nameofuser"))
    }

    #[test]
    fn test_scripts_embed_locator() {
        let locator = welcome();
        let js = locator.to_js();
        assert_eq!(count_script(&locator), format!("{js}.length"));
        for script in [visible_script(&locator), text_script(&locator), click_script(&locator)] {
            assert!(script.contains(&js));
            assert!(script.starts_with("(() => { const el = "));
        }
    }

    #[test]
    fn test_fill_script_escapes_value() {
        let script = fill_script(&welcome(), "it's \"quoted\"").unwrap();
        assert!(script.contains(r#"el.value = "it's \"quoted\"";"#));
    }

    #[test]
    fn test_missing_element_results() {
        assert!(text_script(&welcome()).contains("if (!el) return null;"));
        assert!(click_script(&welcome()).contains("if (!el) return false;"));
    }

    #[test]
    fn test_dialog_type_mapping() {
        assert_eq!(dialog_type(&CdpDialogType::Alert), DialogType::Alert);
        assert_eq!(dialog_type(&CdpDialogType::Beforeunload), DialogType::BeforeUnload);
    }

    #[test]
    fn test_launch_options() {
        let options = LaunchOptions::default()
            .with_headless(false)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert!(!options.headless);
        assert!(!options.sandbox);
        assert_eq!(options.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }
}

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::browser::HeadlessMode;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::info;
use settle_core::SettleError;

use crate::shared::{js, to_settle_error, BrowserOptions};

pub(crate) async fn launch(options: &BrowserOptions) -> Result<Browser, SettleError> {
    let temp_dir = std::env::temp_dir().join(format!("settle-chromium-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&temp_dir)
        .map_err(|e| SettleError::browser(format!("Failed to create temp dir: {}", e)))?;

    let mut builder = ChromeConfig::builder()
        .headless_mode(if options.headless { HeadlessMode::True } else { HeadlessMode::False })
        .user_data_dir(temp_dir);

    if let (Some(w), Some(h)) = (options.viewport_width, options.viewport_height) {
        builder = builder.window_size(w, h);
    }
    if let Some(path) = &options.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    let chrome_cfg = builder.build()
        .map_err(|e| SettleError::browser(format!("Config failed: {}", e)))?;

    let (browser, mut handler) = Browser::launch(chrome_cfg).await
        .map_err(|e| SettleError::browser(format!("Launch failed: {}", e)))?;

    tokio::spawn(async move { while handler.next().await.is_some() {} });
    info!("chromium launched (headless: {})", options.headless);
    Ok(browser)
}

/// Registers the probe script for every future document and runs it on the
/// current one.
pub(crate) async fn install_probes(page: &Page) -> Result<(), SettleError> {
    page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(js::probe::INSTALL_PROBES))
        .await
        .map_err(|e| to_settle_error(e, "InstallProbes"))?;
    page.evaluate(js::probe::INSTALL_PROBES.to_string())
        .await
        .map_err(|e| to_settle_error(e, "InstallProbes"))?;
    Ok(())
}

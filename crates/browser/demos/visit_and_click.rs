use settle_browser::{BrowserOptions, ChromiumApp};
use settle_helpers::{Helpers, Target};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let base_url = std::env::args().nth(1).unwrap_or_else(|| "http://localhost:4200".to_string());
    let options = BrowserOptions::default()
        .with_base_url(base_url)
        .with_viewport(1280, 800)
        .with_navigation(15000);

    let app = Arc::new(ChromiumApp::launch(options).await?);
    let helpers = Helpers::new(Arc::clone(&app));

    helpers.visit("/").await?;
    println!("settled at {}", helpers.current_url().await?);

    let links = helpers.find(Target::new("a")).await?;
    println!("{} links on the page", links.len());

    if !links.is_empty() {
        helpers.click("a").await?;
        println!("after click: {}", helpers.current_url().await?);
    }

    app.close().await?;
    Ok(())
}

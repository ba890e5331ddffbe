//! Render a single article through the full request pipeline

use anyhow::Result;
use axum::body::to_bytes;

use crate::content::ContentType;
use crate::Site;

/// Run one request and print status, headers and body
pub async fn run(site: &Site, content_type: ContentType, slug: &str, lang: Option<&str>) -> Result<()> {
    let handler = site.article_handler()?;
    let response = handler.handle(content_type, Some(slug), lang).await;

    println!("HTTP {}", response.status());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    println!("{}", String::from_utf8_lossy(&body));

    Ok(())
}

//! List the static-route allow-list

use anyhow::Result;

use crate::content::ContentType;
use crate::Site;

/// Print every slug that is redirected to a pre-built page
pub fn run(site: &Site) -> Result<()> {
    let routes = site.static_routes()?;

    for content_type in ContentType::ALL {
        let slugs: Vec<&str> = routes.slugs(content_type).collect();
        println!("{} ({}):", content_type, slugs.len());
        for slug in slugs {
            println!("  {}", content_type.static_path(slug));
        }
    }

    Ok(())
}

//! `sitemap.xml` and `robots.txt` rendering.

use crate::types::Timestamp;

/// Path segments of the public SPA routes the sitemap points at.
pub mod paths {
    pub const WALLPAPER: &str = "wallpaper";
    pub const CATEGORY: &str = "category";
    pub const COLLECTION: &str = "collection";
}

/// One `<url>` element.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: Option<Timestamp>,
    pub change_freq: &'static str,
    pub priority: f32,
}

impl SitemapEntry {
    pub fn new(loc: String, change_freq: &'static str, priority: f32) -> Self {
        Self {
            loc,
            last_modified: None,
            change_freq,
            priority,
        }
    }

    pub fn modified(mut self, at: Timestamp) -> Self {
        self.last_modified = Some(at);
        self
    }
}

/// Join a site root and a relative path with exactly one slash.
pub fn absolute_url(site_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render a `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&entry.loc)));
        if let Some(at) = entry.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", at.format("%Y-%m-%d")));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_freq));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Render `robots.txt`, keeping crawlers off the API and pointing them at the
/// sitemap.
pub fn render_robots(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\nDisallow: /storage/\n\nSitemap: {}\n",
        absolute_url(site_url, "sitemap.xml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn absolute_url_normalizes_slashes() {
        assert_eq!(
            absolute_url("https://example.com/", "/wallpaper/1"),
            "https://example.com/wallpaper/1"
        );
        assert_eq!(absolute_url("https://example.com", ""), "https://example.com/");
    }

    #[test]
    fn renders_entries_with_escaping() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 10, 0, 0).unwrap();
        let entries = vec![
            SitemapEntry::new("https://example.com/".into(), "daily", 1.0),
            SitemapEntry::new("https://example.com/search?a=1&b=2".into(), "weekly", 0.6)
                .modified(at),
        ];
        let xml = render_sitemap(&entries);
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/search?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<lastmod>2024-05-17</lastmod>"));
        assert!(xml.contains("<priority>0.6</priority>"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn empty_sitemap_is_still_valid() {
        let xml = render_sitemap(&[]);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn robots_points_at_sitemap() {
        let robots = render_robots("https://example.com/");
        assert!(robots.contains("Disallow: /api/"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}

//! Channel index page generation.
//!
//! Renders a static `index.html` at the output root, listing every channel
//! with relative links to its three feed files.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::log;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Nix channel feed index</title>
    <style>
        body { margin: 0; padding: 0; width: 100vw; height: 100vh; }
        main {
            display: flex;
            align-items: center;
            justify-content: center;
            flex-direction: column;
            width: inherit;
            height: inherit;
        }
        .item { display: flex; justify-content: space-around; align-items: center; }
        .icons { display: flex; }
        .icons > a { padding: 10px; }
    </style>
</head>
<body>
    <main>
        <h1>Nix Channels</h1>
"#;

const PAGE_FOOT: &str = "    </main>\n</body>\n</html>\n";

/// Render the index page for the given channel list.
pub fn render_index(channels: &[String]) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + PAGE_FOOT.len() + channels.len() * 256);
    html.push_str(PAGE_HEAD);

    for channel in channels {
        let name = escape_html(channel);
        html.push_str("        <section class=\"item\">\n");
        html.push_str(&format!("            <p class=\"item-name\">{name}</p>\n"));
        html.push_str("            <div class=\"icons\">\n");
        for (file, label) in [
            ("feed.rss", "RSS"),
            ("feed.atom", "ATOM"),
            ("feed.json", "JSON"),
        ] {
            html.push_str(&format!(
                "                <a href=\"{name}/{file}\"><p>{label}</p></a>\n"
            ));
        }
        html.push_str("            </div>\n");
        html.push_str("        </section>\n");
    }

    html.push_str(PAGE_FOOT);
    html
}

/// Write the index page under the output root.
pub fn write_index(out: &Path, channels: &[String]) -> Result<()> {
    let index_path = out.join("index.html");
    fs::write(&index_path, render_index(channels))
        .with_context(|| format!("failed to write index to {}", index_path.display()))?;

    log!("index"; "{}", index_path.display());
    Ok(())
}

/// Escape special HTML characters.
fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;"),
    )
}

//! Merged directory listings and their HTML rendering.

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::ServeError;

const STYLE: &str = r#"
	<style>
		body {
			font-size: 14px;
			font-family: consolas, "Liberation Mono", "DejaVu Sans Mono", Menlo, monospace;
		}
		a {
			display: block;
			color: blue;
			text-decoration: none;
		}
		a:hover {
			background-color: #f3f3f3;
		}
		.req-path {
			color: #bbb;
		}
	</style>
"#;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

impl Entry {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }

    /// Synthetic `..` entry that leads every listing.
    pub fn parent() -> Self {
        Self::new("..", true)
    }

    pub fn is_parent(&self) -> bool {
        self.is_dir && self.name == ".."
    }
}

/// Contents of one root's directory for one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Root the directory was found under, as configured
    pub local_path: PathBuf,
    /// Request path the listing was resolved for
    pub request_path: String,
    /// Entries in directory order, `..` first
    pub entries: Vec<Entry>,
}

impl DirectoryListing {
    /// Build a listing from already collected entries, prepending `..`.
    pub fn new(
        local_path: impl Into<PathBuf>,
        request_path: impl Into<String>,
        entries: impl IntoIterator<Item = Entry>,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            request_path: request_path.into(),
            entries: std::iter::once(Entry::parent()).chain(entries).collect(),
        }
    }

    /// Enumerate `dir`, which is `root` joined with `request_path`.
    ///
    /// Entries come back in the order the OS yields them. Symlinks count as
    /// directories when their target is one.
    pub fn read(root: &Path, dir: &Path, request_path: &str) -> io::Result<Self> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    trace!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };

            let is_dir = match entry.file_type() {
                Ok(file_type) if file_type.is_symlink() => entry.path().is_dir(),
                Ok(file_type) => file_type.is_dir(),
                Err(_) => false,
            };

            entries.push(Entry::new(
                entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            ));
        }

        Ok(Self::new(root, request_path, entries))
    }
}

/// Escape text for embedding in HTML element content or quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode each segment of a decoded request path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute link to the parent of `request_path`; the root links to itself.
fn parent_href(request_path: &str) -> String {
    let trimmed = request_path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => format!("{}/", encode_path(parent)),
        _ => "/".to_string(),
    }
}

fn entry_href(request_path: &str, entry: &Entry) -> String {
    if entry.is_parent() {
        return parent_href(request_path);
    }

    let mut base = encode_path(request_path);
    if !base.starts_with('/') {
        base.insert(0, '/');
    }
    if !base.ends_with('/') {
        base.push('/');
    }

    let suffix = if entry.is_dir { "/" } else { "" };
    format!("{}{}{}", base, urlencoding::encode(&entry.name), suffix)
}

/// Render listings from every contributing root as one HTML page.
pub fn render(listings: &[DirectoryListing]) -> Result<String, ServeError> {
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head>")?;
    writeln!(html, "\t<meta charset=\"UTF-8\">{}</head>", STYLE)?;
    writeln!(html, "<body>")?;

    for listing in listings {
        writeln!(
            html,
            "\t<h3>\n\t\t<span class=\"local-path\">{}</span><span class=\"req-path\">{}</span>\n\t</h3>",
            escape_html(&listing.local_path.display().to_string()),
            escape_html(&listing.request_path),
        )?;

        for entry in &listing.entries {
            let (class, marker) = if entry.is_dir {
                ("entry dir", "/")
            } else {
                ("entry", "")
            };
            writeln!(
                html,
                "\t<a class=\"{}\" href=\"{}\">{}{}</a>",
                class,
                escape_html(&entry_href(&listing.request_path, entry)),
                escape_html(&entry.name),
                marker,
            )?;
        }
    }

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(html)
}

use std::fmt::Write;

use kbsearch_core::{EntryView, Facets, PreviewView, Role, SessionViewModel};
use url::Url;

const OFFICE_VIEWER: &str = "https://view.officeapps.live.com/op/embed.aspx";

/// Turns successive view models into incremental terminal output.
#[derive(Debug, Default)]
pub struct Renderer {
    shown_entries: usize,
    busy: bool,
    preview: PreviewView,
    signed_out: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &SessionViewModel) -> String {
        let mut out = String::new();

        if self.shown_entries == 0 && view.entries.is_empty() && !view.examples.is_empty() {
            out.push_str("Examples:\n");
            for (i, example) in view.examples.iter().enumerate() {
                let _ = writeln!(out, "  [{}] {}", i + 1, example);
            }
        }

        for entry in view.entries.iter().skip(self.shown_entries) {
            render_entry(&mut out, entry);
        }
        self.shown_entries = view.entries.len();

        if view.busy && !self.busy {
            out.push_str("… searching\n");
        }
        self.busy = view.busy;

        if view.preview != self.preview {
            render_preview(&mut out, &view.preview);
            self.preview = view.preview.clone();
        }

        if view.signed_out && !self.signed_out {
            out.push_str("Session expired. Sign in with :login <user> <password>\n");
        }
        self.signed_out = view.signed_out;

        out
    }
}

fn render_entry(out: &mut String, entry: &EntryView) {
    match entry.role {
        Role::User => {
            let _ = writeln!(out, "\n> {}", entry.text);
        }
        Role::Assistant => {
            let _ = writeln!(out, "\n{}", entry.text);
            for (i, row) in entry.results.iter().enumerate() {
                let tags = [&row.tags.application, &row.tags.issue, &row.tags.ingredient]
                    .into_iter()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" / ");
                let _ = writeln!(out, "  [{}] {} ({:.2}) {}", i + 1, row.filename, row.score, tags);
                let snippet: String = row.preview_text.chars().take(120).collect();
                if !snippet.is_empty() {
                    let _ = writeln!(out, "      {}", snippet.replace('\n', " "));
                }
            }
            if entry.total_results > entry.results.len() {
                let _ = writeln!(
                    out,
                    "  ({} more not shown)",
                    entry.total_results - entry.results.len()
                );
            }
            if let Some(ms) = entry.elapsed_ms {
                let _ = writeln!(out, "  {:.1}s", ms as f64 / 1000.0);
            }
        }
    }
}

fn render_preview(out: &mut String, preview: &PreviewView) {
    match preview {
        PreviewView::Hidden => out.push_str("Preview closed\n"),
        PreviewView::Loading { filename } => {
            let _ = writeln!(out, "Loading preview of {filename}…");
        }
        PreviewView::Ready { filename, url } => {
            let _ = writeln!(out, "Preview of {filename}:");
            if let Some(viewer) = office_viewer_url(url) {
                let _ = writeln!(out, "  view:     {viewer}");
            }
            let _ = writeln!(out, "  open:     {url}");
            let _ = writeln!(out, "  download: {url}");
        }
        PreviewView::Failed { filename, reason } => {
            let _ = writeln!(out, "Cannot preview {filename}:");
            for line in reason.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
    }
}

/// Embedded Office viewer link for a document URL.
pub fn office_viewer_url(url: &Url) -> Option<Url> {
    Url::parse_with_params(OFFICE_VIEWER, &[("src", url.as_str())]).ok()
}

pub fn render_history(view: &SessionViewModel) -> String {
    if view.history.is_empty() {
        return "No history yet\n".to_string();
    }
    let mut out = String::new();
    for (i, row) in view.history.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {} ({})", i + 1, row.query, row.result_count);
    }
    out
}

pub fn render_facets(facets: &Facets) -> String {
    let mut out = String::new();
    for (name, values) in [
        ("application", &facets.applications),
        ("issue", &facets.issues),
        ("ingredient", &facets.ingredients),
    ] {
        let _ = writeln!(out, "  {name}: {}", values.join(", "));
    }
    out
}

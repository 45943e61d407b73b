//! Caption options for uploaded torrent files.
//!
//! `d=<dir>` sets the download directory and `l=<label>` the label. Bare
//! tokens are positional: anything that looks like a path is the directory,
//! everything else the label. Later tokens override earlier ones.

/// Placement options parsed from an upload caption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub directory: Option<String>,
    pub label: Option<String>,
}

impl UploadOptions {
    pub fn parse(caption: &str) -> Self {
        let mut options = Self::default();

        for token in caption.split_whitespace() {
            if let Some(dir) = token.strip_prefix("d=") {
                options.directory = Some(dir.to_string());
            } else if let Some(label) = token.strip_prefix("l=") {
                options.label = Some(label.to_string());
            } else if looks_like_path(token) {
                options.directory = Some(token.to_string());
            } else {
                options.label = Some(token.to_string());
            }
        }

        options.directory = options.directory.filter(|d| !d.is_empty());
        options.label = options.label.filter(|l| !l.is_empty());
        options
    }
}

fn looks_like_path(token: &str) -> bool {
    token.contains('/') || token.contains('\\')
}

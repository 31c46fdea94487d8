use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or parse Rust source into a type index.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}")]
    Parse {
        origin: String,
        #[source]
        source: syn::Error,
    },
}

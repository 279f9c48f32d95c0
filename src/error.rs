use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The fetch failed and there is no cached snapshot to fall back to.
    #[error("no market data available: fetch failed ({reason}) and no cache at {}", path.display())]
    Unavailable { reason: String, path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown label `{0}` (expected STRONG BUY, BUY, WATCHLIST, HOLD or AVOID)")]
pub struct ParseLabelError(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter `{0}` (expected ALL, TOP GAINER, TOP VOLUME or a label)")]
pub struct ParseFilterError(pub String);

/// Errors surfaced by the addon actions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream reported the resource as missing (HTTP 404 or `{"code":"NotFound"}`).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// An episode title did not match `S<n>:E<n> - <name>`.
    #[error("failed matching series title: {0}")]
    TitleFormat(String),

    /// A catalog record carried a type code other than `v` or `s`.
    #[error("unknown item type code: {0:?}")]
    UnknownItemType(String),

    #[error("region {0:?} is not served by this addon")]
    RegionForbidden(String),

    /// Non-success status other than 404.
    #[error("upstream returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request cache failure: {0:#}")]
    Cache(#[source] anyhow::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookLoaderError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("book {0} is not in the catalog")]
    NotFound(u32),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("page parsing error: {0}")]
    Parse(String),

    #[error("transfer error: {0}")]
    Transfer(String),
}

impl BookLoaderError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::Transfer(msg.into())
    }

    pub fn status(status: reqwest::StatusCode, url: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            url: url.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookLoaderError>;

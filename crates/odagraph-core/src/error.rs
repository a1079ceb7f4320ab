pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid service URL: {0}")]
    InvalidServiceUrl(#[from] url::ParseError),

    #[error("Service URL cannot be a base: {url}")]
    CannotBeABase { url: String },
}

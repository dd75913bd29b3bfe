/// Failures surfaced by catalogue and team queries.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    #[error("Player not found ({id}).")]
    NotFound { id: String },
    #[error("{}", status_message(.status))]
    Http { status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unreadable response: {0}")]
    Decode(String),
    #[error("Player data unavailable: {0}")]
    Unavailable(String),
}

impl CatalogueError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogueError::NotFound { .. })
    }
}

impl From<reqwest::Error> for CatalogueError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return CatalogueError::Http {
                status: status.as_u16(),
            };
        }
        if err.is_connect() {
            return CatalogueError::Http { status: 0 };
        }
        if err.is_decode() {
            return CatalogueError::Decode(err.to_string());
        }
        CatalogueError::Network(err.to_string())
    }
}

pub fn http_status_message(status: u16) -> String {
    match status {
        0 => "Unable to reach the server. Check your connection.".to_string(),
        400 => "Invalid request. Check the parameters.".to_string(),
        404 => "Resource not found.".to_string(),
        429 => "Too many requests. Please wait.".to_string(),
        500 | 502 | 503 => "Server error. Please try again later.".to_string(),
        other => format!("Error {other}"),
    }
}

fn status_message(status: &u16) -> String {
    http_status_message(*status)
}

use streaming::{DecodeError, ServerError, TransportError};

/// Every failure the widget can surface. All of them end up as a single
/// `error` event at the widget boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    Configuration(String),
    Transport(TransportError),
    Server(ServerError),
    Parse(String),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ViewerError::Transport(err) => {
                write!(f, "An error occurred on the visualization server. Error = {err}")
            }
            ViewerError::Server(err) => write!(f, "{err}"),
            ViewerError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Transport(err) => Some(err),
            ViewerError::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for ViewerError {
    fn from(err: TransportError) -> Self {
        ViewerError::Transport(err)
    }
}

impl From<ServerError> for ViewerError {
    fn from(err: ServerError) -> Self {
        ViewerError::Server(err)
    }
}

impl From<DecodeError> for ViewerError {
    fn from(err: DecodeError) -> Self {
        ViewerError::Parse(err.to_string())
    }
}

impl From<scene::SceneError> for ViewerError {
    fn from(err: scene::SceneError) -> Self {
        ViewerError::Parse(err.to_string())
    }
}

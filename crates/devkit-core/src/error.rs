use thiserror::Error;

/// Errors raised when XML text is not a well-formed document.
///
/// Parsing never returns a partial tree: the first problem found is reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The underlying reader rejected the input.
    #[error("invalid XML at byte {position}: {message}")]
    Syntax {
        /// Byte offset reached when the error was detected.
        position: usize,
        /// Reader diagnostic.
        message: String,
    },
    /// The input contains no element at all.
    #[error("invalid XML: document has no root element")]
    MissingRoot,
    /// A second top-level element follows the root.
    #[error("invalid XML: unexpected element <{name}> after the root element")]
    MultipleRoots {
        /// Tag name of the extra element.
        name: String,
    },
    /// Non-whitespace text appears outside the root element.
    #[error("invalid XML: text content outside the root element")]
    StrayText,
    /// An element or attribute name breaks the XML `Name` production.
    #[error("invalid XML: `{name}` is not a valid name")]
    InvalidName {
        /// The offending name.
        name: String,
    },
    /// The input ended while an element was still open.
    #[error("invalid XML: element <{name}> is never closed")]
    Unclosed {
        /// Tag name of the innermost open element.
        name: String,
    },
}

/// Errors emitted by the text-level converters.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The provided XML input was invalid.
    #[error(transparent)]
    Xml(#[from] ParseError),
}

/// Identifies which input of a comparison failed to parse.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The original (left) document is invalid.
    #[error("original document: {0}")]
    Left(#[source] ConvertError),
    /// The modified (right) document is invalid.
    #[error("modified document: {0}")]
    Right(#[source] ConvertError),
}

/// Failures talking to a text-generation backend.
#[derive(Debug, Error)]
pub enum AssistError {
    /// The request could not be sent or its body could not be decoded.
    #[error("assist request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("assist backend returned HTTP {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
    },
    /// The cloud provider was selected without an API key.
    #[error("no API key configured for the gemini provider")]
    MissingApiKey,
    /// The backend answered successfully but without any text.
    #[error("assist backend returned an empty response")]
    EmptyResponse,
    /// A provider name did not match any known backend.
    #[error("unknown assist provider `{0}` (expected `gemini` or `ollama`)")]
    UnknownProvider(String),
}

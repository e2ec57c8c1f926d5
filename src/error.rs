//! 错误处理

#[allow(unused)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // 标准库错误处理
    #[error("io error, {0}")]
    Io(std::io::Error),
    #[error("system time error, {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
    // std::sync::once_lock::OnceLock
    #[error("once lock error, {0}")]
    OnceLock(String),

    #[error("serde json error, {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("toml parse error, {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("regex error, {0}")]
    RegexError(#[from] fancy_regex::Error),

    #[error("py error, {0}")]
    PyErr(#[from] pyo3::PyErr),

    #[error("invalid resolution, {0}")]
    InvalidResolution(String),
    #[error("{0} must be a non-empty list of [width, height] integer pairs.")]
    InvalidCombos(String),
    #[error("the list is empty")]
    ListEmpty,

    #[error("file not found, {0}")]
    FileNotFound(String),
    #[error("TOML must contain [[lora]] array, {0}")]
    InvalidTriggerTable(String),

    #[error("{0} is not available")]
    StrategyUnavailable(String),
    #[error("all LoRA loaders failed")]
    AllStrategiesFailed,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

use thiserror::Error;

/// Failures that stop a dataset (or the whole dashboard) from loading.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("{dataset} data is missing required column '{column}'")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },
    #[error("{0} dataset contains no usable rows")]
    Empty(&'static str),
}

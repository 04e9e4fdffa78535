use thiserror::Error;
#[derive(Debug, Error)]
pub enum GrapherError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("channel count must be greater than zero")]
    InvalidChannelCount,
    #[error("max samples must be greater than zero")]
    InvalidMaxSamples,
    #[error("smoothing factor must be in [0, 1), got {0}")]
    InvalidSmoothingFactor(f64),
    #[error("rate period must be greater than zero")]
    InvalidRatePeriod,
    #[error("baud rate {0} is outside 300..=250000")]
    InvalidBaudRate(u32),
    #[error("split channel {0} is outside 1..=13")]
    InvalidSplitChannel(usize),
    #[error("channel {0} is already in the split list")]
    DuplicateSplitChannel(usize),
    #[error("split list already holds 13 channels")]
    SplitListFull,
    #[error("no data to export")]
    NothingToExport,
    #[error("csv input has no header row")]
    MissingHeader,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings could not be decoded: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl GrapherError {
    /// True for the rejections raised at the configuration boundary.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GrapherError::InvalidChannelCount
                | GrapherError::InvalidMaxSamples
                | GrapherError::InvalidSmoothingFactor(_)
                | GrapherError::InvalidRatePeriod
                | GrapherError::InvalidBaudRate(_)
                | GrapherError::InvalidSplitChannel(_)
                | GrapherError::DuplicateSplitChannel(_)
                | GrapherError::SplitListFull
        )
    }
}
impl From<serialport::Error> for GrapherError {
    fn from(value: serialport::Error) -> Self {
        GrapherError::Connection(value.to_string())
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for GrapherError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        GrapherError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for GrapherError {
    fn from(value: image::ImageError) -> Self {
        GrapherError::Plot(value.to_string())
    }
}

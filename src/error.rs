/// Errors reported by the quantization engine
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The value provided to the fuction is out of allowed range
    #[error("Value out of range")]
    ValueOutOfRange,
    /// The slice provided to the function is too small
    #[error("Buffer is too small")]
    BufferTooSmall,
    /// The histogram holds no colors, there is nothing to quantize
    #[error("Histogram is empty")]
    EmptyHistogram,
}

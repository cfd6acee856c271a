use std::fmt;

#[derive(Debug)]
pub enum WaveDeckError {
    Capture(CaptureError),
    Device(DeviceError),
    Store(StoreError),
}

/// Errors from the recording state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// `start_capture` was called while a take was already in progress.
    AlreadyRecording,
    /// `stop_capture` was called with no take in progress.
    NotRecording,
}

/// Errors from the native audio output path.
#[derive(Debug)]
pub enum DeviceError {
    NoOutputDevice,
    Unsupported(String),
    Stream(String),
}

/// Errors from the preset store backends.
#[derive(Debug)]
pub enum StoreError {
    /// The backing store could not be reached or the query failed.
    Unavailable(String),
    /// A stored or incoming record could not be (de)serialized.
    InvalidRecord(String),
}

impl fmt::Display for WaveDeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveDeckError::Capture(e) => write!(f, "Capture error: {e}"),
            WaveDeckError::Device(e) => write!(f, "Device error: {e}"),
            WaveDeckError::Store(e) => write!(f, "Store error: {e}"),
        }
    }
}

impl std::error::Error for WaveDeckError {}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::AlreadyRecording => write!(f, "Recording already in progress"),
            CaptureError::NotRecording => write!(f, "No recording in progress"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoOutputDevice => write!(f, "No output device available"),
            DeviceError::Unsupported(msg) => write!(f, "Unsupported output config: {msg}"),
            DeviceError::Stream(msg) => write!(f, "Output stream failed: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
            StoreError::InvalidRecord(msg) => write!(f, "Invalid record: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<CaptureError> for WaveDeckError {
    fn from(e: CaptureError) -> Self {
        WaveDeckError::Capture(e)
    }
}

impl From<DeviceError> for WaveDeckError {
    fn from(e: DeviceError) -> Self {
        WaveDeckError::Device(e)
    }
}

impl From<StoreError> for WaveDeckError {
    fn from(e: StoreError) -> Self {
        WaveDeckError::Store(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidRecord(e.to_string())
    }
}

#[cfg(feature = "service")]
impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

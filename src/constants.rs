//! Constants used throughout the pipeline

/// Point count of the dlib-style sparse layout
pub const SPARSE_LANDMARK_COUNT: usize = 68;

/// Point count of the dense face-mesh layout
pub const DENSE_LANDMARK_COUNT: usize = 468;

/// Upper bound of every action-unit intensity
pub const AU_INTENSITY_MAX: f64 = 5.0;

/// Default Kalman process noise (variance growth per frame)
pub const DEFAULT_PROCESS_NOISE: f64 = 0.01;

/// Default Kalman measurement noise
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.1;

/// Default exponential smoothing factor
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.5;

/// Default per-frame confidence decay on missed detections
pub const DEFAULT_PERSISTENCE_DECAY: f64 = 0.95;

/// Default confidence floor below which geometry is dropped
pub const DEFAULT_PERSISTENCE_FLOOR: f64 = 0.3;

/// Default AU history depth (frames)
pub const DEFAULT_HISTORY_DEPTH: usize = 30;

/// Micro-expression timing window (milliseconds)
pub const DEFAULT_MICRO_MIN_GAP_MS: f64 = 40.0;
pub const DEFAULT_MICRO_MAX_GAP_MS: f64 = 500.0;

/// Micro-expression rate threshold (intensity units per second)
pub const DEFAULT_MICRO_RATE_THRESHOLD: f64 = 10.0;

/// Eye aspect ratio below which the eyes count as closed
pub const DEFAULT_BLINK_CLOSED_EAR: f64 = 0.21;

/// Eye aspect ratio below which a sample counts towards the closure ratio
pub const DEFAULT_BLINK_LOW_EAR: f64 = 0.25;

/// Closure durations counted as a blink (milliseconds)
pub const DEFAULT_BLINK_MIN_MS: f64 = 50.0;
pub const DEFAULT_BLINK_MAX_MS: f64 = 500.0;

/// Blink rate window (milliseconds)
pub const DEFAULT_BLINK_RATE_WINDOW_MS: f64 = 60_000.0;

/// Default facial weight in multimodal fusion
pub const DEFAULT_FACIAL_WEIGHT: f64 = 0.6;

/// Default audio sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Autocorrelation pitch search range (Hz)
pub const DEFAULT_MIN_PITCH_HZ: f64 = 80.0;
pub const DEFAULT_MAX_PITCH_HZ: f64 = 400.0;

/// Combined mouth-corner raise (outer-canthus units) below which asymmetry
/// is reported as zero
pub const ASYMMETRY_MIN_RAISE: f64 = 0.02;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-9;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Freestream speed must be finite and positive, got {0}")]
    InvalidFreestream(f64),
    #[error("Circle center must be finite, got ({0}, {1})")]
    InvalidCenter(f64, f64),
    #[error("Circle radius {0} is too small to form an airfoil")]
    DegenerateRadius(f64),
    #[error("Angle of attack must be finite and within (-pi/2, pi/2), got {0}")]
    InvalidAngle(f64),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid simulation configuration: {0}")]
    ValidationError(String),
    #[error("Invalid initial flow parameters: {0}")]
    ParameterError(#[from] ParameterError),
}

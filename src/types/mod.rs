mod core;

pub use self::core::{ConvertRequest, OutputMode, ResponseEnvelope};

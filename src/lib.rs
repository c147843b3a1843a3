pub mod color_pipeline;
pub mod led;
pub mod logger;
pub mod runtime;

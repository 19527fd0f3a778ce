pub mod phrase;
pub mod pitch;
pub mod sample;

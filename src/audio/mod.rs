pub mod analysis;
pub mod decode;
pub mod features;
pub mod resample;

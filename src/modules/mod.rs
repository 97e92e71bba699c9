pub mod assessment;
pub mod enrollment;
pub mod progress;
pub mod semester;

mod assignment;
mod attempt;
mod content;
mod enrollment;
mod progress;
mod question;
mod student;

pub use assignment::*;
pub use attempt::*;
pub use content::*;
pub use enrollment::*;
pub use progress::*;
pub use question::*;
pub use student::*;

pub mod macros;
pub mod params;
pub mod staff;
pub mod timetable;

pub use params::*;
pub use staff::*;
pub use timetable::*;

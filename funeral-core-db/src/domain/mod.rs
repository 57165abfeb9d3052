pub mod costing;
pub mod memorial_render;
pub mod payroll;
pub mod reporting;
pub mod scheduling;
pub mod three_way_match;

pub use costing::*;
pub use memorial_render::*;
pub use payroll::*;
pub use reporting::*;
pub use scheduling::*;
pub use three_way_match::*;

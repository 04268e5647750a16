pub mod align;
pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod parallel;
pub mod pipeline;
pub mod preprocess;
pub mod register;

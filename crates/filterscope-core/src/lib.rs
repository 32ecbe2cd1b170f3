pub mod capture;
pub mod config;
pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod source;
pub mod viewport;

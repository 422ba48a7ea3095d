// import modules
mod report;
mod api;

// export modules
pub use report::*;
pub use api::*;

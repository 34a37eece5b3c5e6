pub mod artifact;
pub mod decode;
pub mod model;
pub mod preprocess;
pub mod service;

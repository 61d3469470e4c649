pub mod banner;
pub mod consts;
pub mod engine;
pub mod eval;
pub mod logging;
pub mod protocol;
pub mod transcript;
pub mod transport;

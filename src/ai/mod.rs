pub mod eval;
pub mod search;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

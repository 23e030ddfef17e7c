pub mod assembly;
pub mod atu;
pub mod block;
pub mod error;
pub mod io;
pub mod matrix;
pub mod resolution;
pub mod store;

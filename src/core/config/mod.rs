pub mod data;
pub mod io;

pub use data::Config;

#[cfg(test)]
mod tests;

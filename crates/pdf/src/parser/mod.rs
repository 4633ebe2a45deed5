pub mod backend;
pub mod spans;
pub mod toc;

#[cfg(test)]
pub(crate) mod mock;

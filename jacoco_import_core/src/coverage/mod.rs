pub mod accumulate;
pub mod model;

#[cfg(test)]
mod model_test;

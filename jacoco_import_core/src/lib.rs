pub mod classfile;
pub mod coverage;
pub mod error;
pub mod exec;
pub mod mutf8;

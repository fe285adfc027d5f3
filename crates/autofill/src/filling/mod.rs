pub mod value_setter;

pub use value_setter::*;

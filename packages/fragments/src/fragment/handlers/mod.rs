//! Built-in fragment handlers.

mod tree;
mod value;

pub use tree::{FragmentContent, FragmentNode, TreeFragmentHandler};
pub use value::{
    BooleanValueHandler, DateTimeValueHandler, DateValueHandler, DecimalValueHandler,
    IntegerValueHandler, TextValueHandler, ValueFragmentHandler,
};

mod text;
mod value;

pub use text::{parse_float, parse_integer};
pub use value::ValueCodec;
pub(crate) use value::c_str;

pub mod binary;
pub mod buffer;
pub mod converter;
pub mod error;
mod finite;
pub mod format;
pub mod options;
pub mod schema;
pub mod stream;
pub mod textual;

pub use binary::*;
pub use buffer::*;
pub use converter::*;
pub use error::*;
pub use format::*;
pub use options::*;
pub use schema::*;
pub use stream::*;
pub use textual::*;

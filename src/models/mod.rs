mod category;
mod price;
mod product;

pub use category::*;
pub use price::*;
pub use product::*;

pub mod city;
pub mod visit;

pub use city::{City, Location};
pub use visit::Visit;

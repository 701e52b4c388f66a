pub mod drawable;
pub mod layer;

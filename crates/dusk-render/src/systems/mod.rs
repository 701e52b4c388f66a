pub mod batch;
pub mod blur;
pub mod culling;
pub mod ground;
pub mod lighting;

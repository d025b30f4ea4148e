pub mod color_removal;
pub mod filters;
pub mod placement;
pub mod text;
pub mod transform;

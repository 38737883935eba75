pub(crate) mod columns;
pub(crate) mod geometry;
pub(crate) mod grid;

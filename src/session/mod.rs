pub(crate) mod outliner;
pub(crate) mod scheduler;

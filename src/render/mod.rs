pub(crate) mod backend;
pub(crate) mod bracket;
pub(crate) mod connector;
pub(crate) mod cpu;
pub(crate) mod glow;
pub(crate) mod plan;
pub(crate) mod reveal;

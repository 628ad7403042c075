pub(crate) mod bootstrap;
mod raycaster;

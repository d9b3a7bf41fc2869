mod foods;
mod helpers;
mod summary;
mod target;

pub(crate) use foods::cmd_foods;
pub(crate) use summary::cmd_summary;
pub(crate) use target::cmd_target;

pub(crate) mod diaries;
pub(crate) mod stats;
pub(crate) mod timelapse;

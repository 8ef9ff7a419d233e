pub(crate) mod error;
pub(crate) mod local_time;
pub(crate) mod post;
pub(crate) mod slideshow;
pub(crate) mod streak;
pub(crate) mod timelapse;

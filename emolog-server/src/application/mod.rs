pub(crate) mod diary_service;
pub(crate) mod stats_service;
pub(crate) mod timelapse_service;
pub(crate) mod video_encoder;

pub(crate) mod database;
pub(crate) mod ffmpeg;
pub(crate) mod logging;
pub(crate) mod settings;

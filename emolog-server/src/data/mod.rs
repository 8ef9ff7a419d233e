pub(crate) mod object_store;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod storage;

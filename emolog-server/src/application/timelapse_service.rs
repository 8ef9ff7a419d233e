use chrono::FixedOffset;
use tracing::{info, warn};

use crate::application::video_encoder::VideoEncoder;
use crate::data::object_store::ObjectStore;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::FrameSource;
use crate::domain::slideshow::{SourceImage, VideoProfile, assemble};
use crate::domain::timelapse::{TimelapseArtifact, TimelapseRequest};

#[derive(Debug, Clone)]
pub(crate) struct TimelapseBuckets {
    pub(crate) photos: String,
    pub(crate) videos: String,
}

pub(crate) struct TimelapseService<R, S, E>
where
    R: PostRepository,
    S: ObjectStore,
    E: VideoEncoder,
{
    repo: R,
    store: S,
    encoder: E,
    buckets: TimelapseBuckets,
    profile: VideoProfile,
    offset: FixedOffset,
}

impl<R, S, E> TimelapseService<R, S, E>
where
    R: PostRepository,
    S: ObjectStore,
    E: VideoEncoder,
{
    pub(crate) fn new(
        repo: R,
        store: S,
        encoder: E,
        buckets: TimelapseBuckets,
        profile: VideoProfile,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            store,
            encoder,
            buckets,
            profile,
            offset,
        }
    }

    /// Renders one local month of posts into a video and stores it,
    /// replacing any earlier render of the same month.
    pub(crate) async fn generate(
        &self,
        req: TimelapseRequest,
    ) -> Result<TimelapseArtifact, DomainError> {
        let req = req.validate()?;
        let range = req.utc_range(self.offset)?;

        let sources = self.repo.list_frame_sources(req.user_id, range).await?;
        if sources.is_empty() {
            return Err(DomainError::NotFound(format!(
                "no posts for {}",
                req.period_label()
            )));
        }

        let images = self.download_sources(&sources).await;
        if images.is_empty() {
            return Err(DomainError::Unexpected(format!(
                "none of {} images for {} could be downloaded",
                sources.len(),
                req.period_label()
            )));
        }

        let profile = self.profile;
        let timeline = tokio::task::spawn_blocking(move || assemble(&images, profile))
            .await
            .map_err(|err| DomainError::Unexpected(format!("slideshow task failed: {err}")))??;

        let video = self.encoder.encode(&timeline).await?;
        let object_path = req.object_path(video.extension);
        self.store
            .upload(
                &self.buckets.videos,
                &object_path,
                video.bytes,
                video.content_type,
            )
            .await?;

        let artifact = TimelapseArtifact {
            url: self.store.public_url(&self.buckets.videos, &object_path),
            object_path,
            slide_count: timeline.slides().len(),
        };
        info!(
            user_id = %req.user_id,
            object_path = %artifact.object_path,
            slides = artifact.slide_count,
            posts = sources.len(),
            "timelapse stored"
        );

        Ok(artifact)
    }

    async fn download_sources(&self, sources: &[FrameSource]) -> Vec<SourceImage> {
        let mut images = Vec::with_capacity(sources.len());
        for source in sources {
            match self
                .store
                .download(&self.buckets.photos, &source.file_path)
                .await
            {
                Ok(bytes) => images.push(SourceImage {
                    label: source.file_path.clone(),
                    bytes,
                }),
                Err(err) => warn!(
                    post_id = source.post_id,
                    file_path = %source.file_path,
                    error = %err,
                    "skipping image that failed to download"
                ),
            }
        }
        images
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use image::Rgba;
    use uuid::Uuid;

    use super::{TimelapseBuckets, TimelapseService};
    use crate::application::video_encoder::{EncodedVideo, VideoEncoder};
    use crate::data::object_store::ObjectStore;
    use crate::data::post_repository::PostRepository;
    use crate::domain::error::DomainError;
    use crate::domain::local_time::{UtcRange, jst};
    use crate::domain::post::{FrameSource, Post};
    use crate::domain::slideshow::{Timeline, VideoProfile, encoded_png};
    use crate::domain::timelapse::TimelapseRequest;

    #[derive(Clone, Default)]
    struct FakePostRepo {
        sources: Arc<Mutex<Vec<FrameSource>>>,
        requested_range: Arc<Mutex<Option<UtcRange>>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn list_post_timestamps(&self, _user_id: Uuid) -> Result<Vec<String>, DomainError> {
            Ok(Vec::new())
        }

        async fn list_frame_sources(
            &self,
            _user_id: Uuid,
            range: UtcRange,
        ) -> Result<Vec<FrameSource>, DomainError> {
            *self
                .requested_range
                .lock()
                .expect("requested_range mutex poisoned") = Some(range);
            Ok(self.sources.lock().expect("sources mutex poisoned").clone())
        }

        async fn list_posts(&self, _user_id: Uuid) -> Result<Vec<Post>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[derive(Clone, Default)]
    struct FakeStore {
        objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        uploads: Arc<Mutex<Vec<(String, String, usize, String)>>>,
    }

    impl FakeStore {
        fn put(&self, path: &str, bytes: Vec<u8>) {
            self.objects
                .lock()
                .expect("objects mutex poisoned")
                .insert(format!("post_photos/{path}"), bytes);
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError> {
            self.objects
                .lock()
                .expect("objects mutex poisoned")
                .get(&format!("{bucket}/{path}"))
                .cloned()
                .ok_or_else(|| DomainError::Unexpected(format!("object not found: {path}")))
        }

        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            body: Vec<u8>,
            content_type: &str,
        ) -> Result<(), DomainError> {
            self.uploads.lock().expect("uploads mutex poisoned").push((
                bucket.to_string(),
                path.to_string(),
                body.len(),
                content_type.to_string(),
            ));
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("https://cdn.example.com/{bucket}/{path}")
        }
    }

    #[derive(Clone, Default)]
    struct FakeEncoder {
        encoded: Arc<Mutex<Vec<(usize, u64)>>>,
    }

    #[async_trait]
    impl VideoEncoder for FakeEncoder {
        async fn encode(&self, timeline: &Timeline) -> Result<EncodedVideo, DomainError> {
            self.encoded
                .lock()
                .expect("encoded mutex poisoned")
                .push((timeline.slides().len(), timeline.total_frames()));
            Ok(EncodedVideo {
                bytes: vec![0u8; 128],
                content_type: "video/mp4",
                extension: "mp4",
            })
        }
    }

    fn user_id() -> Uuid {
        Uuid::parse_str("0b7a4f5e-8d43-4a8e-9a0c-3c2d3b1e9f10").expect("valid uuid")
    }

    fn request(month: u32) -> TimelapseRequest {
        TimelapseRequest {
            user_id: user_id(),
            year: 2024,
            month,
        }
    }

    fn source(post_id: i64, file_path: &str) -> FrameSource {
        FrameSource {
            post_id,
            file_path: file_path.to_string(),
        }
    }

    fn service(
        repo: FakePostRepo,
        store: FakeStore,
        encoder: FakeEncoder,
    ) -> TimelapseService<FakePostRepo, FakeStore, FakeEncoder> {
        TimelapseService::new(
            repo,
            store,
            encoder,
            TimelapseBuckets {
                photos: "post_photos".to_string(),
                videos: "timelapses".to_string(),
            },
            VideoProfile::default(),
            jst(),
        )
    }

    #[tokio::test]
    async fn generate_returns_not_found_for_empty_month() {
        let encoder = FakeEncoder::default();
        let service = service(FakePostRepo::default(), FakeStore::default(), encoder.clone());

        let err = service
            .generate(request(1))
            .await
            .expect_err("empty month must fail");

        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(encoder.encoded.lock().expect("encoded mutex poisoned").is_empty());
    }

    #[tokio::test]
    async fn generate_queries_local_month_range() {
        let repo = FakePostRepo::default();
        let service = service(repo.clone(), FakeStore::default(), FakeEncoder::default());

        let _ = service.generate(request(1)).await;

        let range = repo
            .requested_range
            .lock()
            .expect("requested_range mutex poisoned")
            .expect("range must be captured");
        assert_eq!(range.start, Utc.with_ymd_and_hms(2023, 12, 31, 15, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 1, 31, 15, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn generate_skips_broken_images_and_uploads_deterministic_path() {
        let repo = FakePostRepo::default();
        *repo.sources.lock().expect("sources mutex poisoned") = vec![
            source(1, "u/1.png"),
            source(2, "u/2.png"),
            source(3, "u/broken.jpg"),
            source(4, "u/3.png"),
            source(5, "u/missing.png"),
        ];
        let store = FakeStore::default();
        store.put("u/1.png", encoded_png(40, 30, Rgba([10, 20, 30, 255])));
        store.put("u/2.png", encoded_png(30, 40, Rgba([40, 50, 60, 255])));
        store.put("u/broken.jpg", b"\xff\xd8 truncated".to_vec());
        store.put("u/3.png", encoded_png(20, 20, Rgba([70, 80, 90, 255])));
        let encoder = FakeEncoder::default();

        let artifact = service(repo, store.clone(), encoder.clone())
            .generate(request(1))
            .await
            .expect("generation must succeed");

        let expected_path = format!("{}/2024-01.mp4", user_id());
        assert_eq!(artifact.object_path, expected_path);
        assert_eq!(
            artifact.url,
            format!("https://cdn.example.com/timelapses/{expected_path}")
        );
        assert_eq!(artifact.slide_count, 3);

        assert_eq!(
            *encoder.encoded.lock().expect("encoded mutex poisoned"),
            vec![(3, 45)]
        );
        let uploads = store.uploads.lock().expect("uploads mutex poisoned").clone();
        assert_eq!(
            uploads,
            vec![(
                "timelapses".to_string(),
                expected_path,
                128,
                "video/mp4".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn generate_fails_internally_when_nothing_decodes() {
        let repo = FakePostRepo::default();
        *repo.sources.lock().expect("sources mutex poisoned") = vec![source(1, "u/bad.png")];
        let store = FakeStore::default();
        store.put("u/bad.png", vec![1, 2, 3]);

        let err = service(repo, store.clone(), FakeEncoder::default())
            .generate(request(2))
            .await
            .expect_err("nothing decodable");

        assert!(matches!(err, DomainError::Unexpected(_)));
        assert!(store.uploads.lock().expect("uploads mutex poisoned").is_empty());
    }

    #[tokio::test]
    async fn generate_fails_internally_when_nothing_downloads() {
        let repo = FakePostRepo::default();
        *repo.sources.lock().expect("sources mutex poisoned") = vec![source(1, "u/gone.png")];

        let err = service(repo, FakeStore::default(), FakeEncoder::default())
            .generate(request(2))
            .await
            .expect_err("nothing downloadable");

        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[tokio::test]
    async fn generate_validates_request_before_querying() {
        let repo = FakePostRepo::default();
        let err = service(repo.clone(), FakeStore::default(), FakeEncoder::default())
            .generate(request(13))
            .await
            .expect_err("month 13 is invalid");

        assert!(matches!(err, DomainError::Validation { field: "month", .. }));
        assert!(
            repo.requested_range
                .lock()
                .expect("requested_range mutex poisoned")
                .is_none()
        );
    }
}

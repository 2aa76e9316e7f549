//! Avatar pass over a mixed roster
//!
//! Uses an in-memory identity service so nothing leaves the machine.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use tempfile::TempDir;
use weave_avatars::{AvatarError, AvatarFetcher, FetchReport, IdentityLookup};
use weave_core::{AvatarRef, Roster};

fn encoded(format: ImageFormat, shade: u8) -> Vec<u8> {
    let img = ImageBuffer::from_fn(8, 8, |x, y| Rgb([shade, (x * 30) as u8, (y * 30) as u8]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Identity service backed by two maps: login to URL, URL to bytes
#[derive(Default)]
struct FakeService {
    users: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
}

impl FakeService {
    fn user(mut self, login: &str, bytes: Vec<u8>) -> Self {
        let url = format!("https://avatars.example.test/{login}");
        self.users.insert(login.to_string(), url.clone());
        self.images.insert(url, bytes);
        self
    }
}

#[async_trait]
impl IdentityLookup for FakeService {
    async fn avatar_url(&self, login: &str) -> Result<Option<String>, AvatarError> {
        Ok(self.users.get(login).cloned())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, AvatarError> {
        self.images
            .get(url)
            .map(|b| Bytes::from(b.clone()))
            .ok_or_else(|| AvatarError::Http(format!("404 for {url}")))
    }
}

fn is_png(path: &std::path::Path) -> bool {
    let bytes = std::fs::read(path).unwrap();
    image::guess_format(&bytes).unwrap() == ImageFormat::Png
}

#[tokio::test]
async fn test_mixed_roster() {
    weave_logging::init_testing();
    let temp = TempDir::new().unwrap();
    let users = temp.path().join("users");
    let local = temp.path().join("mmk.jpg");
    std::fs::write(&local, encoded(ImageFormat::Jpeg, 10)).unwrap();

    std::fs::create_dir_all(&users).unwrap();
    std::fs::write(users.join("Lotto.png"), b"already here").unwrap();

    let service = FakeService::default()
        .user("AbexTM", encoded(ImageFormat::Png, 200))
        .user("devLotto", encoded(ImageFormat::Png, 90))
        .user("broken", b"definitely not an image".to_vec());

    let mut roster = Roster::seeded([
        ("Abex", "AbexTM"),
        ("Lotto", "devLotto"),
        ("Broken", "broken"),
        ("ghost", "ghost"),
    ]);
    roster.insert("ModMatK", AvatarRef::LocalFile(local));
    roster.insert("Missing File", AvatarRef::local("./does/not/exist.png"));

    let fetcher = AvatarFetcher::new(&users, Arc::new(service));
    let report = fetcher.fetch_all(&roster).await.unwrap();

    assert_eq!(
        report,
        FetchReport {
            written: 2,
            skipped_existing: 1,
            missing: 1,
            failed: 2,
        }
    );
    assert_eq!(report.total(), roster.len());

    assert!(is_png(&users.join("Abex.png")));
    assert!(is_png(&users.join("ModMatK.png")));
    assert_eq!(std::fs::read(users.join("Lotto.png")).unwrap(), b"already here");
    assert!(!users.join("Broken.png").exists());
    assert!(!users.join("ghost.png").exists());
    assert!(!users.join("Missing File.png").exists());
}

#[tokio::test]
async fn test_second_pass_skips_everything() {
    let temp = TempDir::new().unwrap();
    let service = Arc::new(FakeService::default().user("AbexTM", encoded(ImageFormat::Jpeg, 1)));
    let roster = Roster::seeded([("Abex", "AbexTM")]);

    let fetcher = AvatarFetcher::new(temp.path(), service);
    let first = fetcher.fetch_all(&roster).await.unwrap();
    let written = std::fs::read(temp.path().join("Abex.png")).unwrap();
    let second = fetcher.fetch_all(&roster).await.unwrap();

    assert_eq!(first.written, 1);
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped_existing, 1);
    assert_eq!(std::fs::read(temp.path().join("Abex.png")).unwrap(), written);
}

#[tokio::test]
async fn test_empty_roster_creates_user_dir() {
    let temp = TempDir::new().unwrap();
    let users = temp.path().join("nested").join("users");

    let report = AvatarFetcher::new(&users, Arc::new(FakeService::default()))
        .fetch_all(&Roster::new())
        .await
        .unwrap();

    assert_eq!(report, FetchReport::default());
    assert!(users.is_dir());
}

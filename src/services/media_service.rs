use bytes::Bytes;
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    forms::ProductForm,
    storage::ObjectStore,
};

#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn of(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "webm" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub index: usize,
    pub total: usize,
    pub kind: MediaKind,
    pub url: String,
}

pub fn media_path(product_name: &str, file_name: &str, millis: i64) -> String {
    format!("products/{}/{}-{}", product_name, millis, file_name)
}

/// Uploads `files` one at a time in the given order, attaching each URL to
/// the form as soon as it is stored. The first failure stops the loop;
/// files already uploaded stay attached.
pub async fn upload_media<F>(
    store: &dyn ObjectStore,
    form: &mut ProductForm,
    files: Vec<MediaFile>,
    mut on_progress: F,
) -> Result<Vec<String>>
where
    F: FnMut(UploadProgress) + Send,
{
    let product_name = form.draft().name.trim().to_string();
    if files.is_empty() || product_name.is_empty() {
        return Err(AppError::BadRequest(
            "Please select files and ensure product name is set".to_string(),
        ));
    }

    let total = files.len();
    let mut uploaded = Vec::with_capacity(total);

    for (index, file) in files.into_iter().enumerate() {
        let path = media_path(
            &product_name,
            &file.file_name,
            chrono::Utc::now().timestamp_millis(),
        );
        let kind = MediaKind::of(&file.file_name);

        let url = store
            .upload(&path, file.bytes, &file.content_type)
            .await
            .map_err(|e| {
                tracing::error!("Media upload {}/{} failed: {}", index + 1, total, e);
                AppError::Storage("Failed to upload media".to_string())
            })?;

        match kind {
            MediaKind::Image => form.attach_image(url.clone()),
            MediaKind::Video => form.attach_video(url.clone()),
        }
        tracing::debug!("Uploaded {} ({}/{})", path, index + 1, total);

        on_progress(UploadProgress {
            index,
            total,
            kind,
            url: url.clone(),
        });
        uploaded.push(url);
    }

    Ok(uploaded)
}

/// Detaches one media entry from the form. The stored blob is left in
/// place.
pub fn remove_media(form: &mut ProductForm, kind: MediaKind, index: usize) -> Option<String> {
    match kind {
        MediaKind::Image => form.detach_image(index),
        MediaKind::Video => form.detach_video(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forms::ProductField, storage::MemoryObjectStore};

    fn file(name: &str) -> MediaFile {
        MediaFile {
            file_name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes: Bytes::from_static(b"data"),
        }
    }

    #[test]
    fn extension_decides_kind() {
        assert_eq!(MediaKind::of("clip.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::of("clip.webm"), MediaKind::Video);
        assert_eq!(MediaKind::of("front.png"), MediaKind::Image);
        assert_eq!(MediaKind::of("noext"), MediaKind::Image);
    }

    #[test]
    fn path_follows_product_name() {
        assert_eq!(
            media_path("Night Cream", "a.png", 1700000000000),
            "products/Night Cream/1700000000000-a.png"
        );
    }

    #[tokio::test]
    async fn upload_requires_name_and_files() {
        let store = MemoryObjectStore::new();
        let mut form = ProductForm::create();
        let err = upload_media(&store, &mut form, vec![file("a.png")], |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please select files and ensure product name is set");

        form.set_field(ProductField::Name, "Cream");
        assert!(upload_media(&store, &mut form, vec![], |_| {}).await.is_err());
        assert!(store.attempts().is_empty());
    }

    #[tokio::test]
    async fn files_are_sorted_into_images_and_videos() {
        let store = MemoryObjectStore::new();
        let mut form = ProductForm::create();
        form.set_field(ProductField::Name, "Cream");

        let mut progress = Vec::new();
        upload_media(
            &store,
            &mut form,
            vec![file("front.png"), file("demo.mp4"), file("back.jpg")],
            |p| progress.push((p.index, p.total)),
        )
        .await
        .unwrap();

        assert_eq!(form.images().len(), 2);
        assert_eq!(form.videos().len(), 1);
        assert!(form.images()[0].ends_with("-front.png"));
        assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);

        let removed = remove_media(&mut form, MediaKind::Image, 0).unwrap();
        assert!(removed.ends_with("-front.png"));
        assert_eq!(form.images().len(), 1);
        assert!(remove_media(&mut form, MediaKind::Video, 5).is_none());
    }
}

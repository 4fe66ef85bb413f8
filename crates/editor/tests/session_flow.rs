//! End-to-end editor flows against the in-memory service

use std::io::Cursor;
use std::time::Duration;

use image::{ImageFormat, RgbImage};
use maskpaint_config::EditorConfig;
use maskpaint_editor::{available_images, EditorError, EditorSession, SessionState};
use maskpaint_service::{
    ImageCrateDecoder, ImageDecoder, ImageFile, InMemoryUploadService, ServiceError,
    UploadService,
};
use painting::{BrushShape, Dimensions, PointerEvent, StrokeMode};

struct FixedDecoder(Dimensions);

impl ImageDecoder for FixedDecoder {
    async fn decode(&self, _bytes: &[u8]) -> Result<Dimensions, ServiceError> {
        Ok(self.0)
    }
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

fn drag(session: &mut EditorSession, path: &[(f32, f32)]) {
    let (x, y) = path[0];
    session.pointer_down(&PointerEvent::mouse(x, y)).unwrap();
    for &(x, y) in &path[1..] {
        session.pointer_move(&PointerEvent::mouse(x, y)).unwrap();
    }
    let (x, y) = path[path.len() - 1];
    session.pointer_up(&PointerEvent::mouse(x, y)).unwrap();
}

fn inside(x: u32, y: u32, from: u32, to: u32) -> bool {
    (from..to).contains(&x) && (from..to).contains(&y)
}

#[tokio::test]
async fn test_draw_erase_save_at_original_resolution() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("harbour.jpg", "image/jpeg", jpeg(1920, 1080));

    let loaded = session
        .upload_and_load(&file, &service, &ImageCrateDecoder)
        .await
        .unwrap();
    assert_eq!(loaded.original_dimensions, Dimensions::new(1920, 1080));
    assert_eq!(loaded.info.image_id, Some(1));
    assert_eq!(
        session.pipeline().unwrap().dimensions(),
        Dimensions::new(800, 450)
    );

    // Fill buffer square (100,100)-(200,200) with two butt-capped passes
    session.set_brush_shape(BrushShape::Square);
    session.set_brush_size(50.0);
    drag(&mut session, &[(100.0, 125.0), (200.0, 125.0)]);
    drag(&mut session, &[(100.0, 175.0), (200.0, 175.0)]);
    // Erase the 10x10 block (145,145)-(155,155)
    session.set_mode(StrokeMode::Erase);
    session.set_brush_size(10.0);
    drag(&mut session, &[(150.0, 150.0)]);

    let saved = session.save_mask(&service).await.unwrap().unwrap();
    assert_eq!(saved.image_id, 1);
    assert_eq!(session.state(), SessionState::Ready);

    let masks = service.masks();
    assert_eq!(masks.len(), 1);
    assert_eq!(masks[0].filename, "harbour.png");
    assert_eq!((masks[0].original_width, masks[0].original_height), (1920, 1080));

    let mask = image::load_from_memory(&masks[0].bytes).unwrap().to_rgba8();
    assert_eq!(mask.dimensions(), (1920, 1080));
    assert!(mask
        .pixels()
        .all(|p| p.0 == [255, 255, 255, 255] || p.0 == [0, 0, 0, 255]));

    // Buffer to original is a factor of 2.4: the square maps to
    // (240,240)-(480,480) and the erased block to (348,348)-(372,372).
    // Edges get a few pixels of slack for the bilinear filter.
    for (x, y, pixel) in mask.enumerate_pixels() {
        let white = pixel.0 == [255, 255, 255, 255];
        if inside(x, y, 352, 368) {
            assert!(!white, "erased pixel ({}, {}) is white", x, y);
        } else if inside(x, y, 248, 472) && !inside(x, y, 340, 380) {
            assert!(white, "painted pixel ({}, {}) is black", x, y);
        } else if !inside(x, y, 232, 488) {
            assert!(!white, "unpainted pixel ({}, {}) is white", x, y);
        }
    }

    // The image now has a mask and drops out of the catalog
    assert!(available_images(&service).await.unwrap().is_empty());
}

async fn painted_session(service: &InMemoryUploadService) -> EditorSession {
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("canal.jpg", "image/jpeg", vec![0; 4]);
    session
        .upload_and_load(&file, service, &FixedDecoder(Dimensions::new(400, 300)))
        .await
        .unwrap();
    drag(&mut session, &[(20.0, 20.0), (120.0, 20.0)]);
    session
}

fn assert_untouched(session: &EditorSession) {
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.image().unwrap().info.filename, "canal.jpg");
    assert_eq!(session.original_dimensions(), Some(Dimensions::new(400, 300)));
    assert_eq!(session.pipeline().unwrap().log().len(), 1);
    assert!(session.pipeline().unwrap().has_paint());
}

#[tokio::test]
async fn test_failed_upload_keeps_current_image() {
    let service = InMemoryUploadService::new();
    let mut session = painted_session(&service).await;

    let offline = InMemoryUploadService::new().failing_uploads(ServiceError::Network("down".into()));
    let next = ImageFile::new("lock.jpg", "image/jpeg", vec![0; 4]);
    let err = session
        .upload_and_load(&next, &offline, &FixedDecoder(Dimensions::new(640, 480)))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::ImageLoad(ServiceError::Network(_))));
    assert_untouched(&session);

    // The kept image can still be saved
    assert!(session.save_mask(&service).await.unwrap().is_some());
}

#[tokio::test]
async fn test_failed_download_keeps_current_image() {
    let service = InMemoryUploadService::new();
    let mut session = painted_session(&service).await;

    let flaky = InMemoryUploadService::new().failing_fetches(ServiceError::Server {
        status: 502,
        body: "bad gateway".to_string(),
    });
    let stored = flaky
        .upload_image(&ImageFile::new("weir.jpg", "image/jpeg", vec![0; 4]))
        .await
        .unwrap();
    let err = session
        .open_uploaded(stored.id, &flaky, &FixedDecoder(Dimensions::new(640, 480)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::ImageLoad(ServiceError::Server { status: 502, .. })
    ));
    assert_untouched(&session);

    // Unknown ids fail the lookup without touching the session either
    let err = session
        .open_uploaded(99, &service, &FixedDecoder(Dimensions::new(640, 480)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::ImageLoad(ServiceError::Server { status: 404, .. })
    ));
    assert_untouched(&session);
}

#[tokio::test]
async fn test_mask_survives_container_resize() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("pier.jpg", "image/jpeg", vec![0; 4]);
    session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(1600, 1200)))
        .await
        .unwrap();
    drag(&mut session, &[(100.0, 100.0), (300.0, 100.0)]);

    session.set_container(400.0, 400.0).unwrap();
    assert_eq!(
        session.pipeline().unwrap().dimensions(),
        Dimensions::new(400, 300)
    );
    assert!(session.pipeline().unwrap().has_paint());

    session.save_mask(&service).await.unwrap();
    let mask = image::load_from_memory(&service.masks()[0].bytes)
        .unwrap()
        .to_rgba8();
    assert_eq!(mask.dimensions(), (1600, 1200));
    assert_eq!(mask.get_pixel(400, 200).0, [255, 255, 255, 255]);
    assert_eq!(mask.get_pixel(400, 600).0, [0, 0, 0, 255]);
}

#[tokio::test]
async fn test_unsupported_file_is_rejected_before_upload() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("diagram.png", "image/png", vec![0; 4]);

    let err = session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(10, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedFileType { .. }));
    assert_eq!(session.state(), SessionState::NoImage);
    assert!(service.list_images().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mpo_extension_is_accepted() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("stereo.MPO", "application/octet-stream", vec![0; 4]);
    session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(640, 480)))
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_empty_mask_is_never_uploaded() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("blank.jpg", "image/jpeg", vec![0; 4]);
    session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(300, 200)))
        .await
        .unwrap();

    assert!(matches!(
        session.save_mask(&service).await,
        Err(EditorError::EmptyMask)
    ));

    // Painting and erasing everything again is still empty
    session.set_brush_shape(BrushShape::Square);
    drag(&mut session, &[(50.0, 50.0)]);
    session.set_mode(StrokeMode::Erase);
    session.set_brush_size(50.0);
    drag(&mut session, &[(50.0, 50.0)]);
    assert!(matches!(
        session.save_mask(&service).await,
        Err(EditorError::EmptyMask)
    ));
    assert_eq!(service.save_calls(), 0);
}

#[tokio::test]
async fn test_decode_failure_leaves_no_image() {
    let service = InMemoryUploadService::new();
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("corrupt.jpg", "image/jpeg", vec![0xFF, 0xD8, 0x00]);

    let err = session
        .upload_and_load(&file, &service, &ImageCrateDecoder)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::ImageLoad(ServiceError::Decode(_))));
    assert_eq!(session.state(), SessionState::NoImage);
    assert!(session.pipeline().is_none());
}

#[tokio::test]
async fn test_open_uploaded_image() {
    let service = InMemoryUploadService::new();
    let uploaded = service
        .upload_image(&ImageFile::new("dock.jpg", "image/jpeg", jpeg(64, 48)))
        .await
        .unwrap();

    let mut session = EditorSession::new(EditorConfig::default());
    let loaded = session
        .open_uploaded(uploaded.id, &service, &ImageCrateDecoder)
        .await
        .unwrap();
    assert_eq!(loaded.original_dimensions, Dimensions::new(64, 48));
    assert_eq!(loaded.info.filename, "dock.jpg");
    // Small images are edited at full size
    assert_eq!(
        session.pipeline().unwrap().dimensions(),
        Dimensions::new(64, 48)
    );
}

#[tokio::test]
async fn test_newer_save_cancels_older() {
    let service = InMemoryUploadService::new().with_save_delay(Duration::from_millis(200));
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("quay.jpg", "image/jpeg", vec![0; 4]);
    session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(400, 300)))
        .await
        .unwrap();
    drag(&mut session, &[(20.0, 20.0), (120.0, 20.0)]);

    let first = session.prepare_save().unwrap();
    let (first_result, (second_generation, second_result)) = tokio::join!(first.run(&service), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = session.prepare_save().unwrap();
        let result = second.run(&service).await;
        (second.generation, result)
    });

    assert_eq!(first_result, Err(ServiceError::Cancelled));
    assert_eq!(session.complete_save(first.generation, first_result).unwrap(), None);
    assert_eq!(session.state(), SessionState::Saving);

    let saved = session.complete_save(second_generation, second_result).unwrap();
    assert!(saved.is_some());
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(service.save_calls(), 2);
    assert_eq!(service.masks().len(), 1);
}

#[tokio::test]
async fn test_failed_save_keeps_strokes() {
    let service = InMemoryUploadService::new().failing_saves(ServiceError::Server {
        status: 500,
        body: "boom".to_string(),
    });
    let mut session = EditorSession::new(EditorConfig::default());
    let file = ImageFile::new("dune.jpg", "image/jpeg", vec![0; 4]);
    session
        .upload_and_load(&file, &service, &FixedDecoder(Dimensions::new(400, 300)))
        .await
        .unwrap();
    drag(&mut session, &[(20.0, 20.0), (120.0, 20.0)]);

    let err = session.save_mask(&service).await.unwrap_err();
    assert!(matches!(err, EditorError::Service(ServiceError::Server { status: 500, .. })));
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.pipeline().unwrap().log().len(), 1);
}

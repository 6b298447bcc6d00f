use std::path::Path;

use photobook::{BlockRecord, CollageEngine, LayoutFile, PhotoBookError, Rgb8};

fn write_photo(path: &Path, w: u32, h: u32) {
    image::RgbImage::from_pixel(w, h, image::Rgb([90, 120, 150]))
        .save(path)
        .unwrap();
}

#[test]
fn save_and_load_restores_document() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("p.png");
    write_photo(&photo, 64, 32);

    let mut engine = CollageEngine::new("grid-3x2").unwrap();
    engine.set_canvas_size(1200, 900).unwrap();
    engine.set_margins(5, 6, 7);
    engine.set_background_color(Rgb8::new(1, 2, 3));
    engine.set_image_at_index(4, &photo).unwrap();
    engine.rotate_block(4, 270).unwrap();
    engine.zoom_block(4, 1.0).unwrap();

    let saved = dir.path().join("book.json");
    engine.save_layout(&saved, Some([800, 600])).unwrap();

    let mut restored = CollageEngine::default();
    restored.load_layout(&saved).unwrap();

    assert_eq!(restored.layout_name(), "grid-3x2");
    assert_eq!(restored.block_count(), 6);
    assert_eq!(restored.config().export, engine.config().export);
    assert_eq!(restored.config().margins, engine.config().margins);
    assert_eq!(restored.config().background, Rgb8::new(1, 2, 3));

    let block = &restored.blocks()[4];
    assert_eq!(block.image_path(), Some(photo.as_path()));
    assert!(!block.is_empty());
    assert_eq!(block.rotation_deg(), 270);
    assert!((block.user_scale() - 1.05).abs() < 1e-12);
    assert_eq!(restored.context(), engine.context());
}

#[test]
fn missing_image_file_leaves_block_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = CollageEngine::new("two-columns").unwrap();
    engine
        .set_image_at_index(1, dir.path().join("gone.png"))
        .unwrap();
    assert!(engine.blocks()[1].is_empty());

    let saved = dir.path().join("book.json");
    engine.save_layout(&saved, None).unwrap();
    let mut restored = CollageEngine::default();
    restored.load_layout(&saved).unwrap();
    assert!(restored.blocks()[1].is_empty());
    assert_eq!(
        restored.blocks()[1].image_path(),
        Some(dir.path().join("gone.png").as_path())
    );
}

#[test]
fn stock_blocks_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = CollageEngine::new("grid-2x2").unwrap();
    engine.rotate_block(3, 90).unwrap();
    engine.set_layout("single").unwrap();
    assert_eq!(engine.stock_context().len(), 3);

    let saved = dir.path().join("book.json");
    engine.save_layout(&saved, None).unwrap();

    let mut restored = CollageEngine::default();
    restored.load_layout(&saved).unwrap();
    assert_eq!(restored.block_count(), 1);
    restored.set_layout("grid-2x2").unwrap();
    assert_eq!(restored.blocks()[3].rotation_deg(), 90);
}

#[test]
fn explicit_load_propagates_persistence_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = CollageEngine::default();

    let err = engine.load_layout(&dir.path().join("none.json")).unwrap_err();
    assert!(err.is_persistence());

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{\"photo_context\": 3}").unwrap();
    assert!(engine.load_layout(&broken).unwrap_err().is_persistence());
}

#[test]
fn unknown_layout_in_file_is_rejected_untouched() {
    let mut engine = CollageEngine::new("grid-3x3").unwrap();
    let mut file = LayoutFile::default();
    file.input_context.layout = "hexagons".into();
    file.photo_context = vec![BlockRecord::default(); 2];

    let err = engine.apply_layout_file(&file).unwrap_err();
    assert!(matches!(err, PhotoBookError::Configuration(_)));
    assert_eq!(engine.layout_name(), "grid-3x3");
    assert_eq!(engine.block_count(), 9);
}

#[test]
fn set_context_restores_records() {
    let mut engine = CollageEngine::new("grid-2x2").unwrap();
    let mut records = engine.context();
    records[0].offset_x = 0.2;
    records[0].scale = 1.5;
    records[2].rotation = 180;

    let mut other = CollageEngine::new("grid-2x2").unwrap();
    other.set_context(&records);
    assert_eq!(other.context(), records);
    assert_eq!(other.blocks()[0].pan().dx, 0.2);
}

#[test]
fn old_files_without_optional_fields_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.json");
    std::fs::write(
        &path,
        r#"{
            "input_context": {"layout": "two-rows", "space_margin": 4},
            "photo_context": [
                {"rect_ratio": [0.0, 0.0, 1.0, 0.5]},
                {"rect_ratio": [0.0, 0.5, 1.0, 0.5], "rotation": 90}
            ]
        }"#,
    )
    .unwrap();

    let mut engine = CollageEngine::default();
    engine.load_layout(&path).unwrap();
    assert_eq!(engine.layout_name(), "two-rows");
    assert_eq!(engine.block_count(), 2);
    assert_eq!(engine.config().margins.spacing_px, 4);
    assert_eq!(engine.blocks()[1].rotation_deg(), 90);
    assert_eq!(engine.blocks()[0].user_scale(), 1.0);
}

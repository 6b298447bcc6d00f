use photobook::{CollageEngine, LayoutRegistry, PanOffset, Point};

#[test]
fn switching_away_and_back_restores_framing() {
    let names: Vec<&str> = LayoutRegistry::names().collect();
    for &a in &names {
        for &b in &names {
            let mut engine = CollageEngine::new(a).unwrap();
            let n = engine.block_count();
            for i in 0..n {
                engine.zoom_block(i, 1.0).unwrap();
                let edit = engine.config().edit_size();
                let start = Point::new(1.0, 1.0);
                engine.begin_drag(i, start, photobook::DragKind::Pan).unwrap();
                let end = Point::new(1.0 + f64::from(edit.width) * 0.01 * i as f64, 1.0);
                engine.drag_to(end);
                engine.end_drag(end).unwrap();
            }
            let before: Vec<(PanOffset, f64, i32)> = engine
                .active_blocks()
                .iter()
                .map(|blk| (blk.pan(), blk.user_scale(), blk.rotation_deg()))
                .collect();

            engine.set_layout(b).unwrap();
            engine.set_layout(a).unwrap();

            let after: Vec<(PanOffset, f64, i32)> = engine
                .active_blocks()
                .iter()
                .map(|blk| (blk.pan(), blk.user_scale(), blk.rotation_deg()))
                .collect();
            assert_eq!(before, after, "{a} -> {b} -> {a}");
        }
    }
}

#[test]
fn framing_is_per_layout() {
    let mut engine = CollageEngine::new("grid-2x2").unwrap();
    engine.zoom_block(0, 1.0).unwrap();
    engine.set_layout("grid-3x3").unwrap();
    assert_eq!(engine.blocks()[0].user_scale(), 1.0);
    engine.zoom_block(0, -1.0).unwrap();
    engine.set_layout("grid-2x2").unwrap();
    assert!((engine.blocks()[0].user_scale() - 1.05).abs() < 1e-12);
    engine.set_layout("grid-3x3").unwrap();
    assert!((engine.blocks()[0].user_scale() - 0.95).abs() < 1e-12);
}

#[test]
fn render_rects_stay_inside_canvas_for_every_layout() {
    let mut engine = CollageEngine::default();
    engine.set_margins(200, 200, 200);
    for name in LayoutRegistry::names() {
        engine.set_layout(name).unwrap();
        for blk in engine.active_blocks() {
            let r = blk.render_rect();
            assert!(r.x >= 0.0 && r.y >= 0.0, "{name}: {r:?}");
            assert!(r.x + r.w <= 1.0 + 1e-9 && r.y + r.h <= 1.0 + 1e-9, "{name}: {r:?}");
            assert!(r.w > 0.0 && r.h > 0.0, "{name}: {r:?}");
        }
    }
}

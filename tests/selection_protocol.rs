use std::time::Duration;

use rasterpad::{Editor, EngineConfig, Point};

fn test_editor() -> Editor {
    let config = EngineConfig {
        width: 100,
        height: 100,
        move_throttle: Duration::ZERO,
        ..Default::default()
    };
    Editor::new(config).unwrap()
}

fn drawing_bytes(editor: &Editor) -> Vec<u8> {
    editor.layers().drawing().raw().to_vec()
}

/// Commit a filled red square covering (5,5)..(15,15).
fn paint_red_block(editor: &mut Editor) {
    editor.set_active_tool("rectangle").unwrap();
    editor.set_color("#ff0000").unwrap();
    editor.set_fill_shape(true);
    editor.pointer_down(Point::new(5.0, 5.0));
    editor.pointer_move(Point::new(15.0, 15.0));
    editor.pointer_up(Point::new(15.0, 15.0));
}

fn drag_select(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    editor.set_active_tool("select").unwrap();
    editor.pointer_down(Point::new(from.0, from.1));
    editor.pointer_move(Point::new(to.0, to.1));
    editor.pointer_up(Point::new(to.0, to.1));
}

fn move_selection(editor: &mut Editor, grab: (f32, f32), to: (f32, f32)) {
    editor.pointer_down(Point::new(grab.0, grab.1));
    editor.pointer_move(Point::new(to.0, to.1));
    editor.pointer_up(Point::new(to.0, to.1));
}

#[test]
fn selection_cut_moves_pixels_on_commit() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);

    // Select a box around the block, cut it free.
    drag_select(&mut editor, (2.0, 2.0), (20.0, 20.0));
    // The cut is destructive: the origin is cleared while floating.
    assert_eq!(editor.layers().drawing().pixel(10, 10)[3], 0);
    // The floating content rides on the overlay instead.
    assert_eq!(editor.layers().overlay().pixel(10, 10), image::Rgba([255, 0, 0, 255]));

    // Grab inside the region and drag it 30 pixels right and down.
    move_selection(&mut editor, (10.0, 10.0), (40.0, 40.0));
    editor.commit_selection();

    // Former (10,10) content now lives at (40,40); origin stays cut.
    assert_eq!(editor.layers().drawing().pixel(40, 40), image::Rgba([255, 0, 0, 255]));
    assert_eq!(editor.layers().drawing().pixel(44, 44), image::Rgba([255, 0, 0, 255]));
    assert_eq!(editor.layers().drawing().pixel(10, 10)[3], 0);
    // Overlay is done with the selection.
    assert!(editor.layers().overlay().raw().iter().all(|b| *b == 0));
}

#[test]
fn commit_is_one_undo_step_back_to_pre_selection() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);
    let before_selection = drawing_bytes(&editor);

    drag_select(&mut editor, (2.0, 2.0), (20.0, 20.0));
    move_selection(&mut editor, (10.0, 10.0), (60.0, 60.0));
    editor.commit_selection();

    assert!(editor.undo());
    assert_eq!(drawing_bytes(&editor), before_selection);
}

#[test]
fn cancel_restores_the_pre_drag_state_exactly() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);
    let before_selection = drawing_bytes(&editor);

    drag_select(&mut editor, (2.0, 2.0), (20.0, 20.0));
    move_selection(&mut editor, (10.0, 10.0), (70.0, 30.0));
    editor.cancel_selection();

    assert_eq!(drawing_bytes(&editor), before_selection);
    assert!(editor.layers().overlay().raw().iter().all(|b| *b == 0));
    // Nothing was committed, so there is nothing extra to undo.
    assert!(editor.undo()); // reverts the red block itself
    assert!(!editor.undo());
}

#[test]
fn sub_pixel_drags_are_discarded_silently() {
    let mut editor = test_editor();
    drag_select(&mut editor, (20.0, 20.0), (20.5, 20.5));

    assert!(!editor.can_undo());
    assert!(editor.layers().overlay().raw().iter().all(|b| *b == 0));
}

#[test]
fn moving_is_clamped_to_canvas_bounds() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);
    drag_select(&mut editor, (5.0, 5.0), (15.0, 15.0));

    // Try to drag far past the bottom-right corner.
    move_selection(&mut editor, (10.0, 10.0), (500.0, 500.0));
    editor.commit_selection();

    // The 10×10 region stopped at the canvas edge: (90..100, 90..100).
    assert_eq!(editor.layers().drawing().pixel(95, 95), image::Rgba([255, 0, 0, 255]));
    assert_eq!(editor.layers().drawing().pixel(99, 99)[3], 255);
}

#[test]
fn switching_tools_commits_the_floating_selection() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);
    drag_select(&mut editor, (2.0, 2.0), (20.0, 20.0));
    move_selection(&mut editor, (10.0, 10.0), (50.0, 50.0));

    editor.set_active_tool("pencil").unwrap();

    assert_eq!(editor.layers().drawing().pixel(50, 50), image::Rgba([255, 0, 0, 255]));
    assert!(editor.layers().overlay().raw().iter().all(|b| *b == 0));
}

#[test]
fn dashed_marquee_previews_the_drag() {
    let mut editor = test_editor();
    editor.set_active_tool("select").unwrap();
    editor.pointer_down(Point::new(10.0, 10.0));
    editor.pointer_move(Point::new(40.0, 30.0));
    // Mid-drag the overlay holds the dashed rectangle.
    assert!(editor.layers().overlay().raw().iter().any(|b| *b != 0));
    editor.pointer_up(Point::new(40.0, 30.0));
}

#[test]
fn undo_during_floating_selection_cancels_it_first() {
    let mut editor = test_editor();
    paint_red_block(&mut editor);
    let before_selection = drawing_bytes(&editor);

    drag_select(&mut editor, (2.0, 2.0), (20.0, 20.0));
    move_selection(&mut editor, (10.0, 10.0), (60.0, 60.0));

    // Undo with a floating selection: the cut is restored, then the undo
    // applies to the clean state (reverting the red block).
    assert!(editor.undo());
    assert_ne!(drawing_bytes(&editor), before_selection);
    assert!(editor.redo());
    assert_eq!(drawing_bytes(&editor), before_selection);
}

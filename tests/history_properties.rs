use std::time::Duration;

use rasterpad::{Editor, EngineConfig, Point};

fn test_editor(width: u32, height: u32) -> Editor {
    let config = EngineConfig {
        width,
        height,
        move_throttle: Duration::ZERO,
        ..Default::default()
    };
    Editor::new(config).unwrap()
}

fn drawing_bytes(editor: &Editor) -> Vec<u8> {
    editor.layers().drawing().raw().to_vec()
}

fn stroke(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    editor.set_active_tool("pencil").unwrap();
    editor.pointer_down(Point::new(from.0, from.1));
    editor.pointer_move(Point::new(to.0, to.1));
    editor.pointer_up(Point::new(to.0, to.1));
}

#[test]
fn n_save_states_then_n_undos_restore_exactly() {
    let mut editor = test_editor(60, 60);
    let before = drawing_bytes(&editor);

    let n = 5;
    for _ in 0..n {
        editor.save_state();
    }
    for _ in 0..n {
        assert!(editor.undo());
        assert_eq!(drawing_bytes(&editor), before);
    }
    // The (N+1)th call is a no-op, not an error.
    assert!(!editor.undo());
    assert_eq!(drawing_bytes(&editor), before);
}

#[test]
fn undo_then_redo_is_identity_on_the_buffer() {
    let mut editor = test_editor(60, 60);
    stroke(&mut editor, (10.0, 10.0), (40.0, 40.0));
    stroke(&mut editor, (40.0, 10.0), (10.0, 40.0));
    let after_both = drawing_bytes(&editor);

    assert!(editor.undo());
    assert_ne!(drawing_bytes(&editor), after_both);
    assert!(editor.redo());
    assert_eq!(drawing_bytes(&editor), after_both);

    // A second undo returns to the pre-redo state.
    let after_one = {
        editor.undo();
        drawing_bytes(&editor)
    };
    editor.redo();
    editor.undo();
    assert_eq!(drawing_bytes(&editor), after_one);
}

#[test]
fn committing_mutation_clears_the_redo_stack() {
    let mut editor = test_editor(60, 60);
    stroke(&mut editor, (5.0, 5.0), (50.0, 5.0));
    let after_first = drawing_bytes(&editor);

    editor.undo();
    stroke(&mut editor, (5.0, 20.0), (50.0, 20.0));
    let after_second = drawing_bytes(&editor);

    assert!(!editor.can_redo());
    assert!(!editor.redo());
    // The first stroke's state is unreachable forward.
    assert_eq!(drawing_bytes(&editor), after_second);
    assert_ne!(after_first, after_second);
}

#[test]
fn progressive_strokes_capture_once_per_gesture() {
    let mut editor = test_editor(60, 60);
    editor.set_active_tool("pencil").unwrap();
    let before = drawing_bytes(&editor);

    editor.pointer_down(Point::new(5.0, 30.0));
    editor.pointer_move(Point::new(20.0, 30.0));
    // The stroke renders progressively, before release.
    assert!(editor.layers().drawing().pixel(12, 30)[3] > 0);
    editor.pointer_move(Point::new(40.0, 30.0));
    editor.pointer_up(Point::new(55.0, 30.0));

    // One undo reverts the whole gesture, not one segment.
    assert!(editor.undo());
    assert_eq!(drawing_bytes(&editor), before);
}

#[test]
fn clear_canvas_is_undoable() {
    let mut editor = test_editor(60, 60);
    stroke(&mut editor, (10.0, 10.0), (50.0, 50.0));
    let drawn = drawing_bytes(&editor);

    editor.clear_canvas();
    assert!(editor.layers().drawing().raw().iter().all(|b| *b == 0));

    assert!(editor.undo());
    assert_eq!(drawing_bytes(&editor), drawn);
}

#[test]
fn eviction_bounds_undo_depth() {
    let config = EngineConfig {
        width: 50,
        height: 50,
        max_undo_steps: 5,
        move_throttle: Duration::ZERO,
        ..Default::default()
    };
    let mut editor = Editor::new(config).unwrap();
    for i in 0..10 {
        stroke(&mut editor, (1.0, 1.0 + i as f32 * 4.0), (48.0, 1.0 + i as f32 * 4.0));
    }
    let mut undos = 0;
    while editor.undo() {
        undos += 1;
    }
    // Five snapshots retained: four steps back from the live state.
    assert_eq!(undos, 4);
}

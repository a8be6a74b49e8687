use polycell::{RasterizerCells, POLY_SUBPIXEL_SCALE};

const S: i32 = POLY_SUBPIXEL_SCALE;

#[test]
fn move_to_after_sort_resets() {
    let mut ras: RasterizerCells = RasterizerCells::new();
    ras.move_to(0, 0);
    ras.line_to(4 * S, 4 * S);
    ras.sort_cells();
    assert!(ras.total_cells() > 0);

    ras.move_to(10 * S, 10 * S);
    assert_eq!(ras.total_cells(), 0);
    ras.line_to(10 * S, 12 * S);
    ras.sort_cells();
    assert_eq!(ras.min_y(), 10);
}

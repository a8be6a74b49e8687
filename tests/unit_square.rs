mod support;

use polycell::{RasterizerCells, POLY_SUBPIXEL_SCALE};

const S: i32 = POLY_SUBPIXEL_SCALE;

#[test]
fn unit_square_stays_on_one_row() {
    let mut ras = RasterizerCells::new();
    ras.move_to(0, 0);
    ras.line_to(S, 0);
    ras.line_to(S, S);
    ras.line_to(0, S);
    ras.line_to(0, 0);
    ras.sort_cells();

    assert_eq!(ras.min_y(), 0);
    assert_eq!(ras.max_y(), 0);
    let cells = support::collect(&ras);
    assert!(cells.iter().all(|c| c.y == 0));
    assert_eq!(cells.iter().map(|c| c.cover as i64).sum::<i64>(), 0);
}

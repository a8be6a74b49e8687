mod support;

use polycell::{poly_coord, RasterizerCells, POLY_SUBPIXEL_SCALE};

const S: i32 = POLY_SUBPIXEL_SCALE;

#[test]
fn reset_matches_a_fresh_instance() {
    let path = |ras: &mut RasterizerCells| {
        ras.move_to(poly_coord(1.1), poly_coord(2.7));
        ras.line_to(poly_coord(8.3), poly_coord(5.2));
        ras.line_to(poly_coord(4.0), poly_coord(9.9));
        ras.line_to(poly_coord(1.1), poly_coord(2.7));
        ras.sort_cells();
    };

    let mut fresh = RasterizerCells::new();
    path(&mut fresh);

    let mut reused = RasterizerCells::new();
    reused.move_to(0, 0);
    reused.line_to(30 * S, 17 * S);
    reused.sort_cells();
    reused.reset();
    path(&mut reused);

    assert_eq!(support::collect(&fresh), support::collect(&reused));
}

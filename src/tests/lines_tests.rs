use std::collections::HashSet;
use std::sync::Arc;

use crate::position::{LineSet, Shape, Square};
use crate::Error;

#[test]
fn tic_tac_toe_has_8_lines_test() {
    let lines = LineSet::new(Shape::TIC_TAC_TOE);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines.lines().iter().filter(|line| line.is_diagonal()).count(), 2);

    let mut expected: Vec<Vec<u16>> = vec![
        vec![0, 1, 2],
        vec![3, 4, 5],
        vec![6, 7, 8],
        vec![0, 3, 6],
        vec![1, 4, 7],
        vec![2, 5, 8],
        vec![0, 4, 8],
        vec![2, 4, 6],
    ];
    let mut actual: Vec<Vec<u16>> = lines
        .lines()
        .iter()
        .map(|line| {
            let mut squares: Vec<u16> = line.squares().iter().map(|sq| sq.into_inner()).collect();
            squares.sort_unstable();
            squares
        })
        .collect();
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected);
}

#[test]
fn qubic_has_76_lines_test() {
    let lines = LineSet::new(Shape::QUBIC);
    assert_eq!(lines.len(), 76);
    // 48 rows and columns, 24 diagonals in planes, 4 space diagonals
    assert_eq!(lines.lines().iter().filter(|line| line.span() == 1).count(), 48);
    assert_eq!(lines.lines().iter().filter(|line| line.span() == 2).count(), 24);
    assert_eq!(lines.lines().iter().filter(|line| line.span() == 3).count(), 4);
}

#[test]
fn line_count_formula_test() {
    for (dimensions, side, expected) in [(1, 3, 1), (2, 4, 10), (3, 3, 49), (4, 3, 272), (4, 4, 520)] {
        let shape = Shape::new(dimensions, side).unwrap();
        assert_eq!(shape.num_lines(), expected, "{}", shape);
        assert_eq!(LineSet::new(shape).len(), expected, "{}", shape);
    }
}

#[test]
fn lines_are_distinct_and_full_length_test() {
    for shape in [
        Shape::TIC_TAC_TOE,
        Shape::QUBIC,
        Shape::new(4, 3).unwrap(),
        Shape::new(2, 5).unwrap(),
    ] {
        let lines = LineSet::new(shape);
        let mut seen = HashSet::new();
        for line in lines.lines() {
            assert_eq!(line.squares().len(), shape.side() as usize);
            let squares: HashSet<Square> = line.squares().iter().copied().collect();
            assert_eq!(squares.len(), shape.side() as usize, "Repeated square in {:?}", line);
            assert!(line.squares().iter().all(|sq| shape.contains(*sq)));

            let mut key: Vec<Square> = line.squares().to_vec();
            key.sort();
            assert!(seen.insert(key), "Line {:?} generated twice", line);
        }
    }
}

#[test]
fn lines_through_square_test() {
    let lines = LineSet::new(Shape::TIC_TAC_TOE);
    assert_eq!(lines.lines_through(Square::from_u16(4)).count(), 4);
    for corner in [0, 2, 6, 8] {
        assert_eq!(lines.lines_through(Square::from_u16(corner)).count(), 3);
    }
    for edge in [1, 3, 5, 7] {
        assert_eq!(lines.lines_through(Square::from_u16(edge)).count(), 2);
    }
    for square in Shape::TIC_TAC_TOE.squares() {
        assert!(lines
            .lines_through(square)
            .all(|line| line.squares().contains(&square)));
    }
}

#[test]
fn qubic_cell_weights_test() {
    let lines = LineSet::new(Shape::QUBIC);
    // Corners and the 8 center cells lie on 4 diagonals each
    for square in [0, 3, 12, 15, 21, 22, 25, 26, 37, 38, 41, 42, 48, 51, 60, 63] {
        assert_eq!(lines.cell_weight(Square::from_u16(square)), 5, "Square {}", square);
    }
    assert_eq!(lines.cell_weight(Square::from_u16(1)), 2);

    let qubic_lines = LineSet::new(Shape::QUBIC);
    assert!(qubic_lines.total_weight() > qubic_lines.len() as i32);
}

#[test]
fn line_sets_are_shared_test() {
    let first = LineSet::for_shape(Shape::QUBIC);
    let second = LineSet::for_shape(Shape::QUBIC);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.shape(), Shape::QUBIC);
}

#[test]
fn invalid_shapes_test() {
    for (dimensions, side) in [(0, 3), (2, 1), (2, 17), (7, 2), (4, 9)] {
        assert!(
            matches!(
                Shape::new(dimensions, side),
                Err(Error::InvalidShape { .. })
            ),
            "{}d side {} should be rejected",
            dimensions,
            side
        );
    }
    assert!(Shape::new(6, 4).is_ok());
}

#[test]
fn coordinates_test() {
    let shape = Shape::TIC_TAC_TOE;
    let square = shape.square_from_coords(&[2, 1]).unwrap();
    assert_eq!(square, Square::from_u16(5));
    assert_eq!(shape.coords(square).as_slice(), &[2, 1]);

    assert_eq!(shape.parse_square("2,1").unwrap(), square);
    assert_eq!(shape.parse_square(" 5 ").unwrap(), square);
    assert!(shape.parse_square("9").is_err());
    assert!(shape.parse_square("3,0").is_err());
    assert!(shape.parse_square("1,1,1").is_err());
    assert!(shape.parse_square("a").is_err());

    for square in Shape::QUBIC.squares() {
        let coords = Shape::QUBIC.coords(square);
        assert_eq!(Shape::QUBIC.square_from_coords(&coords).unwrap(), square);
    }
    assert_eq!(Square::from_u16(21).display_with_shape(Shape::QUBIC), "21 (1,1,1)");
}

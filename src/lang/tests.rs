// src/lang/tests.rs

use crate::color::{Rgba, BG_RECT_FILL, DEFAULT_FIGURE_COLOR};
use crate::geometry::{Rect, Size};
use crate::lang::{CommandError, ParseError, Parser};
use crate::painter::{BgRect, Figure, Operation, OperationKind as K};
use crate::surface::recording::RecordingSurface;
use crate::surface::Surface;
use std::io::{self, Read};

fn compile(script: &str) -> Vec<Operation> {
    Parser::new().parse_str(script).unwrap()
}

fn kinds(ops: &[Operation]) -> Vec<K> {
    ops.iter().map(Operation::kind).collect()
}

fn figure_at(op: &Operation) -> Figure {
    match op {
        Operation::Figure(handle) => handle.get(),
        other => panic!("expected a figure, got {:?}", other),
    }
}

fn fill_color(op: &Operation) -> Rgba {
    match op {
        Operation::Fill(color) => *color,
        other => panic!("expected a fill, got {:?}", other),
    }
}

// --- Emission order ---

#[test_log::test]
fn test_empty_input_emits_reset_only() {
    assert_eq!(kinds(&compile("")), vec![K::Reset]);
    assert_eq!(kinds(&compile("\n  \n# nothing here\n")), vec![K::Reset]);
}

#[test_log::test]
fn test_reset_alone_emits_single_reset() {
    assert_eq!(kinds(&compile("reset\n")), vec![K::Reset]);
    assert_eq!(
        kinds(&compile("green\nbgrect 0 0 5 5\nfigure 1 1\nmove 1 1\nupdate\nreset\n")),
        vec![K::Reset]
    );
}

#[test_log::test]
fn test_white_figure_update_round_trip() {
    let ops = compile("white\nfigure 10 10\nupdate\n");
    assert_eq!(kinds(&ops), vec![K::Fill, K::Figure, K::Update]);
    assert_eq!(fill_color(&ops[0]), Rgba::WHITE);
    assert_eq!(figure_at(&ops[1]), Figure::new(10, 10, DEFAULT_FIGURE_COLOR));

    let mut surface = RecordingSurface::new(Size::new(800, 800));
    let readiness: Vec<bool> = ops.iter().map(|op| op.apply(&mut surface)).collect();
    assert_eq!(readiness, vec![false, false, true]);
}

#[test_log::test]
fn test_groups_are_emitted_in_fixed_order_regardless_of_input_order() {
    let script = "\
update
figure 1 1
move 5 5
bgrect 0 0 10 10
figure 2 2
green
move 6 6
";
    let ops = compile(script);
    assert_eq!(kinds(&ops), vec![K::Fill, K::BgRect, K::Move, K::Move, K::Figure, K::Figure, K::Update]);
    assert_eq!(fill_color(&ops[0]), Rgba::GREEN);

    match (&ops[2], &ops[3]) {
        (Operation::Move(first), Operation::Move(second)) => {
            assert_eq!((first.dx, first.dy), (5, 5));
            assert_eq!((second.dx, second.dy), (6, 6));
        }
        other => panic!("unexpected operations {:?}", other),
    }
    assert_eq!((figure_at(&ops[4]).x, figure_at(&ops[5]).x), (1, 2));
}

#[test_log::test]
fn test_last_background_and_rect_win() {
    let ops = compile("white\nbgrect 0 0 1 1\ngreen\nbgrect 5 6 7 8\n");
    assert_eq!(kinds(&ops), vec![K::Fill, K::BgRect]);
    assert_eq!(fill_color(&ops[0]), Rgba::GREEN);
    match &ops[1] {
        Operation::BgRect(rect) => assert_eq!(*rect, BgRect::new(5, 6, 7, 8)),
        other => panic!("expected bgrect, got {:?}", other),
    }
}

#[test_log::test]
fn test_instructions_after_reset_are_kept() {
    let ops = compile("green\nfigure 1 1\nreset\nwhite\nfigure 9 9\n");
    assert_eq!(kinds(&ops), vec![K::Fill, K::Figure]);
    assert_eq!(fill_color(&ops[0]), Rgba::WHITE);
    assert_eq!(figure_at(&ops[1]).x, 9);
}

// --- Move snapshots ---

#[test_log::test]
fn test_move_before_any_figure_affects_nothing() {
    let ops = compile("move 10 10\nfigure 0 0\n");
    match &ops[1] {
        Operation::Move(mv) => assert!(mv.figures().is_empty()),
        other => panic!("expected move, got {:?}", other),
    }

    let mut surface = RecordingSurface::new(Size::new(100, 100));
    for op in &ops {
        op.apply(&mut surface);
    }
    assert_eq!(figure_at(&ops[2]), Figure::new(0, 0, DEFAULT_FIGURE_COLOR));
}

#[test_log::test]
fn test_move_captures_exactly_prior_figures() {
    let ops = compile("figure 0 0\nfigure 10 10\nmove 5 5\nfigure 20 20\n");
    assert_eq!(kinds(&ops), vec![K::Reset, K::Move, K::Figure, K::Figure, K::Figure]);

    let Operation::Move(mv) = &ops[1] else {
        panic!("expected move");
    };
    assert_eq!(mv.figures().len(), 2);

    let mut surface = RecordingSurface::new(Size::new(100, 100));
    for op in &ops {
        op.apply(&mut surface);
    }
    let positions: Vec<(i32, i32)> = ops[2..]
        .iter()
        .map(figure_at)
        .map(|f| (f.x, f.y))
        .collect();
    assert_eq!(positions, vec![(5, 5), (15, 15), (20, 20)]);
}

#[test_log::test]
fn test_moves_share_figures_by_identity() {
    let ops = compile("figure 0 0\nmove 1 0\nfigure 0 0\nmove 0 1\n");
    let (Operation::Move(first), Operation::Move(second)) = (&ops[1], &ops[2]) else {
        panic!("expected two moves");
    };
    assert!(first.figures()[0].same_figure(&second.figures()[0]));
    assert_eq!(second.figures().len(), 2);

    let mut surface = RecordingSurface::new(Size::new(10, 10));
    for op in &ops {
        op.apply(&mut surface);
    }
    assert_eq!((figure_at(&ops[3]).x, figure_at(&ops[3]).y), (1, 1));
    assert_eq!((figure_at(&ops[4]).x, figure_at(&ops[4]).y), (0, 1));
}

#[test_log::test]
fn test_compiled_pass_draws_expected_pixels() {
    let ops = compile("white\nbgrect 0 0 100 50\nfigure 400 400\nmove 0 100\nupdate\n");
    let mut surface = RecordingSurface::new(Size::new(800, 800));
    let ready = ops.iter().fold(false, |ready, op| op.apply(&mut surface) | ready);
    assert!(ready);

    assert_eq!(surface.pixel(50, 25), Some(BG_RECT_FILL));
    assert_eq!(surface.pixel(150, 25), Some(Rgba::WHITE));
    // Moved down by 100: the bar now spans y in [500, 600).
    assert_eq!(surface.pixel(400, 550), Some(DEFAULT_FIGURE_COLOR));
    assert_eq!(surface.pixel(250, 450), Some(Rgba::WHITE));
    assert_eq!(
        surface.fills().last().map(|(r, _)| *r),
        Some(Rect::new(338, 300, 463, 500))
    );
}

#[test_log::test]
fn test_extreme_coordinates_draw_without_overflow() {
    let ops = compile("figure 2147483600 0\nfigure 0 0\nmove 2147483647 0\nmove 1 0\nupdate\n");
    let mut surface = RecordingSurface::new(Size::new(800, 800));
    let ready = ops.iter().fold(false, |ready, op| op.apply(&mut surface) | ready);
    assert!(ready);

    let xs: Vec<i32> = ops[3..5].iter().map(|op| figure_at(op).x).collect();
    assert_eq!(xs, vec![i32::MAX, i32::MAX]);
    // Only the reset; both figures sit far off-surface.
    assert_eq!(surface.fills().len(), 1);
}

// --- State across passes ---

#[test_log::test]
fn test_state_carries_over_between_passes() {
    let mut parser = Parser::new();
    parser
        .parse_str("green\nbgrect 0 0 5 5\nfigure 1 1\nmove 2 2\nupdate\n")
        .unwrap();

    let second = parser.parse_str("figure 3 3\n").unwrap();
    assert_eq!(kinds(&second), vec![K::Fill, K::BgRect, K::Figure, K::Figure]);
    assert_eq!(fill_color(&second[0]), Rgba::GREEN);
    assert_eq!(parser.figures().len(), 2);
}

#[test_log::test]
fn test_reset_clears_carried_state() {
    let mut parser = Parser::new();
    parser.parse_str("white\nfigure 1 1\n").unwrap();
    assert_eq!(kinds(&parser.parse_str("reset\n").unwrap()), vec![K::Reset]);
    assert_eq!(kinds(&parser.parse_str("").unwrap()), vec![K::Reset]);
    assert!(parser.figures().is_empty());
}

#[test_log::test]
fn test_independent_parsers_do_not_interfere() {
    let mut a = Parser::new();
    let mut b = Parser::new();
    a.parse_str("white\nfigure 1 1\n").unwrap();
    assert_eq!(kinds(&b.parse_str("").unwrap()), vec![K::Reset]);
    assert_eq!(kinds(&a.parse_str("").unwrap()), vec![K::Fill, K::Figure]);
}

// --- Errors ---

#[test_log::test]
fn test_missing_argument_reports_line_number() {
    let mut parser = Parser::new();
    let err = parser
        .parse_str("white\n# comment\n\nfigure 1\nfigure 2 2\n")
        .unwrap_err();

    assert_eq!(err.line(), Some(4));
    assert!(matches!(
        err,
        ParseError::Command {
            line: 4,
            error: CommandError::WrongArity { instruction: "figure", expected: 2, got: 1 },
        }
    ));
    assert_eq!(err.to_string(), "line 4: figure expects 2 argument(s), got 1");
}

#[test_log::test]
fn test_unknown_instruction_and_bad_integer() {
    let err = Parser::new().parse_str("white\ncircle 1 2\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Command { line: 2, error: CommandError::UnknownInstruction(ref name) } if name == "circle"
    ));

    let err = Parser::new().parse_str("move x 1\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Command { line: 1, error: CommandError::InvalidInteger { position: 0, .. } }
    ));
}

#[test_log::test]
fn test_failed_pass_leaves_state_untouched() {
    let mut parser = Parser::new();
    parser.parse_str("green\nfigure 1 1\n").unwrap();

    assert!(parser.parse_str("reset\nwhite\nfigure 2\n").is_err());
    assert_eq!(parser.figures().len(), 1);

    let ops = parser.parse_str("").unwrap();
    assert_eq!(kinds(&ops), vec![K::Fill, K::Figure]);
    assert_eq!(fill_color(&ops[0]), Rgba::GREEN);
}

#[test_log::test]
fn test_missing_source_is_an_error() {
    let err = Parser::new().parse_source(None::<&[u8]>).unwrap_err();
    assert!(matches!(err, ParseError::NoInput));
    assert_eq!(err.line(), None);

    let ops = Parser::new().parse_source(Some("update\n".as_bytes())).unwrap();
    assert_eq!(kinds(&ops), vec![K::Reset, K::Update]);
}

/// Yields one good line, then fails.
struct BrokenReader {
    sent: bool,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        }
        self.sent = true;
        let line = b"white\n";
        buf[..line.len()].copy_from_slice(line);
        Ok(line.len())
    }
}

#[test_log::test]
fn test_read_failure_is_tagged_with_line() {
    let err = Parser::new().parse(BrokenReader { sent: false }).unwrap_err();
    match err {
        ParseError::Read { line, ref source } => {
            assert_eq!(line, 2);
            assert_eq!(source.to_string(), "disk on fire");
        }
        other => panic!("expected read error, got {:?}", other),
    }
}

use gate_board::assert_listing_eq;
use gate_board::board::Board;
use gate_board::config::BoardConfig;
use gate_board::element::{ElementId, Variant};
use gate_board::error::{BoardError, EvalError};
use gate_board::eval::EvalFault;
use gate_board::geometry::Point;
use gate_board::pin::PinRef;
use rstest::rstest;

fn link(board: &mut Board, from: (ElementId, usize), to: (ElementId, usize)) {
    board
        .connect(PinRef::new(from.0, from.1), PinRef::new(to.0, to.1))
        .unwrap();
}

fn source(board: &mut Board, high: bool, y: i32) -> ElementId {
    let s = board.add(Variant::InputSource, Point::new(0, y));
    if high {
        board.toggle(s).unwrap();
    }
    s
}

/// XOR of two sources out of OR, AND and NOT
fn xor_board() -> (Board, [ElementId; 3]) {
    let mut board = Board::new("xor".to_string());
    let a = source(&mut board, false, 0);
    let b = source(&mut board, false, 100);
    let or = board.add(Variant::OrGate, Point::new(100, 0));
    let and = board.add(Variant::AndGate, Point::new(100, 100));
    let not = board.add(Variant::NotGate, Point::new(200, 100));
    let xor = board.add(Variant::AndGate, Point::new(300, 0));
    let lamp = board.add(Variant::OutputLamp, Point::new(400, 0));
    link(&mut board, (a, 0), (or, 0));
    link(&mut board, (b, 0), (or, 1));
    link(&mut board, (a, 0), (and, 0));
    link(&mut board, (b, 0), (and, 1));
    link(&mut board, (and, 2), (not, 0));
    link(&mut board, (or, 2), (xor, 0));
    link(&mut board, (not, 1), (xor, 1));
    link(&mut board, (xor, 2), (lamp, 0));
    (board, [a, b, lamp])
}

#[rstest]
#[case(Variant::AndGate, false, false, false)]
#[case(Variant::AndGate, true, false, false)]
#[case(Variant::AndGate, false, true, false)]
#[case(Variant::AndGate, true, true, true)]
#[case(Variant::OrGate, false, false, false)]
#[case(Variant::OrGate, true, false, true)]
#[case(Variant::OrGate, false, true, true)]
#[case(Variant::OrGate, true, true, true)]
fn test_two_input_gates(
    #[case] variant: Variant,
    #[case] a: bool,
    #[case] b: bool,
    #[case] expected: bool,
) {
    let mut board = Board::new("gate".to_string());
    let sa = source(&mut board, a, 0);
    let sb = source(&mut board, b, 60);
    let gate = board.add(variant, Point::new(100, 30));
    link(&mut board, (sa, 0), (gate, 0));
    link(&mut board, (sb, 0), (gate, 1));
    let eval = board.evaluate_traced(gate).unwrap();
    assert_eq!(eval.value, expected);
    assert!(eval.faults.is_empty());
}

#[rstest]
#[case(false, true)]
#[case(true, false)]
fn test_not_gate(#[case] input: bool, #[case] expected: bool) {
    let mut board = Board::new("not".to_string());
    let s = source(&mut board, input, 0);
    let not = board.add(Variant::NotGate, Point::new(100, 0));
    link(&mut board, (s, 0), (not, 0));
    assert_eq!(board.evaluate(not), Ok(expected));
}

#[test]
fn test_disconnected_inputs_read_false() {
    let mut board = Board::new("open".to_string());
    let and = board.add(Variant::AndGate, Point::new(0, 0));
    let not = board.add(Variant::NotGate, Point::new(0, 100));
    let lamp = board.add(Variant::OutputLamp, Point::new(0, 200));

    let eval = board.evaluate_traced(and).unwrap();
    assert!(!eval.value);
    assert_eq!(
        eval.faults,
        vec![
            EvalFault::Unconnected(PinRef::new(and, 0)),
            EvalFault::Unconnected(PinRef::new(and, 1)),
        ]
    );
    assert!(eval.faults.iter().all(EvalFault::is_warning));

    assert_eq!(board.evaluate(not), Ok(true));
    assert_eq!(board.evaluate(lamp), Ok(false));
}

#[rstest]
#[case(false, false)]
#[case(true, true)]
fn test_or_with_one_side_open(#[case] other: bool, #[case] expected: bool) {
    let mut board = Board::new("or".to_string());
    let s = source(&mut board, other, 0);
    let or = board.add(Variant::OrGate, Point::new(100, 0));
    link(&mut board, (s, 0), (or, 1));
    let eval = board.evaluate_traced(or).unwrap();
    assert_eq!(eval.value, expected);
    assert_eq!(eval.faults, vec![EvalFault::Unconnected(PinRef::new(or, 0))]);
}

#[test]
fn test_and_with_one_side_open() {
    let mut board = Board::new("and".to_string());
    let s = source(&mut board, true, 0);
    let and = board.add(Variant::AndGate, Point::new(100, 0));
    link(&mut board, (s, 0), (and, 0));
    let eval = board.evaluate_traced(and).unwrap();
    assert!(!eval.value);
    assert_eq!(eval.faults, vec![EvalFault::Unconnected(PinRef::new(and, 1))]);
}

#[test]
fn test_source_parity() {
    let mut board = Board::new("parity".to_string());
    let s = board.add(Variant::InputSource, Point::new(0, 0));
    for n in 0..5 {
        assert_eq!(board.evaluate(s), Ok(n % 2 == 1));
        board.toggle(s).unwrap();
    }
}

#[test]
fn test_lamp_follows_source() {
    let mut board = Board::new("lamp".to_string());
    let s = board.add(Variant::InputSource, Point::new(0, 0));
    let lamp = board.add(Variant::OutputLamp, Point::new(100, 0));
    link(&mut board, (s, 0), (lamp, 0));
    for _ in 0..4 {
        let level = board.toggle(s).unwrap();
        assert_eq!(board.evaluate(lamp), Ok(level));
        assert_eq!(board.is_lit(lamp), Some(level));
    }
}

#[test]
fn test_compound_reads_false() {
    let mut board = Board::new("compound".to_string());
    let s = source(&mut board, true, 0);
    board.start_group();
    board.add_to_group(s).unwrap();
    let group = board.end_group().unwrap();
    assert_eq!(board.evaluate(group), Ok(false));
}

#[test]
fn test_unknown_element() {
    let mut board = Board::new("unknown".to_string());
    let ghost = ElementId::from(3);
    assert_eq!(board.evaluate(ghost), Err(EvalError::UnknownElement(ghost)));
}

#[test]
fn test_loop_fails_fast() {
    let config = BoardConfig::default().with_reject_loops(false);
    let mut board = Board::with_config("ring".to_string(), config);
    let not = board.add(Variant::NotGate, Point::new(0, 0));
    let looped = board.add(Variant::OutputLamp, Point::new(100, 0));
    link(&mut board, (not, 1), (not, 0));
    link(&mut board, (not, 1), (looped, 0));
    let s = source(&mut board, true, 100);
    let fine = board.add(Variant::OutputLamp, Point::new(100, 100));
    link(&mut board, (s, 0), (fine, 0));

    assert_eq!(board.evaluate(looped), Err(EvalError::CombinationalLoop(not)));

    // The pass keeps going after a bad lamp
    let report = board.evaluate_lamps();
    assert_eq!(report.lamps(), &[looped, fine]);
    assert_eq!(report.level(looped), Some(false));
    assert_eq!(report.level(fine), Some(true));
    assert_eq!(
        report.failures(),
        &[(looped, EvalError::CombinationalLoop(not))]
    );
    assert!(!report.is_clean());
    assert_eq!(board.is_lit(looped), Some(false));
    assert_eq!(board.is_lit(fine), Some(true));
}

#[test]
fn test_failed_lamp_goes_dark() {
    let config = BoardConfig::default().with_reject_loops(false);
    let mut board = Board::with_config("flicker".to_string(), config);
    let s = source(&mut board, true, 0);
    let lamp = board.add(Variant::OutputLamp, Point::new(200, 0));
    let wire = board
        .connect(PinRef::new(s, 0), PinRef::new(lamp, 0))
        .unwrap();
    assert_eq!(board.evaluate(lamp), Ok(true));
    assert_eq!(board.is_lit(lamp), Some(true));

    board.disconnect(wire).unwrap();
    let not = board.add(Variant::NotGate, Point::new(100, 100));
    link(&mut board, (not, 1), (not, 0));
    link(&mut board, (not, 1), (lamp, 0));
    assert_eq!(board.evaluate(lamp), Err(EvalError::CombinationalLoop(not)));
    assert_eq!(board.is_lit(lamp), Some(false));
}

#[test]
fn test_depth_limit() {
    let config = BoardConfig::default().with_max_eval_depth(3);
    let mut board = Board::with_config("deep".to_string(), config);
    let s = source(&mut board, false, 0);
    let mut nots = Vec::new();
    let mut out = (s, 0);
    for i in 1..=4 {
        let not = board.add(Variant::NotGate, Point::new(100 * i, 0));
        link(&mut board, out, (not, 0));
        out = (not, 1);
        nots.push(not);
    }
    let lamp = board.add(Variant::OutputLamp, Point::new(500, 0));
    link(&mut board, out, (lamp, 0));

    assert_eq!(board.evaluate(lamp), Err(EvalError::DepthExceeded(3)));
    assert_eq!(board.evaluate(nots[3]), Err(EvalError::DepthExceeded(3)));
    // NOT, NOT, source
    assert_eq!(board.evaluate(nots[1]), Ok(false));
}

#[test]
fn test_evaluate_lamps_report() {
    let (mut board, [a, _, lamp]) = xor_board();
    let dangling = board.add(Variant::OutputLamp, Point::new(400, 100));
    board.toggle(a).unwrap();

    let report = board.evaluate_lamps();
    assert_eq!(report.lamps(), &[lamp, dangling]);
    assert_eq!(report.levels().len(), 2);
    assert!(report.levels()[0]);
    assert!(!report.levels()[1]);
    assert_eq!(
        report.faults(),
        &[EvalFault::Unconnected(PinRef::new(dangling, 0))]
    );
    assert!(report.failures().is_empty());
    assert_eq!(board.is_lit(lamp), Some(true));
}

#[test]
fn test_lamps_inside_compounds_are_evaluated() {
    let (mut board, [a, _, lamp]) = xor_board();
    board.start_group();
    board.add_to_group(lamp).unwrap();
    board.end_group().unwrap();
    board.toggle(a).unwrap();
    assert!(!board.is_placed(lamp));
    let report = board.evaluate_lamps();
    assert_eq!(report.level(lamp), Some(true));
}

#[test]
fn test_truth_table() {
    let (board, [a, b, lamp]) = xor_board();
    let table = board.truth_table().unwrap();
    assert_eq!(table.sources(), &[a, b]);
    assert_eq!(table.lamps(), &[lamp]);
    assert_eq!(table.len(), 4);
    let column: Vec<bool> = (0..4).map(|r| table.row(r).unwrap()[0]).collect();
    assert_eq!(column, vec![false, true, true, false]);
    assert!(table.lookup(&[true, true]).is_some_and(|r| !r[0]));
    assert!(table.lookup(&[true]).is_none());

    assert_listing_eq!(
        table.to_string(),
        "e0 e1 | e6
         0 0 | 0
         1 0 | 1
         0 1 | 1
         1 1 | 0"
    );

    // Stored levels are untouched
    assert_eq!(board.element(a).unwrap().level(), Some(false));
    assert_eq!(board.element(b).unwrap().level(), Some(false));
}

#[test]
fn test_truth_table_limit() {
    let mut board = Board::new("wide".to_string());
    for i in 0..17 {
        board.add(Variant::InputSource, Point::new(0, 60 * i));
    }
    assert_eq!(
        board.truth_table().unwrap_err(),
        BoardError::TooManySources(17, 16)
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_report_json() {
    let (mut board, _) = xor_board();
    let report = board.evaluate_lamps();
    let mut buf = Vec::new();
    report.write_json(&mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["lamps"], serde_json::json!([6]));
    assert!(value["failures"].as_array().unwrap().is_empty());
}

use gate_board::assert_listing_eq;
use gate_board::board::Board;
use gate_board::config::BoardConfig;
use gate_board::element::{ElementId, Variant};
use gate_board::error::{BoardError, ConnectError};
use gate_board::geometry::Point;
use gate_board::pin::PinRef;
use gate_board::wire::WireId;
use rstest::rstest;

/// Two sources ANDed into a lamp
fn get_simple_example() -> (Board, [ElementId; 4]) {
    let mut board = Board::new("example".to_string());

    let a = board.add(Variant::InputSource, Point::new(0, 0));
    let b = board.add(Variant::InputSource, Point::new(0, 60));
    let and = board.add(Variant::AndGate, Point::new(100, 30));
    let y = board.add(Variant::OutputLamp, Point::new(200, 30));

    board
        .connect(PinRef::new(a, 0), PinRef::new(and, 0))
        .unwrap();
    board
        .connect(PinRef::new(b, 0), PinRef::new(and, 1))
        .unwrap();
    board
        .connect(PinRef::new(and, 2), PinRef::new(y, 0))
        .unwrap();

    (board, [a, b, and, y])
}

#[rstest]
#[case(Variant::AndGate, 2, 1)]
#[case(Variant::OrGate, 2, 1)]
#[case(Variant::NotGate, 1, 1)]
#[case(Variant::InputSource, 0, 1)]
#[case(Variant::OutputLamp, 1, 0)]
#[case(Variant::Compound, 0, 0)]
fn test_pin_counts(#[case] variant: Variant, #[case] inputs: usize, #[case] outputs: usize) {
    let mut board = Board::new("pins".to_string());
    let id = board.add(variant, Point::new(0, 0));
    let element = board.element(id).unwrap();
    assert_eq!(element.variant(), variant);
    assert_eq!(element.inputs().count(), inputs);
    assert_eq!(element.outputs().count(), outputs);
    assert_eq!(board.pins_of(id).len(), inputs + outputs);
    assert!(board.is_placed(id));
}

#[test]
fn test_listing() {
    let (board, _) = get_simple_example();
    assert_listing_eq!(
        board.to_string(),
        "board example {
            e0: InputSource (0, 0) low
            e1: InputSource (0, 60) low
            e2: AndGate (100, 30)
            e3: OutputLamp (200, 30) dark
            w0: e0.0 -> e2.0
            w1: e1.0 -> e2.1
            w2: e2.2 -> e3.0
        }"
    );
}

#[test]
fn test_connect_either_order() {
    let mut board = Board::new("order".to_string());
    let src = board.add(Variant::InputSource, Point::new(0, 0));
    let lamp = board.add(Variant::OutputLamp, Point::new(100, 0));
    let w = board
        .connect(PinRef::new(lamp, 0), PinRef::new(src, 0))
        .unwrap();
    let wire = board.wire(w).unwrap();
    assert_eq!(wire.from_pin(), PinRef::new(src, 0));
    assert_eq!(wire.to_pin(), PinRef::new(lamp, 0));
    assert_eq!(
        board.pin(PinRef::new(lamp, 0)).unwrap().incoming_wire(),
        Some(w)
    );
    // Outputs never record a wire
    assert!(!board.pin(PinRef::new(src, 0)).unwrap().has_incoming_wire());
}

#[test]
fn test_both_inputs_rejected() {
    let (mut board, [_, _, and, y]) = get_simple_example();
    let err = board
        .connect(PinRef::new(and, 0), PinRef::new(y, 0))
        .unwrap_err();
    assert_eq!(
        err,
        ConnectError::BothInputs(PinRef::new(and, 0), PinRef::new(y, 0))
    );
    assert_eq!(board.wire_count(), 3);
}

#[test]
fn test_both_outputs_rejected() {
    let (mut board, [a, _, and, _]) = get_simple_example();
    let err = board
        .connect(PinRef::new(a, 0), PinRef::new(and, 2))
        .unwrap_err();
    assert_eq!(
        err,
        ConnectError::BothOutputs(PinRef::new(a, 0), PinRef::new(and, 2))
    );
    assert_eq!(board.wire_count(), 3);
}

#[test]
fn test_occupied_input_rejected() {
    let (mut board, [a, b, and, _]) = get_simple_example();
    let err = board
        .connect(PinRef::new(b, 0), PinRef::new(and, 0))
        .unwrap_err();
    assert_eq!(
        err,
        ConnectError::InputOccupied(PinRef::new(and, 0), WireId::from(0))
    );
    // The original wire is intact
    let original = board.wire(WireId::from(0)).unwrap();
    assert_eq!(original.from_pin(), PinRef::new(a, 0));
    assert_eq!(
        board.pin(PinRef::new(and, 0)).unwrap().incoming_wire(),
        Some(WireId::from(0))
    );
    assert_eq!(board.wire_count(), 3);
}

#[test]
fn test_unknown_pin_rejected() {
    let (mut board, [a, _, and, _]) = get_simple_example();
    let bad = PinRef::new(and, 7);
    assert_eq!(
        board.connect(PinRef::new(a, 0), bad).unwrap_err(),
        ConnectError::UnknownPin(bad)
    );
    let gone = PinRef::new(ElementId::from(99), 0);
    assert_eq!(
        board.connect(gone, PinRef::new(and, 0)).unwrap_err(),
        ConnectError::UnknownPin(gone)
    );
}

#[test]
#[should_panic(expected = "you must connect an output pin to an input pin")]
fn test_rejection_message() {
    let (mut board, [a, b, _, _]) = get_simple_example();
    if let Err(e) = board.connect(PinRef::new(a, 0), PinRef::new(b, 0)) {
        panic!("{e}");
    }
}

#[test]
fn test_output_fans_out() {
    let (mut board, [a, _, _, _]) = get_simple_example();
    let lamp = board.add(Variant::OutputLamp, Point::new(100, 200));
    assert!(
        board
            .connect(PinRef::new(a, 0), PinRef::new(lamp, 0))
            .is_ok()
    );
    assert_eq!(board.wire_count(), 4);
}

#[test]
fn test_loops_rejected() {
    let mut board = Board::new("loop".to_string());
    let not = board.add(Variant::NotGate, Point::new(0, 0));
    let or = board.add(Variant::OrGate, Point::new(100, 0));
    assert!(matches!(
        board.connect(PinRef::new(not, 1), PinRef::new(not, 0)),
        Err(ConnectError::WouldCreateLoop(..))
    ));
    board
        .connect(PinRef::new(not, 1), PinRef::new(or, 0))
        .unwrap();
    assert_eq!(
        board
            .connect(PinRef::new(or, 2), PinRef::new(not, 0))
            .unwrap_err(),
        ConnectError::WouldCreateLoop(PinRef::new(or, 2), PinRef::new(not, 0))
    );
    assert_eq!(board.wire_count(), 1);
}

#[test]
fn test_loops_allowed_when_configured() {
    let config = BoardConfig::default().with_reject_loops(false);
    let mut board = Board::with_config("loop".to_string(), config);
    let not = board.add(Variant::NotGate, Point::new(0, 0));
    assert!(
        board
            .connect(PinRef::new(not, 1), PinRef::new(not, 0))
            .is_ok()
    );
}

#[test]
fn test_element_at() {
    let (mut board, [_, _, and, _]) = get_simple_example();
    assert_eq!(board.element_at(100, 30), Some(and));
    assert_eq!(board.element_at(139, 69), Some(and));
    assert_eq!(board.element_at(140, 50), None);
    assert_eq!(board.element_at(500, 500), None);

    // The last placed element is on top
    let or = board.add(Variant::OrGate, Point::new(120, 40));
    assert_eq!(board.element_at(125, 45), Some(or));
    assert_eq!(board.element_at(105, 35), Some(and));
}

#[test]
fn test_pin_at() {
    let (mut board, [_, _, and, _]) = get_simple_example();
    // AndGate inputs sit at (90, 40) and (90, 60)
    assert_eq!(board.pin_at(92, 44), Some(PinRef::new(and, 0)));
    assert_eq!(board.pin_at(102, 40), Some(PinRef::new(and, 0)));
    assert_eq!(board.pin_at(103, 40), None);
    assert_eq!(board.pin_at(90, 62), Some(PinRef::new(and, 1)));
    assert_eq!(board.pin_at(300, 300), None);
    assert_eq!(board.pin_at(i32::MAX, i32::MIN), None);

    // A stacked copy wins, like it does for element_at
    let top = board.add(Variant::AndGate, Point::new(100, 30));
    assert_eq!(board.pin_at(90, 40), Some(PinRef::new(top, 0)));
    assert_eq!(board.element_at(110, 40), Some(top));
}

#[test]
fn test_wire_at() {
    let (mut board, _) = get_simple_example();
    // w0 runs from (50, 20) to (90, 40)
    assert_eq!(board.wire_at(70, 30), Some(WireId::from(0)));
    assert_eq!(board.wire_at(70, 36), Some(WireId::from(0)));
    assert_eq!(board.wire_at(70, 40), None);
    // w2 runs from (150, 50) to (190, 50)
    assert_eq!(board.wire_at(170, 56), Some(WireId::from(2)));
    assert_eq!(board.wire_at(170, 57), None);

    board.set_wire_selected(WireId::from(2), true).unwrap();
    assert!(board.wire(WireId::from(2)).unwrap().is_selected());
    assert_eq!(
        board.set_wire_selected(WireId::from(9), true).unwrap_err(),
        BoardError::UnknownWire(WireId::from(9))
    );
}

#[test]
fn test_spawn_and_place() {
    let mut board = Board::new("preview".to_string());
    let id = board.spawn(Variant::NotGate, Point::new(0, 0));
    assert!(!board.is_placed(id));
    assert_eq!(board.element_at(10, 10), None);

    board.place(id, Point::new(200, 100)).unwrap();
    assert!(board.is_placed(id));
    assert_eq!(board.element_at(210, 110), Some(id));
    assert_eq!(
        board.pin(PinRef::new(id, 0)).unwrap().position(),
        Point::new(190, 120)
    );
    assert_eq!(
        board.place(id, Point::new(0, 0)).unwrap_err(),
        BoardError::AlreadyPlaced(id)
    );
}

#[test]
fn test_discard_preview() {
    let mut board = Board::new("preview".to_string());
    let id = board.spawn(Variant::AndGate, Point::new(0, 0));
    board.discard(id).unwrap();
    assert!(board.element(id).is_none());

    let placed = board.add(Variant::AndGate, Point::new(0, 0));
    assert_eq!(
        board.discard(placed).unwrap_err(),
        BoardError::AlreadyPlaced(placed)
    );
}

#[test]
fn test_toggle_only_sources() {
    let (mut board, [a, _, and, _]) = get_simple_example();
    assert_eq!(board.toggle(a), Ok(true));
    assert_eq!(board.toggle(a), Ok(false));
    assert_eq!(board.toggle(and), Err(BoardError::NotASource(and)));
}

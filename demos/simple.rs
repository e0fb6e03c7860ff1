use gate_board::{board::Board, element::Variant, pin::PinRef};

fn main() {
    let mut board = Board::new("example".to_string());

    // Add the two inputs
    let a = board.add(Variant::InputSource, (0, 0).into());
    let b = board.add(Variant::InputSource, (0, 60).into());

    // Instantiate an AND gate and a lamp to watch it
    let and = board.add(Variant::AndGate, (100, 30).into());
    let y = board.add(Variant::OutputLamp, (200, 30).into());

    board.connect(PinRef::new(a, 0), PinRef::new(and, 0)).unwrap();
    board.connect(PinRef::new(b, 0), PinRef::new(and, 1)).unwrap();
    board.connect(PinRef::new(and, 2), PinRef::new(y, 0)).unwrap();

    board.toggle(a).unwrap();
    board.toggle(b).unwrap();
    assert!(board.evaluate(y).unwrap());

    // Print the board
    println!("{board}");
}

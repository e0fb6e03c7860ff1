use gate_board::{
    board::Board,
    element::{ElementId, Variant},
    geometry::Point,
    graph::{Analysis, LogicDepth},
    pin::PinRef,
};

fn link(board: &mut Board, from: (ElementId, usize), to: (ElementId, usize)) {
    board
        .connect(PinRef::new(from.0, from.1), PinRef::new(to.0, to.1))
        .unwrap();
}

fn main() {
    let mut board = Board::new("half_adder".to_string());

    let a = board.add(Variant::InputSource, Point::new(0, 0));
    let b = board.add(Variant::InputSource, Point::new(0, 100));

    // XOR out of AND, OR and NOT
    let or = board.add(Variant::OrGate, Point::new(100, 0));
    let and = board.add(Variant::AndGate, Point::new(100, 100));
    let nand = board.add(Variant::NotGate, Point::new(200, 100));
    let xor = board.add(Variant::AndGate, Point::new(300, 0));
    let sum = board.add(Variant::OutputLamp, Point::new(400, 0));
    let carry = board.add(Variant::OutputLamp, Point::new(400, 100));

    link(&mut board, (a, 0), (or, 0));
    link(&mut board, (b, 0), (or, 1));
    link(&mut board, (a, 0), (and, 0));
    link(&mut board, (b, 0), (and, 1));
    link(&mut board, (and, 2), (nand, 0));
    link(&mut board, (or, 2), (xor, 0));
    link(&mut board, (nand, 1), (xor, 1));
    link(&mut board, (xor, 2), (sum, 0));
    link(&mut board, (and, 2), (carry, 0));

    print!("{}", board.truth_table().unwrap());

    let depth = LogicDepth::build(&board).unwrap();
    println!("logic depth: {}", depth.get_max_depth());

    // Fold the XOR into a single compound
    board.start_group();
    for id in [or, and, nand, xor] {
        board.add_to_group(id).unwrap();
    }
    let xor_block = board.end_group().unwrap();
    board.move_to(xor_block, Point::new(100, 200)).unwrap();

    board.toggle(a).unwrap();
    let report = board.evaluate_lamps();
    println!("sum={:?} carry={:?}", report.level(sum), report.level(carry));
    println!("{board}");
}

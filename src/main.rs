use gate_board::{
    board::Board,
    element::{ElementId, Variant},
    geometry::Point,
    pin::PinRef,
};
use std::error::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// ANDs `width` high sources together into a lamp, and leaves a second lamp
/// unconnected
fn and_chain(board: &mut Board, width: usize) -> Result<ElementId, Box<dyn Error>> {
    let sources: Vec<ElementId> = (0..width)
        .map(|i| board.add(Variant::InputSource, Point::new(0, 60 * i as i32)))
        .collect();

    let mut acc = sources[0];
    for (i, s) in sources.iter().enumerate().skip(1) {
        let gate = board.add(Variant::AndGate, Point::new(100 * i as i32, 60 * i as i32));
        let out = PinRef::new(acc, board.pins_of(acc).len() - 1);
        board.connect(out, PinRef::new(gate, 0))?;
        board.connect(PinRef::new(*s, 0), PinRef::new(gate, 1))?;
        acc = gate;
    }

    let lamp = board.add(Variant::OutputLamp, Point::new(100 * width as i32, 0));
    let out = PinRef::new(acc, board.pins_of(acc).len() - 1);
    board.connect(out, PinRef::new(lamp, 0))?;
    board.add(Variant::OutputLamp, Point::new(100 * width as i32, 100));

    for s in sources {
        board.toggle(s)?;
    }
    Ok(lamp)
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut board = Board::new("and_chain".to_string());
    let lamp = and_chain(&mut board, 4)?;
    let report = board.evaluate_lamps();
    print!("{board}");
    println!("{lamp} reads {:?}", report.level(lamp));
    for fault in report.faults() {
        println!("fault: {fault}");
    }

    #[cfg(feature = "serde")]
    report.write_json(std::io::stdout())?;

    Ok(())
}

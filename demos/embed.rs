use brainbox::{CodeGrid, Embedded, Interpreter};

fn main() {
    // Reads two characters and prints them in reverse, snaking over two rows.
    let code = "\
,d,.v
!.a <";

    let grid = CodeGrid::build(code);
    let mut bb = Interpreter::new(&grid, Embedded::new("ab".chars()));

    if let Err(err) = bb.run() {
        eprintln!("brainbox error: {err}");
        std::process::exit(1);
    }

    println!("{}", bb.channel().output());
    println!("halted after {} steps", bb.steps());
}

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    stochatreat::cli::run_stochatreat(std::env::args().skip(1))
}

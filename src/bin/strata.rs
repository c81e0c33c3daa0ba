use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    strata::cli::run(std::env::args().skip(1))
}

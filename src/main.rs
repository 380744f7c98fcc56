use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    shelfview::app::run(std::env::args().skip(1))
}

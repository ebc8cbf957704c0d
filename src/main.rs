use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    bible_expert::cli::main()
}

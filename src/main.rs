use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    codeaide::cli::main()
}

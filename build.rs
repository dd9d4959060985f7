use std::error::Error;

use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};

// Emits the VERGEN_* variables shown by `arpadroid --version`
fn main() -> Result<(), Box<dyn Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let cargo = CargoBuilder::default().target_triple(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .emit()?;
    Ok(())
}

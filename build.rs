//! Build script rendering the `xymon-channel(1)` manual page from the CLI
//! definition.

use std::{error::Error, fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from("target/generated-man");
    fs::create_dir_all(&out_dir)?;

    let command = cli::Cli::command();
    let page = out_dir.join(format!("{}.1", command.get_name()));
    let mut buf: Vec<u8> = Vec::new();
    Man::new(command)
        .section("1")
        .manual("Xymon channel tools")
        .render(&mut buf)?;
    fs::write(page, buf)?;

    Ok(())
}

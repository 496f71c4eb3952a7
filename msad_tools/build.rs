#![allow(dead_code)]

use std::env;
use std::io::Error;

use clap::CommandFactory;
use clap_complete::{generate_to, Shell};

include!("src/opt/msad.rs");

fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");
    println!("cargo:rerun-if-changed=src/opt/msad.rs");
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let comp_dir = match PathBuf::from(outdir)
        .ancestors()
        .nth(2)
        .map(|p| p.join("completions"))
    {
        Some(d) => d,
        None => return Ok(()),
    };

    if !comp_dir.exists() {
        std::fs::create_dir(&comp_dir)?;
    }

    for shell in [Shell::Bash, Shell::Fish, Shell::Zsh] {
        generate_to(
            shell,
            &mut MsadClientParser::command(),
            "msad",
            comp_dir.clone(),
        )?;
    }
    Ok(())
}

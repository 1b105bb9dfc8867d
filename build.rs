use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when the bundled part models or textures change.
    println!("cargo:rerun-if-changed=assets/*");

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    // Skipped when the crate ships without assets (library-only use)
    if manifest_dir.join("assets").exists() {
        copy_items(&vec!["assets/"], out_dir, &copy_options)?;
    }

    Ok(())
}

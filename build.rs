use std::env;
use std::path::PathBuf;

use anyhow::Result;
use fs_extra::dir::CopyOptions;

// Ships the assets directory next to the build output so the binary finds
// its models and textures when run from the target directory.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let assets = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("assets");
    if !assets.exists() {
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let options = CopyOptions {
        overwrite: true,
        ..Default::default()
    };
    fs_extra::copy_items(&[assets], out_dir, &options)?;
    Ok(())
}

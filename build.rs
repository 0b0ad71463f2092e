use std::env;
use std::path::PathBuf;

const WATCHED_VARIABLES: [&str; 3] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // Linux and macOS builds find FFmpeg through pkg-config.
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match locate_vcpkg_ffmpeg() {
        Some(directory) if directory.exists() => println!(
            "cargo:warning=vidgif: found FFmpeg under {0}; export FFMPEG_DIR={0} so ffmpeg-next links against it.",
            directory.display(),
        ),
        Some(directory) => println!(
            "cargo:warning=vidgif: VCPKG_ROOT is set but {} does not exist; run `vcpkg install ffmpeg`.",
            directory.display(),
        ),
        None => println!(
            "cargo:warning=vidgif: neither FFMPEG_DIR nor VCPKG_ROOT is set; the FFmpeg development libraries may not be found."
        ),
    }
}

fn locate_vcpkg_ffmpeg() -> Option<PathBuf> {
    let root = env::var("VCPKG_ROOT").ok()?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

//! Build script for dieview-core
//!
//! Checks the toolchain before compilation:
//! - Minimum Rust version (let-else and `Option::is_some_and` need 1.70.0)

fn main()
{
    let Ok(found) = rustc_version::version() else {
        // Some build environments hide the compiler version
        println!("cargo:warning=could not verify Rust version");
        return;
    };

    let required = rustc_version::Version::new(1, 70, 0);
    if found < required {
        panic!("dieview-core requires Rust {required} or newer, found {found}");
    }
}

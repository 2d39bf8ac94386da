use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Deserialize)]
struct Package {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct Metadata {
    txtodo: TxtodoMetadata,
}

#[derive(Deserialize)]
struct TxtodoMetadata {
    codename: String,
}

fn main() {
    let toml_str = fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let manifest: Manifest = toml::from_str(&toml_str).expect("Failed to parse Cargo.toml");

    // Surfaced by `txtodo --version` via env!("CODENAME")
    println!("cargo:rustc-env=CODENAME={}", manifest.package.metadata.txtodo.codename);
    println!("cargo:rerun-if-changed=Cargo.toml");
}

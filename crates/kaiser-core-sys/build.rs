use std::{
    env, fs,
    path::{Path, PathBuf},
};

fn main() {
    let bundled = env::var_os("CARGO_FEATURE_BUNDLED").is_some();
    let system = env::var_os("CARGO_FEATURE_SYSTEM").is_some();

    if bundled && system {
        panic!("kaiser-core-sys: enable only one of 'bundled' or 'system'");
    }

    if bundled {
        build_bundled();
    } else if system {
        link_system();
    }
    // Neither feature: link nothing. `kaiser-driver` then reports the native
    // backend as unavailable and only test doubles can drive it.
}

fn link_system() {
    println!("cargo:rerun-if-env-changed=KAISER_CORE_LIB_DIR");
    println!("cargo:rerun-if-env-changed=KAISER_CORE_LIB_NAME");

    if let Some(dir) = env::var_os("KAISER_CORE_LIB_DIR") {
        println!(
            "cargo:rustc-link-search=native={}",
            PathBuf::from(dir).display()
        );
    }

    // The prebuilt core ships as core.dll / libcore.so.
    let name = env::var("KAISER_CORE_LIB_NAME").unwrap_or_else(|_| "core".to_string());
    println!("cargo:rustc-link-lib=dylib={name}");
}

fn build_bundled() {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap());
    let workspace_root = manifest_dir.join("..").join("..");

    let src_dir = match env::var_os("KAISER_CORE_SRC_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => workspace_root.join("vendor").join("genesis-core"),
    };

    if !src_dir.exists() {
        panic!(
            "kaiser-core-sys (bundled): missing core sources. Tried: {}\n\n\
Place the core checkout (with its hardware/ tree) at vendor/genesis-core,\n\
or set KAISER_CORE_SRC_DIR to point at it.\n\n\
Then rebuild with: cargo build -p kaiser-driver --features bundled\n",
            src_dir.display()
        );
    }

    println!("cargo:rerun-if-changed={}", src_dir.display());
    println!("cargo:rerun-if-env-changed=KAISER_CORE_SRC_DIR");

    let c_files = collect_c_files(&src_dir);
    if c_files.is_empty() {
        panic!(
            "kaiser-core-sys (bundled): found no C sources under {}",
            src_dir.display()
        );
    }

    let mut build = cc::Build::new();
    build.include(&src_dir);
    for dir in include_dirs(&c_files) {
        build.include(dir);
    }
    for file in c_files {
        build.file(file);
    }

    build.warnings(false);
    build.compile("kaiser-core");
}

/// Every directory holding a translation unit doubles as an include path;
/// the core includes its headers by bare name.
fn include_dirs(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.parent().map(Path::to_path_buf))
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}

fn collect_c_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_ascii_lowercase();

                if name.contains("test") || name.contains("doc") || name == ".git" {
                    continue;
                }

                stack.push(path);
                continue;
            }

            if file_type.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("c"))
            {
                out.push(path);
            }
        }
    }

    out.sort();
    out
}

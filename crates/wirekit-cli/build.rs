use std::process::Command;

// Stamps the commit and commit date shown by `wirekit --version`.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=WIREKIT_BUILD_COMMIT");

    let commit = std::env::var("WIREKIT_BUILD_COMMIT")
        .ok()
        .filter(|pinned| !pinned.is_empty())
        .or_else(|| git(&["rev-parse", "--short=7", "HEAD"]))
        .unwrap_or_else(|| "unknown".into());
    let date = git(&["log", "-1", "--format=%cs"]).unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=WIREKIT_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=WIREKIT_BUILD_DATE={date}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_owned();
    (!value.is_empty()).then_some(value)
}

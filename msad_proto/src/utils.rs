/// The version string of the named tool. Pass the version of the calling crate,
/// `env!("CARGO_PKG_VERSION")`, so the binary reports its own version.
pub fn get_version(name: &str, version: &str) -> String {
    format!("{} {}", name, version)
}

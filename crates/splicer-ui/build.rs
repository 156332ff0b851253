// crates/splicer-ui/build.rs
//
// Embeds version metadata into the Windows executable. No-op elsewhere.

fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    let mut res = winresource::WindowsResource::new();
    res.set("ProductName", "Splicer")
        .set("FileDescription", "Splicer video combiner");
    if let Err(e) = res.compile() {
        println!("cargo:warning=could not embed Windows resources: {e}");
    }
}

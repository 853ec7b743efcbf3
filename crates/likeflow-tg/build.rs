fn main() {
    vergen::EmitBuilder::builder()
        .build_timestamp()
        .git_sha(false)
        .emit()
        .unwrap();
}

// Downstream crates deriving the DSL must compile against the public paths
// the expansion uses.
#[test]
fn ui_pass() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/pass/*.rs");
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use trusted_html::trusted_html;

// Whatever is interpolated into an attribute must come back as that attribute's value.
fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(out) = trusted_html!("<div title=\"{}\"><b>x</b>{}</div>", value, value) else {
        panic!("attribute and text interpolation must not fail");
    };
    let root = html::parse_fragment(out.as_str());
    let [div] = root.children() else {
        panic!("interpolation changed the tree shape: {out}");
    };
    assert_eq!(div.attribute("title"), Some(value));
    assert_eq!(div.children().len(), if value.is_empty() { 1 } else { 2 });
});

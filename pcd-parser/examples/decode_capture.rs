use std::path::PathBuf;

use pcd_parser::{parsers::ParserProvider as _, FormatHint};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .expect("usage: decode_capture <capture.pcd|capture.bin>");
    let raw = std::fs::read(&path).expect("failed to read capture");

    let hint = FormatHint::from_resource_name(&path.to_string_lossy());
    let parser = hint.get_parser();

    let point_set = parser.parse(&raw);

    println!(
        "Number of points: {num_points}",
        num_points = point_set.as_ref().unwrap().len()
    );

    println!(
        "First point: {:?}",
        point_set.as_ref().unwrap().positions().next()
    );
}

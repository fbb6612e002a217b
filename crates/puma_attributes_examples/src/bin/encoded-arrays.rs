use puma_attributes::prelude::*;
use puma_attributes_examples::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let flags = [true, false, true];
    let heights = [4.0, 3.25, 3.0];
    let labels = ["CAFE".to_string(), "OPEN; DAILY".to_string(), String::new()];

    let encoded_flags = encode_array(&flags);
    let encoded_heights = encode_array(&heights);
    let encoded_labels = encode_array(&labels);
    println!("{flags:?} -> {encoded_flags:?}");
    println!("{heights:?} -> {encoded_heights:?}");
    println!("{labels:?} -> {encoded_labels:?}");

    assert_eq!(decode_array::<bool>(&encoded_flags)?, flags);
    assert_eq!(decode_array::<f64>(&encoded_heights)?, heights);
    assert_eq!(decode_array::<String>(&encoded_labels)?, labels);

    // Plain joined text from older writers still decodes.
    println!("{:?}", decode_array::<i32>("1;2;3")?);

    match decode_array::<f64>("1;two;3;") {
        Ok(values) => println!("unexpected: {values:?}"),
        Err(err) => println!("rejected: {err}"),
    }

    Ok(())
}

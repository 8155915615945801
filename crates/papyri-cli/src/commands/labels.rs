use papyri_core::labels::universe;

use crate::parsers::{parse_class, parse_label_order};

/// Every label an image class can produce, in the requested order.
pub fn label_listing(class: &str, order: &str) -> Result<Vec<String>, String> {
    let class = parse_class(class)?;
    let order = parse_label_order(order)?;
    Ok(universe(class, order))
}

pub fn cmd_labels(class: &str, order: &str) -> Result<(), String> {
    for label in label_listing(class, order)? {
        println!("{}", label);
    }
    Ok(())
}

//! Entry types command implementation.

use walsight_core::KindTag;

/// Prints every entry type name, one per line.
pub fn run() {
    for tag in KindTag::ALL {
        println!("{tag}");
    }
}

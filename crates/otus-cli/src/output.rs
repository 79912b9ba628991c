// Output formatting

use serde::Serialize;

/// Pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print error message to stderr
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

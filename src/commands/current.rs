use anyhow::Result;
use colored::Colorize;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    match ctx.activation().current() {
        Some(key) => println!("Current: {}", key.as_str().green()),
        None => {
            println!("No version currently selected");
            println!("Run 'nvs use <version>' to select one");
        }
    }
    Ok(())
}

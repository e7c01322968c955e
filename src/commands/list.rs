//! List commands implementation

/// List all compiled-in programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();

    let programmers = i2cflash_bus::available_programmers();
    if programmers.is_empty() {
        println!("  none (recompile with programmer features enabled)");
        return;
    }

    for p in programmers {
        println!("  {:<10} - {}", p.name, p.description);
        if !p.aliases.is_empty() {
            println!("  {:<10}   aliases: {}", "", p.aliases.join(", "));
        }
    }
}

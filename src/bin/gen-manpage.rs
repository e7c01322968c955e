//! Man page generator for i2cflash
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::PathBuf;

#[path = "../cli.rs"]
mod cli;

/// Render the top-level page and one page per subcommand
///
/// Subcommand pages keep the subcommand's own name and are written to
/// `i2cflash-<name>.1`.
fn render_pages(cmd: &clap::Command) -> std::io::Result<Vec<(String, Vec<u8>)>> {
    let mut pages = Vec::new();

    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    pages.push((format!("{}.1", cmd.get_name()), buffer));

    for sub in cmd.get_subcommands() {
        let mut buffer = Vec::new();
        clap_mangen::Man::new(sub.clone()).render(&mut buffer)?;
        pages.push((format!("{}-{}.1", cmd.get_name(), sub.get_name()), buffer));
    }

    Ok(pages)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    for (file_name, buffer) in render_pages(&cmd)? {
        let path = output_dir.join(file_name);
        fs::write(&path, buffer)?;
        println!("Man page generated at: {}", path.display());
    }

    println!("\nTo view the man page:");
    println!("  man -l {}", output_dir.join("i2cflash.1").display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pages() {
        let pages = render_pages(&cli::Cli::command()).unwrap();
        let names: Vec<&str> = pages.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names[0], "i2cflash.1");
        assert!(names.contains(&"i2cflash-write.1"));
        assert!(names.contains(&"i2cflash-verify.1"));
        assert!(names.contains(&"i2cflash-list-programmers.1"));
        assert!(pages.iter().all(|(_, page)| !page.is_empty()));
    }
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "blockedit", version, about = "TUI for editing the blocks of a course unit")]
pub struct Args {
    /// Unit page document (JSON)
    pub page: PathBuf,

    /// Theme name, overriding the config file (e.g. "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["blockedit", "unit.json", "--theme", "Catppuccin Latte"]);
        assert_eq!(args.page, PathBuf::from("unit.json"));
        assert_eq!(args.theme.as_deref(), Some("Catppuccin Latte"));

        assert!(Args::try_parse_from(["blockedit"]).is_err());
    }
}

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dictadmin")]
#[command(about = "Terminal admin console for managing dictionary data records")]
#[command(version)]
pub struct Cli {
    /// Launches the interactive TUI when no subcommand is given
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive admin screen
    Tui {
        /// Pre-seed the dictionary type filter
        #[arg(long)]
        dict_type: Option<String>,
    },

    /// List dictionary data records
    List {
        /// Filter by dictionary type
        #[arg(short = 't', long)]
        dict_type: Option<String>,

        /// Filter by label
        #[arg(short, long)]
        label: Option<String>,

        /// Filter by value
        #[arg(short, long)]
        value: Option<String>,

        /// Created from (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<NaiveDate>,

        /// Created to (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<NaiveDate>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u64,

        /// Rows per page
        #[arg(short, long)]
        size: Option<u64>,
    },

    /// Show a single record by its code
    Get {
        /// Dictionary data code
        code: i64,
    },

    /// Create a dictionary data record
    Add {
        /// Dictionary type the entry belongs to
        #[arg(short = 't', long)]
        dict_type: String,

        /// Human-readable label
        #[arg(short, long)]
        label: String,

        /// Stored value
        #[arg(short, long)]
        value: String,

        /// Ordering hint
        #[arg(short, long, default_value = "0")]
        sort: i64,

        /// Optional remark
        #[arg(short, long)]
        remark: Option<String>,
    },

    /// Update a record; unspecified fields keep their current values
    Update {
        /// Dictionary data code
        code: i64,

        #[arg(short = 't', long)]
        dict_type: Option<String>,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long)]
        value: Option<String>,

        #[arg(short, long)]
        sort: Option<i64>,

        #[arg(short, long)]
        remark: Option<String>,
    },

    /// Delete one or more records by code
    Delete {
        /// Comma-separated dictionary data codes, e.g. "10,11"
        codes: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export filtered records to a spreadsheet file
    Export {
        #[arg(short = 't', long)]
        dict_type: Option<String>,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long)]
        value: Option<String>,

        #[arg(long)]
        from_date: Option<NaiveDate>,

        #[arg(long)]
        to_date: Option<NaiveDate>,
    },

    /// Ask the backend to rebuild its dictionary cache
    RefreshCache,

    /// List dictionary types and their display names
    Types,
}

impl Commands {
    /// Parse a comma-separated code list, e.g. "10,11"
    pub fn parse_codes(raw: &str) -> Result<Vec<i64>> {
        let codes = raw
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| anyhow::anyhow!("Invalid dictionary data code: '{}'", part))
            })
            .collect::<Result<Vec<i64>>>()?;
        if codes.is_empty() {
            anyhow::bail!("No dictionary data codes given");
        }
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!(Commands::parse_codes("10,11").unwrap(), vec![10, 11]);
        assert_eq!(Commands::parse_codes(" 42 ").unwrap(), vec![42]);
        assert!(Commands::parse_codes("10,abc").is_err());
        assert!(Commands::parse_codes("").is_err());
    }
}

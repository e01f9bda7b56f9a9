use crate::commands::{
    run_quote, run_rules_import, run_rules_reset, run_rules_show, run_rules_validate,
    run_saved_delete, run_saved_list, run_saved_save, QuoteArgs, RulesFileArgs, SaveArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use marketplace_margin::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Marketplace Margin",
    about = "Price products and compare profitability across Brazilian marketplaces",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Quote a product on one marketplace, or on all of them with --compare
    Quote(QuoteArgs),
    /// Inspect or replace the stored marketplace fee rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Manage saved calculations
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Print the effective rules as JSON
    Show,
    /// Discard stored rules and fall back to the defaults
    Reset,
    /// Check the stored rules, or a rules file, for invalid values
    Validate {
        /// Rules file to check instead of the stored rules
        file: Option<PathBuf>,
    },
    /// Validate and store rules from a JSON file
    Import(RulesFileArgs),
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    /// List saved calculations, oldest first
    List,
    /// Save a calculation under a name
    Save(SaveArgs),
    /// Delete a saved calculation by id
    Delete {
        /// Identifier printed by `saved list`
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Rules { command } => match command {
            RulesCommand::Show => run_rules_show(),
            RulesCommand::Reset => run_rules_reset(),
            RulesCommand::Validate { file } => run_rules_validate(file),
            RulesCommand::Import(args) => run_rules_import(args),
        },
        Command::Saved { command } => match command {
            SavedCommand::List => run_saved_list(),
            SavedCommand::Save(args) => run_saved_save(args),
            SavedCommand::Delete { id } => run_saved_delete(id),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_margin::{Marketplace, MercadoLivreAdType};

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["marketplace-margin"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn quote_flags_parse_into_input() {
        let cli = Cli::try_parse_from([
            "marketplace-margin",
            "quote",
            "--marketplace",
            "Mercado Livre",
            "--price",
            "29",
            "--ad-type",
            "premium",
            "--commission",
            "11,5",
        ])
        .expect("parses");

        let Some(Command::Quote(args)) = cli.command else {
            panic!("expected quote command");
        };
        assert_eq!(args.input.marketplace, Marketplace::MercadoLivre);
        assert_eq!(args.input.ad_type, MercadoLivreAdType::Premium);
        assert_eq!(args.commission.as_deref(), Some("11,5"));
        assert!(!args.compare);
    }

    #[test]
    fn unknown_marketplace_is_rejected() {
        let result = Cli::try_parse_from(["marketplace-margin", "quote", "-m", "ebay"]);
        assert!(result.is_err());
    }

    #[test]
    fn saved_save_requires_a_name() {
        let result = Cli::try_parse_from(["marketplace-margin", "saved", "save", "--price", "10"]);
        assert!(result.is_err());
    }
}

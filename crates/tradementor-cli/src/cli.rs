//! Command line definitions.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tradementor", version, about = "TradeMentor trading and learning client")]
pub struct Cli {
    /// Keep the token in memory only; nothing is read from or written to the keychain
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show whether a stored session is still valid
    Status,
    /// Check the backend is reachable
    Health,
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Forget the stored token
    SignOut,
    /// Show or update the signed-in profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Market overview, portfolio summary and watchlist in one go
    Dashboard,
    #[command(subcommand)]
    Stocks(StocksCommand),
    #[command(subcommand)]
    Portfolio(PortfolioCommand),
    #[command(subcommand)]
    News(NewsCommand),
    #[command(subcommand)]
    Ipo(IpoCommand),
    #[command(subcommand)]
    Learn(LearnCommand),
    #[command(subcommand)]
    Trade(TradeCommand),
    #[command(subcommand)]
    StopLoss(StopLossCommand),
    #[command(subcommand)]
    Ai(AiCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    /// Replace profile fields with the given JSON object
    Update { json: String },
}

#[derive(Debug, Subcommand)]
pub enum StocksCommand {
    Overview,
    Watchlist,
    Watch { symbol: String },
    Unwatch { symbol: String },
    Quote { symbol: String },
    History { symbol: String },
    Search { query: String },
    Sector { sector: String },
    Company { symbol: String },
}

#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(Debug, Subcommand)]
pub enum PortfolioCommand {
    Summary,
    Holdings,
    Transactions(PageArgs),
    Performance,
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value = "")]
        query: String,
    },
    Show { id: String },
    /// Trigger a news re-ingest (admin only)
    Refresh {
        #[arg(long, env = "TRADEMENTOR_ADMIN_SECRET", hide_env_values = true)]
        secret: String,
        #[arg(long, default_value = "{}")]
        json: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum IpoCommand {
    List,
    Show { id: String },
    Symbol { symbol: String },
    Apply {
        id: String,
        #[arg(long)]
        lots: u32,
    },
    Applications { id: String },
    Allotment { id: String },
}

#[derive(Debug, Subcommand)]
pub enum LearnCommand {
    Chat { message: String },
    Content {
        #[arg(default_value = tradementor_core::models::DEFAULT_LEARN_LEVEL)]
        level: String,
    },
    Search {
        query: String,
        #[arg(long, default_value = tradementor_core::models::DEFAULT_LEARN_LEVEL)]
        level: String,
    },
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum TradeCommand {
    Place {
        symbol: String,
        /// buy or sell
        side: String,
        qty: u32,
        price: f64,
    },
    History(PageArgs),
}

#[derive(Debug, Subcommand)]
pub enum StopLossCommand {
    List,
    Create {
        symbol: String,
        price: f64,
        quantity: u32,
    },
    Update {
        id: String,
        price: f64,
        quantity: u32,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AiCommand {
    Analyze,
    /// Recommendations for the given market data JSON
    Recommend {
        #[arg(default_value = "{}")]
        json: String,
    },
    Insights {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trade() {
        let cli = Cli::parse_from(["tradementor", "trade", "place", "TCS", "buy", "2", "3500.5"]);
        match cli.command {
            Command::Trade(TradeCommand::Place { symbol, side, qty, price }) => {
                assert_eq!(symbol, "TCS");
                assert_eq!(side, "buy");
                assert_eq!(qty, 2);
                assert_eq!(price, 3500.5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ephemeral_is_global() {
        let cli = Cli::parse_from(["tradementor", "status", "--ephemeral"]);
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Command::Status));
    }
}
